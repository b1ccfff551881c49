//! Error types for the attendd server.

use attendd_store::StoreError;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the server.
///
/// Client input problems are answered with a 400 reply by the handlers
/// themselves; an `Err` reaching the command router always becomes a 500.
#[derive(Error, Debug)]
pub enum ServerError {
    /// A collection could not be written.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// TLS material could not be loaded.
    #[error("tls error: {0}")]
    Tls(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ServerError::Config("body_limit must be greater than zero".into());
        assert_eq!(
            err.to_string(),
            "invalid configuration: body_limit must be greater than zero"
        );
    }

    #[test]
    fn store_errors_convert() {
        let err: ServerError = StoreError::Serialize(
            serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        )
        .into();
        assert!(matches!(err, ServerError::Store(_)));
        assert!(err.to_string().starts_with("store error"));
    }
}
