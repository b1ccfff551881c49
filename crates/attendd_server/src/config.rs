//! Server configuration.

use crate::error::{ServerError, ServerResult};
use attendd_store::StoreOptions;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3000;

/// Configuration for the attendd server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Directory holding the collection files.
    pub data_dir: PathBuf,
    /// TLS certificate (PEM). HTTPS is served only if this and `tls_key` exist.
    pub tls_cert: PathBuf,
    /// TLS private key (PEM).
    pub tls_key: PathBuf,
    /// Maximum request body size in bytes.
    pub body_limit: usize,
    /// Number of entries returned by `GET /logs`.
    pub logs_tail: usize,
    /// QR codes accepted by `sendqrcode`.
    pub qr_allow_list: Vec<String>,
    /// Serialize read-modify-write cycles per collection.
    pub serialize_writes: bool,
}

impl ServerConfig {
    /// Creates a new server configuration.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            data_dir: PathBuf::from("data"),
            tls_cert: PathBuf::from("certs/cert.pem"),
            tls_key: PathBuf::from("certs/key.pem"),
            body_limit: 10 * 1024 * 1024,
            logs_tail: 100,
            qr_allow_list: vec!["123456".to_string(), "ATTEND-QR-0001".to_string()],
            serialize_writes: false,
        }
    }

    /// Sets the data directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Sets the TLS certificate and key paths.
    pub fn with_tls(mut self, cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        self.tls_cert = cert.into();
        self.tls_key = key.into();
        self
    }

    /// Sets the maximum request body size.
    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    /// Sets the number of entries returned by `GET /logs`.
    pub fn with_logs_tail(mut self, entries: usize) -> Self {
        self.logs_tail = entries;
        self
    }

    /// Replaces the QR-code allow-list.
    pub fn with_qr_allow_list<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.qr_allow_list = codes.into_iter().map(Into::into).collect();
        self
    }

    /// Enables per-collection write serialization.
    pub fn with_serialize_writes(mut self, enabled: bool) -> Self {
        self.serialize_writes = enabled;
        self
    }

    /// Returns the certificate and key paths if both files exist.
    pub fn tls_files(&self) -> Option<(&Path, &Path)> {
        (self.tls_cert.is_file() && self.tls_key.is_file())
            .then(|| (self.tls_cert.as_path(), self.tls_key.as_path()))
    }

    /// Checks settings that would make the server unusable.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] naming the offending setting.
    pub fn validate(&self) -> ServerResult<()> {
        if self.body_limit == 0 {
            return Err(ServerError::Config(
                "body_limit must be greater than zero".into(),
            ));
        }
        if self.tls_cert.is_file() != self.tls_key.is_file() {
            warn!(
                cert = %self.tls_cert.display(),
                key = %self.tls_key.display(),
                "only one of the TLS files exists"
            );
        }
        Ok(())
    }

    /// Returns the store options derived from this configuration.
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions::default().with_serialize_writes(self.serialize_writes)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.logs_tail, 100);
        assert!(!config.serialize_writes);
        assert!(!config.qr_allow_list.is_empty());
    }

    #[test]
    fn config_builder() {
        let config = ServerConfig::new("127.0.0.1:9000".parse().unwrap())
            .with_data_dir("/tmp/attendd")
            .with_logs_tail(5)
            .with_qr_allow_list(["A", "B"])
            .with_serialize_writes(true);

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/attendd"));
        assert_eq!(config.logs_tail, 5);
        assert_eq!(config.qr_allow_list, vec!["A", "B"]);
        assert!(config.store_options().serialize_writes);
    }

    #[test]
    fn tls_requires_both_files() {
        let temp = tempdir().unwrap();
        let cert = temp.path().join("cert.pem");
        let key = temp.path().join("key.pem");
        let config = ServerConfig::default().with_tls(&cert, &key);
        assert!(config.tls_files().is_none());

        std::fs::write(&cert, "cert").unwrap();
        assert!(config.tls_files().is_none());

        std::fs::write(&key, "key").unwrap();
        assert_eq!(config.tls_files(), Some((cert.as_path(), key.as_path())));
    }

    #[test]
    fn validate_rejects_zero_body_limit() {
        assert!(ServerConfig::default().validate().is_ok());

        let err = ServerConfig::default().with_body_limit(0).validate().unwrap_err();
        assert!(matches!(err, ServerError::Config(_)));
    }
}
