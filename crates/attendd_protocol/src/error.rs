//! Entry validation errors.

use thiserror::Error;

/// Why a batch entry was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    /// A required field is absent under every accepted alias.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
}
