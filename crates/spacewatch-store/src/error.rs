//! Error types for the state store.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while writing the alert state.
///
/// Read problems are not errors: they surface as
/// [`crate::LoadOutcome::Corrupt`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record could not be written or moved into place.
    #[error("failed to write {path}: {reason}")]
    WriteFailed {
        /// Target record path.
        path: PathBuf,
        /// Underlying cause.
        reason: String,
    },

    /// The record could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
