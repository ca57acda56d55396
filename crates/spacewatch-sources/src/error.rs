//! Error types for indicator sources.
//!
//! None of these escape a cycle: [`crate::sample`] logs them and turns the
//! indicator into [`spacewatch_alerts::Sample::Unavailable`].

use thiserror::Error;

/// Errors raised while fetching or parsing one indicator.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The request could not be sent or the connection failed.
    #[error("request failed: {0}")]
    Transport(String),

    /// The provider answered with a non-success status.
    #[error("provider returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The payload is not shaped the way the provider documents it.
    #[error("malformed payload: {reason}")]
    Malformed {
        /// What was wrong with the payload.
        reason: String,
    },

    /// None of the candidate keys for a field were present.
    #[error("missing field: {field}")]
    MissingField {
        /// Logical field name.
        field: &'static str,
    },

    /// The source was configured with unusable values.
    #[error("invalid source configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Malformed {
                reason: err.to_string(),
            }
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Result type for source operations.
pub type SourceResult<T> = std::result::Result<T, SourceError>;
