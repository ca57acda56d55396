//! Error types for the spacewatch-alerts crate.

use thiserror::Error;

/// Errors that can occur while classifying or dispatching alerts.
#[derive(Debug, Error)]
pub enum AlertError {
    /// A threshold table is inconsistent.
    #[error("invalid thresholds: {reason}")]
    InvalidThresholds {
        /// The reason the thresholds are invalid.
        reason: String,
    },

    /// A channel or notifier was configured with unusable values.
    #[error("invalid channel configuration: {reason}")]
    InvalidChannel {
        /// The reason the configuration is invalid.
        reason: String,
    },

    /// The messaging gateway rejected or failed to accept the message.
    #[error("dispatch through {channel} failed: {reason}")]
    DispatchFailed {
        /// The channel that attempted delivery.
        channel: String,
        /// The reason delivery failed.
        reason: String,
    },
}

/// Result type for alert operations.
pub type Result<T> = std::result::Result<T, AlertError>;
