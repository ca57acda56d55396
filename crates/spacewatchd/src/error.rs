//! Error types for spacewatchd.

use spacewatch_alerts::AlertError;
use spacewatch_sources::SourceError;
use thiserror::Error;

/// Errors that can occur while configuring or assembling the monitor.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Indicator source setup failed.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Alert classification or delivery setup failed.
    #[error("alert error: {0}")]
    Alert(#[from] AlertError),
}

/// Result type for monitor operations.
pub type Result<T> = std::result::Result<T, MonitorError>;
