//! Error types for the dashboard server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for dashboard operations.
pub type DashboardResult<T> = Result<T, DashboardError>;

/// Errors that can occur in the dashboard server.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Failed to bind to the specified address.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(std::net::SocketAddr, std::io::Error),

    /// No alert record has been written yet.
    #[error("no data file found")]
    NoData,

    /// The alert record exists but cannot be read.
    #[error("alert record unreadable: {0}")]
    Unreadable(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// The status page template failed to register or render.
    #[error("template error: {0}")]
    Template(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            Self::NoData => (StatusCode::NOT_FOUND, "not_found"),
            Self::Unreadable(_) => (StatusCode::INTERNAL_SERVER_ERROR, "unreadable"),
            Self::BindFailed(_, _) | Self::Internal(_) | Self::Template(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        let json = serde_json::to_string(&body).unwrap_or_else(|_| {
            r#"{"error":"internal_error","message":"failed to serialize error"}"#.to_string()
        });

        (status, [("content-type", "application/json")], json).into_response()
    }
}
