//! HTTP request handlers for the dashboard.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::Json;
use serde::Serialize;
use spacewatch_store::{AlertState, LoadOutcome};
use tracing::warn;

use crate::error::{DashboardError, DashboardResult};
use crate::state::DashboardState;
use crate::view::render_page;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status message.
    pub status: String,
    /// Server uptime in seconds.
    pub uptime_secs: u64,
}

/// Handle GET / - the status page.
pub async fn index(State(state): State<Arc<DashboardState>>) -> DashboardResult<Html<String>> {
    let view = state.status_view();
    Ok(Html(render_page(&view, state.config().refresh_interval)?))
}

/// Handle GET /data - the raw alert record.
pub async fn get_data(
    State(state): State<Arc<DashboardState>>,
) -> DashboardResult<Json<AlertState>> {
    match state.load() {
        LoadOutcome::Loaded(record) => Ok(Json(record)),
        LoadOutcome::Empty => Err(DashboardError::NoData),
        LoadOutcome::Corrupt(reason) => {
            warn!(reason = %reason, "serving error for unreadable alert record");
            Err(DashboardError::Unreadable(reason))
        }
    }
}

/// Handle GET /health - liveness.
pub async fn health_check(State(state): State<Arc<DashboardState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.uptime_secs(),
    })
}
