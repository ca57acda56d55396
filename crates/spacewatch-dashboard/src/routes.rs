//! Route configuration for the dashboard.

use std::sync::Arc;

use axum::routing::{get, Router};
use tower_http::trace::TraceLayer;

use crate::handlers::{get_data, health_check, index};
use crate::state::DashboardState;

/// Create the dashboard router.
pub fn create_router(state: Arc<DashboardState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/data", get(get_data))
        .route("/health", get(health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
