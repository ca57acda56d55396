//! Dashboard server implementation.

use std::future::Future;
use std::sync::Arc;

use spacewatch_store::StateStore;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::DashboardConfig;
use crate::error::{DashboardError, DashboardResult};
use crate::routes::create_router;
use crate::state::DashboardState;

/// Read-only HTTP view over the alert record.
#[derive(Debug, Clone)]
pub struct DashboardServer {
    state: Arc<DashboardState>,
}

impl DashboardServer {
    /// Create a new dashboard server reading from `store`.
    #[must_use]
    pub fn new(config: DashboardConfig, store: Arc<dyn StateStore>) -> Self {
        Self {
            state: Arc::new(DashboardState::new(config, store)),
        }
    }

    /// Get the dashboard state.
    #[must_use]
    pub fn state(&self) -> Arc<DashboardState> {
        self.state.clone()
    }

    /// Create the router without starting the server.
    pub fn router(&self) -> axum::Router {
        create_router(self.state.clone())
    }

    /// Bind the configured address and serve until `shutdown` completes.
    ///
    /// # Errors
    ///
    /// Returns an error if binding fails or the server stops abnormally.
    pub async fn serve_with_shutdown<F>(&self, shutdown: F) -> DashboardResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.state.config().bind_addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| DashboardError::BindFailed(addr, e))?;
        self.serve_listener(listener, shutdown).await
    }

    /// Serve on an already-bound listener until `shutdown` completes.
    ///
    /// # Errors
    ///
    /// Returns an error if the server stops abnormally.
    pub async fn serve_listener<F>(&self, listener: TcpListener, shutdown: F) -> DashboardResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local = listener
            .local_addr()
            .map_err(|e| DashboardError::Internal(e.to_string()))?;
        info!(addr = %local, "Dashboard server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| DashboardError::Internal(e.to_string()))?;

        info!("Dashboard server shut down");
        Ok(())
    }
}
