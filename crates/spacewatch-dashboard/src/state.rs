//! Shared state for the dashboard server.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use spacewatch_store::{LoadOutcome, StateStore};

use crate::config::DashboardConfig;
use crate::view::StatusView;

/// Shared state for the dashboard server.
#[derive(Debug)]
pub struct DashboardState {
    config: Arc<DashboardConfig>,
    store: Arc<dyn StateStore>,
    start_time: Instant,
}

impl DashboardState {
    /// Create a new dashboard state reading from `store`.
    pub fn new(config: DashboardConfig, store: Arc<dyn StateStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
            start_time: Instant::now(),
        }
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Seconds since the server state was created.
    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Reads the alert record.
    #[must_use]
    pub fn load(&self) -> LoadOutcome {
        self.store.load()
    }

    /// Reads the alert record and builds the page view.
    #[must_use]
    pub fn status_view(&self) -> StatusView {
        StatusView::from_outcome(&self.load(), Utc::now(), self.config.stale_after)
    }
}
