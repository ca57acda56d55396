//! Dashboard server configuration.

use std::net::SocketAddr;
use std::time::Duration;

/// Configuration for the dashboard server.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Address to bind the HTTP server to.
    pub bind_addr: SocketAddr,
    /// Records older than this are flagged stale.
    pub stale_after: Duration,
    /// Page auto-refresh interval. Zero disables refreshing.
    pub refresh_interval: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            stale_after: Duration::from_secs(900),
            refresh_interval: Duration::from_secs(60),
        }
    }
}

impl DashboardConfig {
    /// Create a new configuration with the specified bind address.
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Self::default()
        }
    }

    /// Set the staleness threshold.
    #[must_use]
    pub const fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// Set the page refresh interval.
    #[must_use]
    pub const fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }
}
