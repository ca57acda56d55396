//! Periodic cycle scheduling.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};

use crate::monitor::{CycleOutcome, Monitor};

/// Drives the monitor on a fixed interval until shutdown.
#[derive(Debug, Clone)]
pub struct Scheduler {
    monitor: Arc<Monitor>,
    interval: Duration,
}

impl Scheduler {
    /// Creates a scheduler ticking every `interval`.
    #[must_use]
    pub const fn new(monitor: Arc<Monitor>, interval: Duration) -> Self {
        Self { monitor, interval }
    }

    /// Runs cycles until a shutdown message arrives or the sender is dropped.
    ///
    /// The first cycle starts immediately. A cycle in progress when shutdown
    /// is requested runs to completion; ticks missed while a cycle overran
    /// are skipped. Returns the number of cycles started.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> usize {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut cycles = 0usize;

        info!(interval_secs = self.interval.as_secs(), "scheduler started");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.recv() => {
                    info!(cycles, "shutdown requested, stopping scheduler");
                    break;
                }

                _ = ticker.tick() => {
                    cycles += 1;
                    match self.monitor.run_cycle().await {
                        CycleOutcome::Completed(_) => {}
                        CycleOutcome::Skipped => warn!("previous cycle still running"),
                        CycleOutcome::Panicked(message) => {
                            warn!(panic = %message, "cycle aborted, continuing with next tick");
                        }
                    }
                }
            }
        }

        cycles
    }
}
