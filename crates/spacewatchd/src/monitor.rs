//! The monitoring cycle.
//!
//! One cycle samples the three indicators, classifies the result, decides
//! whether the severity changed since the last persisted record, notifies if
//! it did and always persists the new record.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use serde::Serialize;
use spacewatch_alerts::{classify_cycle, IndicatorKind, Notifier, Severity, Thresholds};
use spacewatch_sources::IndicatorSources;
use spacewatch_store::{AlertState, LoadOutcome, StateStore};
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Where a cycle currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    /// Waiting for the next tick.
    Idle,
    /// Sampling providers.
    Fetching,
    /// Computing the cycle severity.
    Classifying,
    /// Comparing against the prior record.
    Deciding,
    /// Dispatching an alert.
    Notifying,
    /// Writing the record.
    Persisting,
}

impl CyclePhase {
    /// Returns the phase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Classifying => "classifying",
            Self::Deciding => "deciding",
            Self::Notifying => "notifying",
            Self::Persisting => "persisting",
        }
    }
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a cycle at `current` severity should dispatch an alert.
///
/// `previous` is `None` when there is no usable prior record, which always
/// notifies.
#[must_use]
pub fn should_notify(previous: Option<Severity>, current: Severity) -> bool {
    previous != Some(current)
}

/// Summary of one completed cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Cycle identifier, also used as the tracing span id.
    pub cycle_id: String,
    /// Severity computed this cycle.
    pub severity: Severity,
    /// Severity of the prior record, if one was readable.
    pub previous: Option<Severity>,
    /// Dispatch id of the alert sent this cycle.
    pub notified: Option<String>,
    /// Gateway error if an alert was due but not delivered.
    pub dispatch_error: Option<String>,
    /// Whether the record was written.
    pub persisted: bool,
    /// Store error if the write failed.
    pub persist_error: Option<String>,
    /// Indicators that could not be sampled.
    pub unavailable: Vec<IndicatorKind>,
}

impl CycleReport {
    /// Whether an alert was due this cycle.
    #[must_use]
    pub const fn alert_due(&self) -> bool {
        self.notified.is_some() || self.dispatch_error.is_some()
    }
}

/// Result of asking the monitor to run a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The cycle ran to completion.
    Completed(CycleReport),
    /// Another cycle was in progress.
    Skipped,
    /// The cycle panicked; the payload message is kept.
    Panicked(String),
}

impl CycleOutcome {
    /// The report, if the cycle completed.
    #[must_use]
    pub const fn report(&self) -> Option<&CycleReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Skipped | Self::Panicked(_) => None,
        }
    }
}

/// Runs monitoring cycles against a set of sources, a notifier and a store.
#[derive(Debug)]
pub struct Monitor {
    sources: IndicatorSources,
    thresholds: Thresholds,
    notifier: Notifier,
    store: Arc<dyn StateStore>,
    fetch_timeout: Duration,
    cycle_lock: tokio::sync::Mutex<()>,
    phase: parking_lot::Mutex<CyclePhase>,
}

impl Monitor {
    /// Creates a monitor.
    #[must_use]
    pub fn new(
        sources: IndicatorSources,
        thresholds: Thresholds,
        notifier: Notifier,
        store: Arc<dyn StateStore>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            sources,
            thresholds,
            notifier,
            store,
            fetch_timeout,
            cycle_lock: tokio::sync::Mutex::new(()),
            phase: parking_lot::Mutex::new(CyclePhase::Idle),
        }
    }

    /// The phase of the cycle in progress, or `Idle`.
    #[must_use]
    pub fn phase(&self) -> CyclePhase {
        *self.phase.lock()
    }

    /// The store this monitor writes to.
    #[must_use]
    pub fn store(&self) -> Arc<dyn StateStore> {
        self.store.clone()
    }

    fn enter(&self, phase: CyclePhase) {
        *self.phase.lock() = phase;
        debug!(phase = %phase, "cycle phase");
    }

    /// Runs one cycle.
    ///
    /// Returns `Skipped` without doing anything if a cycle is already in
    /// progress. A panic inside the cycle is caught and logged.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let Ok(_guard) = self.cycle_lock.try_lock() else {
            warn!(phase = %self.phase(), "cycle already in progress, skipping");
            return CycleOutcome::Skipped;
        };

        let cycle_id = Uuid::new_v4().to_string();
        let span = info_span!("cycle", id = %cycle_id);
        let result = AssertUnwindSafe(self.execute(cycle_id).instrument(span))
            .catch_unwind()
            .await;
        self.enter(CyclePhase::Idle);

        match result {
            Ok(report) => CycleOutcome::Completed(report),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(panic = %message, "cycle panicked");
                CycleOutcome::Panicked(message)
            }
        }
    }

    async fn execute(&self, cycle_id: String) -> CycleReport {
        self.enter(CyclePhase::Fetching);
        let readings = self.sources.sample_all(self.fetch_timeout).await;
        let unavailable = readings.unavailable();

        self.enter(CyclePhase::Classifying);
        let severity = classify_cycle(&self.thresholds, &readings);

        self.enter(CyclePhase::Deciding);
        let prior = self.store.load();
        if let LoadOutcome::Corrupt(reason) = &prior {
            warn!(reason = %reason, "stored record unreadable, treating as uninitialized");
        }
        let previous = prior.last_severity();
        let mut state = AlertState::observe(severity, &readings, Utc::now())
            .carry_notification(prior.state());

        let mut notified = None;
        let mut dispatch_error = None;
        if should_notify(previous, severity) {
            self.enter(CyclePhase::Notifying);
            match self.notifier.notify(severity, &readings, previous).await {
                Ok(record) => {
                    state = state.record_notification(&record);
                    notified = Some(record.dispatch_id);
                }
                Err(err) => dispatch_error = Some(err.to_string()),
            }
        } else {
            debug!(severity = %severity, "severity unchanged, no alert");
        }

        self.enter(CyclePhase::Persisting);
        let persist_error = match self.store.save(&state) {
            Ok(()) => None,
            Err(err) => {
                error!(error = %err, "failed to persist alert record");
                Some(err.to_string())
            }
        };

        info!(
            severity = %severity,
            previous = previous.map_or("UNINITIALIZED", |s| s.as_str()),
            notified = notified.is_some(),
            unavailable = unavailable.len(),
            "cycle complete"
        );

        CycleReport {
            cycle_id,
            severity,
            previous,
            notified,
            dispatch_error,
            persisted: persist_error.is_none(),
            persist_error,
            unavailable,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
