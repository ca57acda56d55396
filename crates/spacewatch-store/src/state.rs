//! The durable alert record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spacewatch_alerts::{CycleReadings, FlareClass, NotificationRecord, Severity};

/// The single global alert record, overwritten every cycle.
///
/// Reading fields are `None` when that source was unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertState {
    /// Combined severity computed this cycle.
    pub severity: Severity,
    /// Planetary K index.
    pub geo_value: Option<f64>,
    /// Latest flare class.
    pub flare_class: Option<FlareClass>,
    /// Speed of the material ejection, km/s.
    pub ejection_speed: Option<f64>,
    /// When this record was computed.
    pub computed_at: DateTime<Utc>,
    /// When the last alert was accepted by the gateway.
    pub last_notified_at: Option<DateTime<Utc>>,
    /// Gateway id of the last accepted alert.
    pub last_notification_id: Option<String>,
}

impl AlertState {
    /// Builds a record from one cycle's outcome, with no notification history.
    #[must_use]
    pub fn observe(
        severity: Severity,
        readings: &CycleReadings,
        computed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            severity,
            geo_value: readings.geo_value(),
            flare_class: readings.flare_class(),
            ejection_speed: readings.ejection_speed(),
            computed_at,
            last_notified_at: None,
            last_notification_id: None,
        }
    }

    /// Copies the notification fields from a prior record, if any.
    #[must_use]
    pub fn carry_notification(mut self, prior: Option<&Self>) -> Self {
        if let Some(prior) = prior {
            self.last_notified_at = prior.last_notified_at;
            self.last_notification_id.clone_from(&prior.last_notification_id);
        }
        self
    }

    /// Records an accepted notification.
    #[must_use]
    pub fn record_notification(mut self, record: &NotificationRecord) -> Self {
        self.last_notified_at = Some(record.sent_at);
        self.last_notification_id = Some(record.dispatch_id.clone());
        self
    }

    /// Seconds elapsed between `computed_at` and `now`, clamped at zero.
    #[must_use]
    pub fn age_secs(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from((now - self.computed_at).num_seconds()).unwrap_or(0)
    }
}

/// What a load found on disk.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// No record exists yet.
    Empty,
    /// A record exists but could not be read or parsed.
    Corrupt(String),
    /// A valid record.
    Loaded(AlertState),
}

impl LoadOutcome {
    /// The loaded record, if valid.
    #[must_use]
    pub const fn state(&self) -> Option<&AlertState> {
        match self {
            Self::Loaded(state) => Some(state),
            Self::Empty | Self::Corrupt(_) => None,
        }
    }

    /// The last recorded severity.
    ///
    /// `None` is the uninitialized sentinel and is distinct from
    /// `Some(Severity::Normal)`.
    #[must_use]
    pub fn last_severity(&self) -> Option<Severity> {
        self.state().map(|s| s.severity)
    }
}
