//! Display model and HTML rendering for the status page.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use handlebars::Handlebars;
use serde::Serialize;
use spacewatch_store::LoadOutcome;

use crate::error::{DashboardError, DashboardResult};

const NOT_AVAILABLE: &str = "N/A";

/// What the status page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
    /// `NORMAL`, `ELEVATED`, `CRITICAL`, `INITIALIZING` or `ERROR`.
    pub risk: String,
    /// Planetary K index.
    pub kp_value: String,
    /// Flare class letter.
    pub flare_class: String,
    /// Ejection speed.
    pub cme_speed: String,
    /// When the record was computed, or a placeholder.
    pub time: String,
    /// When the last alert went out.
    pub last_notified: String,
    /// True when the record is older than the staleness threshold.
    pub stale: bool,
}

impl StatusView {
    /// Builds the view for a load outcome.
    #[must_use]
    pub fn from_outcome(outcome: &LoadOutcome, now: DateTime<Utc>, stale_after: Duration) -> Self {
        match outcome {
            LoadOutcome::Empty => Self::placeholder("INITIALIZING", "No Data"),
            LoadOutcome::Corrupt(_) => Self::placeholder("ERROR", "Error Reading Data"),
            LoadOutcome::Loaded(state) => Self {
                risk: state.severity.as_str().to_string(),
                kp_value: state
                    .geo_value
                    .map_or_else(|| NOT_AVAILABLE.to_string(), |kp| format!("{kp:.2}")),
                flare_class: state
                    .flare_class
                    .map_or_else(|| NOT_AVAILABLE.to_string(), |c| c.to_string()),
                cme_speed: state
                    .ejection_speed
                    .map_or_else(|| NOT_AVAILABLE.to_string(), |s| format!("{s} km/s")),
                time: state.computed_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                last_notified: state.last_notified_at.map_or_else(
                    || "never".to_string(),
                    |t| t.to_rfc3339_opts(SecondsFormat::Secs, true),
                ),
                stale: state.age_secs(now) > stale_after.as_secs(),
            },
        }
    }

    fn placeholder(risk: &str, time: &str) -> Self {
        Self {
            risk: risk.to_string(),
            kp_value: NOT_AVAILABLE.to_string(),
            flare_class: NOT_AVAILABLE.to_string(),
            cme_speed: NOT_AVAILABLE.to_string(),
            time: time.to_string(),
            last_notified: NOT_AVAILABLE.to_string(),
            stale: false,
        }
    }

    fn accent(&self) -> &'static str {
        match self.risk.as_str() {
            "CRITICAL" => "#c62828",
            "ELEVATED" => "#ef6c00",
            "NORMAL" => "#2e7d32",
            _ => "#616161",
        }
    }
}

const PAGE_TEMPLATE: &str = include_str!("../templates/status.html.hbs");
const PAGE_NAME: &str = "status";

/// Template data: the view plus presentation-only fields.
#[derive(Serialize)]
struct PageContext<'a> {
    #[serde(flatten)]
    view: &'a StatusView,
    accent: &'static str,
    refresh_secs: Option<u64>,
}

/// Renders the status page.
///
/// # Errors
///
/// Returns `DashboardError::Template` if the template cannot be registered
/// or rendered.
pub fn render_page(view: &StatusView, refresh: Duration) -> DashboardResult<String> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(false);
    handlebars
        .register_template_string(PAGE_NAME, PAGE_TEMPLATE)
        .map_err(|e| DashboardError::Template(format!("failed to register status page: {e}")))?;

    let context = PageContext {
        view,
        accent: view.accent(),
        refresh_secs: (!refresh.is_zero()).then(|| refresh.as_secs()),
    };

    handlebars
        .render(PAGE_NAME, &context)
        .map_err(|e| DashboardError::Template(format!("failed to render status page: {e}")))
}
