//! NASA DONKI coronal mass ejection analysis (CMEAnalysis) source.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use spacewatch_alerts::{IndicatorKind, Reading};
use tracing::trace;

use crate::error::SourceResult;
use crate::fields::{as_flag, as_number, as_text, entries, first_present, EJECTION_FIELDS};
use crate::source::{IndicatorSource, ProviderClient};

/// Default DONKI CME analysis endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.nasa.gov/DONKI/CMEAnalysis";

/// Default materiality floor in km/s.
pub const DEFAULT_MIN_SPEED: f64 = 600.0;

/// Selects the first most-accurate analysis faster than `min_speed`.
///
/// Entries that are not objects, lack the accuracy flag, or have no numeric
/// speed are skipped.
///
/// # Errors
///
/// Returns `SourceError::Malformed` if the payload is not an array.
pub fn parse_ejection(payload: &Value, min_speed: f64) -> SourceResult<Option<Reading>> {
    for (index, item) in entries(payload)?.iter().enumerate() {
        let Some(entry) = item.as_object() else {
            trace!(index, "skipping non-object analysis");
            continue;
        };

        let accurate = first_present(entry, EJECTION_FIELDS.accuracy)
            .and_then(as_flag)
            .unwrap_or(false);
        let speed = first_present(entry, EJECTION_FIELDS.value).and_then(as_number);

        if let Some(speed) = speed.filter(|s| accurate && *s > min_speed) {
            let mut reading = Reading::numeric(IndicatorKind::Ejection, speed);
            if let Some(time) =
                first_present(entry, EJECTION_FIELDS.observed_at).and_then(as_text)
            {
                reading = reading.with_observed_at(time);
            }
            return Ok(Some(reading));
        }
    }
    Ok(None)
}

/// Samples material coronal mass ejections from NASA DONKI.
#[derive(Debug, Clone)]
pub struct EjectionSource {
    endpoint: String,
    api_key: Option<String>,
    min_speed: f64,
    http: ProviderClient,
}

impl EjectionSource {
    /// Creates an ejection source with the default materiality floor.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, http: ProviderClient) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            min_speed: DEFAULT_MIN_SPEED,
            http,
        }
    }

    /// Sets the materiality floor in km/s.
    #[must_use]
    pub const fn with_min_speed(mut self, min_speed: f64) -> Self {
        self.min_speed = min_speed;
        self
    }

    /// Returns the materiality floor.
    #[must_use]
    pub const fn min_speed(&self) -> f64 {
        self.min_speed
    }
}

impl IndicatorSource for EjectionSource {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Ejection
    }

    fn fetch_reading(
        &self,
    ) -> Pin<Box<dyn Future<Output = SourceResult<Option<Reading>>> + Send + '_>> {
        Box::pin(async move {
            let query: Vec<(&str, &str)> = self
                .api_key
                .as_deref()
                .map(|key| ("api_key", key))
                .into_iter()
                .collect();
            let payload = self.http.get_json(&self.endpoint, &query).await?;
            parse_ejection(&payload, self.min_speed)
        })
    }
}
