//! NOAA planetary K-index source.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use spacewatch_alerts::{IndicatorKind, Reading};

use crate::error::{SourceError, SourceResult};
use crate::fields::{as_number, as_text, entries, first_present, object, GEOMAGNETIC_FIELDS};
use crate::source::{IndicatorSource, ProviderClient};

/// Default NOAA one-minute planetary K-index feed.
pub const DEFAULT_ENDPOINT: &str = "https://services.swpc.noaa.gov/json/planetary_k_index_1m.json";

/// Extracts the geomagnetic reading from the first entry of a NOAA feed.
///
/// # Errors
///
/// Returns an error if the payload is not an array of objects or the first
/// entry has no usable index value.
pub fn parse_geomagnetic(payload: &Value) -> SourceResult<Option<Reading>> {
    let Some(first) = entries(payload)?.first() else {
        return Ok(None);
    };
    let entry = object(first)?;

    let raw = first_present(entry, GEOMAGNETIC_FIELDS.value)
        .ok_or(SourceError::MissingField { field: "kp_index" })?;
    let kp = as_number(raw).ok_or_else(|| SourceError::Malformed {
        reason: format!("non-numeric geomagnetic index {raw}"),
    })?;

    let mut reading = Reading::numeric(IndicatorKind::Geomagnetic, kp);
    if let Some(time) = first_present(entry, GEOMAGNETIC_FIELDS.observed_at).and_then(as_text) {
        reading = reading.with_observed_at(time);
    }
    Ok(Some(reading))
}

/// Samples the planetary K index from NOAA SWPC.
#[derive(Debug, Clone)]
pub struct GeomagneticSource {
    endpoint: String,
    http: ProviderClient,
}

impl GeomagneticSource {
    /// Creates a source reading from `endpoint`.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, http: ProviderClient) -> Self {
        Self {
            endpoint: endpoint.into(),
            http,
        }
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl IndicatorSource for GeomagneticSource {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Geomagnetic
    }

    fn fetch_reading(
        &self,
    ) -> Pin<Box<dyn Future<Output = SourceResult<Option<Reading>>> + Send + '_>> {
        Box::pin(async move {
            let payload = self.http.get_json(&self.endpoint, &[]).await?;
            parse_geomagnetic(&payload)
        })
    }
}
