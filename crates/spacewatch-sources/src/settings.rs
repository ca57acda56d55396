//! Provider endpoints and source construction.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{SourceError, SourceResult};
use crate::source::{IndicatorSources, ProviderClient};
use crate::{ejection, flare, geomagnetic};

/// Endpoints and options for the three providers.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// NOAA planetary K-index feed.
    pub geomagnetic_url: String,
    /// NASA DONKI FLR endpoint.
    pub flare_url: String,
    /// NASA DONKI CMEAnalysis endpoint.
    pub ejection_url: String,
    /// NASA API key, sent as the `api_key` query parameter.
    pub nasa_api_key: Option<String>,
    /// Ejections at or below this speed (km/s) are ignored.
    pub ejection_min_speed: f64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            geomagnetic_url: geomagnetic::DEFAULT_ENDPOINT.to_string(),
            flare_url: flare::DEFAULT_ENDPOINT.to_string(),
            ejection_url: ejection::DEFAULT_ENDPOINT.to_string(),
            nasa_api_key: None,
            ejection_min_speed: ejection::DEFAULT_MIN_SPEED,
        }
    }
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("geomagnetic_url", &self.geomagnetic_url)
            .field("flare_url", &self.flare_url)
            .field("ejection_url", &self.ejection_url)
            .field("nasa_api_key", &self.nasa_api_key.as_ref().map(|_| "<redacted>"))
            .field("ejection_min_speed", &self.ejection_min_speed)
            .finish()
    }
}

impl ProviderSettings {
    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Config` for empty URLs or a negative or
    /// non-finite speed floor.
    pub fn validate(&self) -> SourceResult<()> {
        for (name, url) in [
            ("geomagnetic_url", &self.geomagnetic_url),
            ("flare_url", &self.flare_url),
            ("ejection_url", &self.ejection_url),
        ] {
            if url.trim().is_empty() {
                return Err(SourceError::Config(format!("{name} cannot be empty")));
            }
        }
        if !self.ejection_min_speed.is_finite() || self.ejection_min_speed < 0.0 {
            return Err(SourceError::Config(
                "ejection_min_speed must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the three HTTP sources sharing one client.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Config` if validation fails or the HTTP client
    /// cannot be built.
    pub fn build(&self, timeout: Duration) -> SourceResult<IndicatorSources> {
        self.validate()?;
        let http = ProviderClient::new(timeout)?;
        let api_key = self.nasa_api_key.clone().filter(|k| !k.is_empty());

        Ok(IndicatorSources::new(
            Arc::new(geomagnetic::GeomagneticSource::new(
                self.geomagnetic_url.clone(),
                http.clone(),
            )),
            Arc::new(flare::FlareSource::new(
                self.flare_url.clone(),
                api_key.clone(),
                http.clone(),
            )),
            Arc::new(
                ejection::EjectionSource::new(self.ejection_url.clone(), api_key, http)
                    .with_min_speed(self.ejection_min_speed),
            ),
        ))
    }
}
