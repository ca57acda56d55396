//! The source trait, shared HTTP plumbing and fault-isolated sampling.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use spacewatch_alerts::{CycleReadings, IndicatorKind, Reading, Sample};
use tracing::{debug, info, warn};

use crate::error::{SourceError, SourceResult};

/// A provider of one space weather indicator.
pub trait IndicatorSource: Send + Sync + fmt::Debug {
    /// The indicator this source produces.
    fn kind(&self) -> IndicatorKind;

    /// Fetches and parses the latest reading.
    ///
    /// `Ok(None)` means the provider answered but had nothing to report.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] on transport, status or payload problems.
    fn fetch_reading(
        &self,
    ) -> Pin<Box<dyn Future<Output = SourceResult<Option<Reading>>> + Send + '_>>;
}

/// Samples one source, converting every failure into `Sample::Unavailable`.
///
/// The fetch is bounded by `timeout`; failures are logged with the source
/// name and never propagate.
pub async fn sample(source: &dyn IndicatorSource, timeout: Duration) -> Sample {
    let kind = source.kind();
    match tokio::time::timeout(timeout, source.fetch_reading()).await {
        Ok(Ok(Some(reading))) => {
            debug!(source = %kind, value = ?reading.value, "reading observed");
            Sample::Observed(reading)
        }
        Ok(Ok(None)) => {
            info!(source = %kind, "provider reported no qualifying reading");
            Sample::Unavailable
        }
        Ok(Err(err)) => {
            warn!(source = %kind, error = %err, "source unavailable");
            Sample::Unavailable
        }
        Err(_) => {
            warn!(source = %kind, timeout_secs = timeout.as_secs(), "source timed out");
            Sample::Unavailable
        }
    }
}

/// The three sources sampled each cycle.
#[derive(Debug, Clone)]
pub struct IndicatorSources {
    /// Geomagnetic index source.
    pub geomagnetic: Arc<dyn IndicatorSource>,
    /// Solar flare source.
    pub flare: Arc<dyn IndicatorSource>,
    /// Coronal mass ejection source.
    pub ejection: Arc<dyn IndicatorSource>,
}

impl IndicatorSources {
    /// Bundles three sources.
    #[must_use]
    pub fn new(
        geomagnetic: Arc<dyn IndicatorSource>,
        flare: Arc<dyn IndicatorSource>,
        ejection: Arc<dyn IndicatorSource>,
    ) -> Self {
        Self {
            geomagnetic,
            flare,
            ejection,
        }
    }

    /// Samples all three sources concurrently.
    ///
    /// A slow or failing source only affects its own sample.
    pub async fn sample_all(&self, timeout: Duration) -> CycleReadings {
        let (geomagnetic, flare, ejection) = tokio::join!(
            sample(self.geomagnetic.as_ref(), timeout),
            sample(self.flare.as_ref(), timeout),
            sample(self.ejection.as_ref(), timeout),
        );
        CycleReadings::new(geomagnetic, flare, ejection)
    }
}

/// Thin JSON-over-HTTP client shared by the provider sources.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    client: reqwest::Client,
}

impl ProviderClient {
    /// Builds a client whose requests time out after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Config` if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> SourceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("spacewatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self { client })
    }

    /// Issues a GET and decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Status` on a non-success status, otherwise a
    /// transport or decode error.
    pub async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> SourceResult<Value> {
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response.json::<Value>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spacewatch_alerts::FlareClass;

    #[derive(Debug)]
    enum Behaviour {
        Reading(Reading),
        Nothing,
        Fail,
        Hang,
    }

    #[derive(Debug)]
    struct StubSource {
        kind: IndicatorKind,
        behaviour: Behaviour,
    }

    impl StubSource {
        fn arc(kind: IndicatorKind, behaviour: Behaviour) -> Arc<dyn IndicatorSource> {
            Arc::new(Self { kind, behaviour })
        }
    }

    impl IndicatorSource for StubSource {
        fn kind(&self) -> IndicatorKind {
            self.kind
        }

        fn fetch_reading(
            &self,
        ) -> Pin<Box<dyn Future<Output = SourceResult<Option<Reading>>> + Send + '_>> {
            Box::pin(async move {
                match &self.behaviour {
                    Behaviour::Reading(r) => Ok(Some(r.clone())),
                    Behaviour::Nothing => Ok(None),
                    Behaviour::Fail => Err(SourceError::Status { status: 500 }),
                    Behaviour::Hang => {
                        tokio::time::sleep(Duration::from_secs(3600)).await;
                        Ok(None)
                    }
                }
            })
        }
    }

    #[tokio::test]
    async fn sample_wraps_reading() {
        let source = StubSource::arc(
            IndicatorKind::Geomagnetic,
            Behaviour::Reading(Reading::numeric(IndicatorKind::Geomagnetic, 4.0)),
        );
        let sampled = sample(source.as_ref(), Duration::from_secs(1)).await;
        assert_eq!(sampled.numeric(), Some(4.0));
    }

    #[tokio::test]
    async fn sample_maps_none_and_errors_to_unavailable() {
        let nothing = StubSource::arc(IndicatorKind::Ejection, Behaviour::Nothing);
        let failing = StubSource::arc(IndicatorKind::Flare, Behaviour::Fail);

        assert!(!sample(nothing.as_ref(), Duration::from_secs(1)).await.is_available());
        assert!(!sample(failing.as_ref(), Duration::from_secs(1)).await.is_available());
    }

    #[tokio::test(start_paused = true)]
    async fn sample_times_out() {
        let hanging = StubSource::arc(IndicatorKind::Geomagnetic, Behaviour::Hang);
        let sampled = sample(hanging.as_ref(), Duration::from_secs(5)).await;
        assert_eq!(sampled, Sample::Unavailable);
    }

    #[tokio::test(start_paused = true)]
    async fn sample_all_isolates_failures() {
        let sources = IndicatorSources::new(
            StubSource::arc(IndicatorKind::Geomagnetic, Behaviour::Hang),
            StubSource::arc(
                IndicatorKind::Flare,
                Behaviour::Reading(Reading::flare(FlareClass::X)),
            ),
            StubSource::arc(IndicatorKind::Ejection, Behaviour::Fail),
        );

        let readings = sources.sample_all(Duration::from_secs(5)).await;
        assert_eq!(readings.geomagnetic, Sample::Unavailable);
        assert_eq!(readings.flare_class(), Some(FlareClass::X));
        assert_eq!(readings.ejection, Sample::Unavailable);
        assert_eq!(
            readings.unavailable(),
            vec![IndicatorKind::Geomagnetic, IndicatorKind::Ejection]
        );
    }
}
