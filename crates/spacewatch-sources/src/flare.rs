//! NASA DONKI solar flare (FLR) source.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use spacewatch_alerts::{FlareClass, IndicatorKind, Reading};

use crate::error::{SourceError, SourceResult};
use crate::fields::{as_text, entries, first_present, object, FLARE_FIELDS};
use crate::source::{IndicatorSource, ProviderClient};

/// Default DONKI flare endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.nasa.gov/DONKI/FLR";

/// Extracts the flare class from the first entry of a DONKI FLR response.
///
/// Only the leading letter of `classType` matters, so `"X1.1"` is class X.
///
/// # Errors
///
/// Returns an error if the payload is malformed, the class is missing, or the
/// class letter is not one of `A B C M X`.
pub fn parse_flare(payload: &Value) -> SourceResult<Option<Reading>> {
    let Some(first) = entries(payload)?.first() else {
        return Ok(None);
    };
    let entry = object(first)?;

    let code = first_present(entry, FLARE_FIELDS.value)
        .and_then(as_text)
        .ok_or(SourceError::MissingField { field: "classType" })?;
    let class = FlareClass::from_code(&code).ok_or_else(|| SourceError::Malformed {
        reason: format!("unrecognized flare class {code:?}"),
    })?;

    let mut reading = Reading::flare(class);
    if let Some(time) = first_present(entry, FLARE_FIELDS.observed_at).and_then(as_text) {
        reading = reading.with_observed_at(time);
    }
    Ok(Some(reading))
}

/// Samples the latest solar flare from NASA DONKI.
#[derive(Debug, Clone)]
pub struct FlareSource {
    endpoint: String,
    api_key: Option<String>,
    http: ProviderClient,
}

impl FlareSource {
    /// Creates a flare source.
    #[must_use]
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, http: ProviderClient) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            http,
        }
    }
}

impl IndicatorSource for FlareSource {
    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Flare
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
            parse_flare(&payload)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use std::time::Duration;
    use test_case::test_case;
    use tokio::net::TcpListener;

    #[test_case("X1.1", FlareClass::X ; "x class")]
    #[test_case("M5.0", FlareClass::M ; "m class")]
    #[test_case("c3.2", FlareClass::C ; "lowercase")]
    #[test_case("B", FlareClass::B ; "bare letter")]
    fn parses_class_letter(code: &str, expected: FlareClass) {
        let payload = json!([{ "classType": code, "beginTime": "2024-05-10T06:27Z" }]);
        let reading = parse_flare(&payload).unwrap().unwrap();
        assert_eq!(reading.as_flare_class(), Some(expected));
        assert_eq!(reading.observed_at.as_deref(), Some("2024-05-10T06:27Z"));
    }

    #[test]
    fn falls_back_to_peak_time() {
        let payload = json!([{ "classType": "M1.0", "peakTime": "2024-05-10T06:54Z" }]);
        let reading = parse_flare(&payload).unwrap().unwrap();
        assert_eq!(reading.observed_at.as_deref(), Some("2024-05-10T06:54Z"));
    }

    #[test]
    fn uses_first_entry_only() {
        let payload = json!([
            { "classType": "C1.0" },
            { "classType": "X9.0" }
        ]);
        let reading = parse_flare(&payload).unwrap().unwrap();
        assert_eq!(reading.as_flare_class(), Some(FlareClass::C));
    }

    #[test]
    fn unknown_class_letter_is_an_error() {
        let err = parse_flare(&json!([{ "classType": "Q2.0" }])).unwrap_err();
        assert!(matches!(err, SourceError::Malformed { .. }));
    }

    #[test]
    fn missing_class_is_an_error() {
        let err = parse_flare(&json!([{ "beginTime": "2024-05-10T06:27Z" }])).unwrap_err();
        assert!(matches!(err, SourceError::MissingField { field: "classType" }));
    }

    #[test]
    fn empty_list_has_no_reading() {
        assert!(parse_flare(&json!([])).unwrap().is_none());
    }

    #[tokio::test]
    async fn sends_api_key_as_query_parameter() {
        let router = Router::new().route(
            "/DONKI/FLR",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                if params.get("api_key").map(String::as_str) != Some("secret-key") {
                    return (StatusCode::FORBIDDEN, Json(json!({ "error": "API_KEY_MISSING" })));
                }
                (StatusCode::OK, Json(json!([{ "classType": "X2.3" }])))
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let http = ProviderClient::new(Duration::from_secs(5)).unwrap();
        let url = format!("http://{addr}/DONKI/FLR");

        let keyed = FlareSource::new(url.clone(), Some("secret-key".to_string()), http.clone());
        let reading = keyed.fetch_reading().await.unwrap().unwrap();
        assert_eq!(reading.as_flare_class(), Some(FlareClass::X));

        let unkeyed = FlareSource::new(url, None, http);
        let err = unkeyed.fetch_reading().await.unwrap_err();
        assert!(matches!(err, SourceError::Status { status: 403 }));
    }
}
