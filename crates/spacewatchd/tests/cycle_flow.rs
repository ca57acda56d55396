//! Full cycles against in-process provider and gateway servers.

#![allow(clippy::panic)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};
use spacewatch_alerts::{FlareClass, Severity};
use spacewatch_store::{JsonStateStore, LoadOutcome, StateStore};
use spacewatchd::{app, CycleOutcome, CycleReport, GatewayKind, MonitorConfig};
use tempfile::TempDir;
use tokio::net::TcpListener;

#[derive(Default)]
struct World {
    kp: Mutex<Option<f64>>,
    flare: Mutex<Option<String>>,
    cme_speed: Mutex<Option<f64>>,
    gateway_down: Mutex<bool>,
    messages: Mutex<Vec<HashMap<String, String>>>,
    api_keys: Mutex<Vec<String>>,
}

type Shared = Arc<World>;

async fn kp_feed(State(world): State<Shared>) -> Json<Value> {
    match *world.kp.lock() {
        Some(kp) => Json(json!([{ "time_tag": "2024-05-10T17:00:00", "kp_index": kp }])),
        None => Json(json!([])),
    }
}

async fn flare_feed(
    State(world): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    if let Some(key) = query.get("api_key") {
        world.api_keys.lock().push(key.clone());
    }
    match world.flare.lock().clone() {
        Some(class) => Json(json!([{ "classType": class, "beginTime": "2024-05-10T16:30Z" }])),
        None => Json(json!([])),
    }
}

async fn cme_feed(State(world): State<Shared>) -> Json<Value> {
    match *world.cme_speed.lock() {
        Some(speed) => Json(json!([{
            "speed": speed,
            "isMostAccurate": true,
            "time21_5": "2024-05-10T18:00Z",
        }])),
        None => Json(json!([])),
    }
}

async fn send_message(
    State(world): State<Shared>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    if *world.gateway_down.lock() {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream unavailable").into_response();
    }
    let mut messages = world.messages.lock();
    messages.push(form);
    Json(json!({ "sid": format!("SM{:04}", messages.len()), "status": "queued" })).into_response()
}

async fn spawn_world(world: Shared) -> SocketAddr {
    let router = Router::new()
        .route("/noaa/kp.json", get(kp_feed))
        .route("/donki/FLR", get(flare_feed))
        .route("/donki/CMEAnalysis", get(cme_feed))
        .route("/twilio/2010-04-01/Accounts/AC123/Messages.json", post(send_message))
        .with_state(world);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

struct Fixture {
    world: Shared,
    config: MonitorConfig,
    _dir: TempDir,
}

impl Fixture {
    async fn new() -> Self {
        let world: Shared = Arc::new(World::default());
        *world.kp.lock() = Some(2.0);
        let addr = spawn_world(world.clone()).await;
        let dir = TempDir::new().unwrap();

        let mut config = MonitorConfig::from_toml(&format!(
            r#"
            state_path = "{state}"
            fetch_timeout_secs = 5
            languages = ["en"]

            [providers]
            geomagnetic_url = "http://{addr}/noaa/kp.json"
            flare_url = "http://{addr}/donki/FLR"
            ejection_url = "http://{addr}/donki/CMEAnalysis"
            nasa_api_key = "DEMO_KEY"

            [gateway]
            kind = "twilio"
            account_sid = "AC123"
            auth_token = "token"
            from = "whatsapp:+14155238886"
            to = "whatsapp:+15550001111"
            api_base = "http://{addr}/twilio"
        "#,
            state = dir.path().join("status.json").display(),
        ))
        .unwrap();
        config.validate().unwrap();
        assert_eq!(config.gateway.kind, GatewayKind::Twilio);

        Self {
            world,
            config,
            _dir: dir,
        }
    }

    fn store(&self) -> Arc<dyn StateStore> {
        Arc::new(JsonStateStore::new(self.config.state_path.clone()))
    }

    async fn cycle(&self) -> CycleReport {
        let monitor = app::build_monitor(&self.config, self.store()).unwrap();
        match monitor.run_cycle().await {
            CycleOutcome::Completed(report) => report,
            other => panic!("cycle did not complete: {other:?}"),
        }
    }

    fn record(&self) -> spacewatch_store::AlertState {
        match self.store().load() {
            LoadOutcome::Loaded(state) => state,
            other => panic!("expected a stored record, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn first_cycle_notifies_and_persists() {
    let fixture = Fixture::new().await;

    let report = fixture.cycle().await;

    assert_eq!(report.severity, Severity::Normal);
    assert_eq!(report.notified.as_deref(), Some("SM0001"));

    let messages = fixture.world.messages.lock().clone();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["To"], "whatsapp:+15550001111");
    assert_eq!(messages[0]["From"], "whatsapp:+14155238886");
    assert!(messages[0]["Body"].contains("Kp=2.00"));

    let record = fixture.record();
    assert_eq!(record.severity, Severity::Normal);
    assert_eq!(record.geo_value, Some(2.0));
    assert_eq!(record.last_notification_id.as_deref(), Some("SM0001"));
    assert!(fixture.world.api_keys.lock().iter().all(|k| k == "DEMO_KEY"));
}

#[tokio::test]
async fn unchanged_severity_is_not_resent() {
    let fixture = Fixture::new().await;

    fixture.cycle().await;
    let mut first = fixture.record();
    first.computed_at -= chrono::Duration::hours(1);
    fixture.store().save(&first).unwrap();

    let report = fixture.cycle().await;

    assert!(report.notified.is_none());
    assert_eq!(fixture.world.messages.lock().len(), 1);

    let second = fixture.record();
    assert!(second.computed_at > first.computed_at);
    assert_eq!(second.last_notification_id, first.last_notification_id);
}

#[tokio::test]
async fn escalation_to_critical_notifies() {
    let fixture = Fixture::new().await;
    fixture.cycle().await;

    *fixture.world.kp.lock() = Some(6.5);
    *fixture.world.flare.lock() = Some("X1.0".to_string());
    *fixture.world.cme_speed.lock() = Some(1100.0);
    let report = fixture.cycle().await;

    assert_eq!(report.severity, Severity::Critical);
    assert_eq!(report.previous, Some(Severity::Normal));
    assert_eq!(report.notified.as_deref(), Some("SM0002"));

    let body = fixture.world.messages.lock()[1]["Body"].clone();
    assert!(body.contains("Flare Class: X"));
    assert!(body.contains("CME Speed: 1100 km/s"));

    let record = fixture.record();
    assert_eq!(record.flare_class, Some(FlareClass::X));
    assert_eq!(record.ejection_speed, Some(1100.0));
}

#[tokio::test]
async fn corrupt_record_forces_notification() {
    let fixture = Fixture::new().await;
    fixture.cycle().await;
    std::fs::write(&fixture.config.state_path, "{\"severity\": \"NORM").unwrap();

    let report = fixture.cycle().await;

    assert_eq!(report.previous, None);
    assert!(report.notified.is_some());
    assert_eq!(fixture.world.messages.lock().len(), 2);
    assert_eq!(fixture.record().severity, Severity::Normal);
}

#[tokio::test]
async fn gateway_failure_keeps_last_notification() {
    let fixture = Fixture::new().await;
    fixture.cycle().await;
    let before = fixture.record();

    *fixture.world.gateway_down.lock() = true;
    *fixture.world.kp.lock() = Some(4.0);
    let report = fixture.cycle().await;

    assert!(report.notified.is_none());
    assert!(report.dispatch_error.is_some());

    let after = fixture.record();
    assert_eq!(after.severity, Severity::Elevated);
    assert_eq!(after.geo_value, Some(4.0));
    assert_eq!(after.last_notification_id, before.last_notification_id);
    assert_eq!(after.last_notified_at, before.last_notified_at);
}

#[tokio::test]
async fn provider_outage_is_contained() {
    let fixture = Fixture::new().await;
    let mut config = fixture.config.clone();
    config.providers.flare_url = "http://127.0.0.1:1/donki/FLR".to_string();
    *fixture.world.kp.lock() = None;

    let monitor = app::build_monitor(&config, fixture.store()).unwrap();
    let report = match monitor.run_cycle().await {
        CycleOutcome::Completed(report) => report,
        other => panic!("cycle did not complete: {other:?}"),
    };

    assert_eq!(report.severity, Severity::Normal);
    assert_eq!(report.unavailable.len(), 3);
    assert!(report.notified.is_some());
    assert!(fixture.world.messages.lock()[0]["Body"].contains("Kp=N/A"));
}
