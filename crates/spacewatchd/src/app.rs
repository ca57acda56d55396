//! Wiring from configuration to running components.

use std::sync::Arc;

use spacewatch_alerts::{LogChannel, NotificationChannel, Notifier, TwilioChannel, TwilioConfig};
use spacewatch_dashboard::{DashboardConfig, DashboardServer};
use spacewatch_store::{JsonStateStore, StateStore};
use tracing::info;

use crate::config::{GatewayKind, MonitorConfig};
use crate::error::{MonitorError, Result};
use crate::monitor::Monitor;

/// Opens the configured state store.
#[must_use]
pub fn open_store(config: &MonitorConfig) -> Arc<dyn StateStore> {
    Arc::new(JsonStateStore::new(config.state_path.clone()))
}

/// Builds the notifier for the configured gateway.
pub fn build_notifier(config: &MonitorConfig) -> Result<Notifier> {
    let gateway = &config.gateway;
    let channel: Arc<dyn NotificationChannel> = match gateway.kind {
        GatewayKind::Log => Arc::new(LogChannel::default()),
        GatewayKind::Twilio => {
            let (Some(sid), Some(token)) = (&gateway.account_sid, &gateway.auth_token) else {
                return Err(MonitorError::Config(
                    "twilio gateway requires account_sid and auth_token".to_string(),
                ));
            };
            let twilio = TwilioConfig::new(sid.clone(), token.clone())?
                .with_api_base(gateway.api_base.clone())
                .with_timeout_secs(gateway.timeout_secs);
            Arc::new(TwilioChannel::new(twilio)?)
        }
    };

    Ok(Notifier::new(channel, gateway.to.clone(), gateway.from.clone())
        .with_languages(config.alert_languages()))
}

/// Builds a monitor writing to `store`.
pub fn build_monitor(config: &MonitorConfig, store: Arc<dyn StateStore>) -> Result<Monitor> {
    let sources = config.providers.build(config.fetch_timeout())?;
    let notifier = build_notifier(config)?;

    info!(
        gateway = notifier.channel_name(),
        languages = ?notifier.languages(),
        state_path = %config.state_path.display(),
        "monitor configured"
    );

    Ok(Monitor::new(
        sources,
        config.thresholds,
        notifier,
        store,
        config.fetch_timeout(),
    ))
}

/// Builds the read-only dashboard over `store`.
#[must_use]
pub fn build_dashboard(config: &MonitorConfig, store: Arc<dyn StateStore>) -> DashboardServer {
    let dashboard = DashboardConfig::new(config.dashboard.bind_addr)
        .with_stale_after(config.stale_after())
        .with_refresh_interval(std::time::Duration::from_secs(config.dashboard.refresh_secs));
    DashboardServer::new(dashboard, store)
}

/// Resolves when the process receives Ctrl-C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received ctrl-c"),
        () = terminate => info!("received SIGTERM"),
    }
}
