//! Notification channels for alert delivery.
//!
//! This module provides the [`NotificationChannel`] trait and the gateways
//! spacewatch can deliver through:
//! - [`TwilioChannel`]: the Twilio Messages API (SMS or WhatsApp addresses)
//! - [`LogChannel`]: writes the message to the log, for dry runs

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AlertError, Result};

/// A message ready to hand to a messaging gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// The full message text.
    pub body: String,
    /// Gateway address of the recipient.
    pub recipient: String,
    /// Gateway address of the sender.
    pub sender: String,
}

/// Acknowledgement returned by a gateway for an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReceipt {
    /// The channel that accepted the message.
    pub channel: String,
    /// The gateway's opaque identifier for the message.
    pub dispatch_id: String,
}

impl DispatchReceipt {
    /// Creates a receipt.
    #[must_use]
    pub fn new(channel: impl Into<String>, dispatch_id: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            dispatch_id: dispatch_id.into(),
        }
    }
}

/// Trait for messaging gateways.
///
/// Implement this trait to deliver alerts through another service.
pub trait NotificationChannel: Send + Sync + fmt::Debug {
    /// Returns the name of this channel.
    fn name(&self) -> &str;

    /// Sends a message through this channel.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::DispatchFailed` if the gateway does not accept
    /// the message.
    fn send<'a>(
        &'a self,
        message: &'a OutboundMessage,
    ) -> Pin<Box<dyn Future<Output = Result<DispatchReceipt>> + Send + 'a>>;
}

/// Configuration for the Twilio gateway.
#[derive(Clone, Serialize, Deserialize)]
pub struct TwilioConfig {
    /// Account SID, also the basic-auth user.
    pub account_sid: String,
    /// Auth token, the basic-auth password.
    pub auth_token: String,
    /// API base URL.
    pub api_base: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl fmt::Debug for TwilioConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwilioConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl TwilioConfig {
    /// Default public API base.
    pub const DEFAULT_API_BASE: &'static str = "https://api.twilio.com";

    /// Creates a new Twilio configuration.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::InvalidChannel` if either credential is empty.
    pub fn new(account_sid: impl Into<String>, auth_token: impl Into<String>) -> Result<Self> {
        let account_sid = account_sid.into();
        let auth_token = auth_token.into();
        if account_sid.is_empty() || auth_token.is_empty() {
            return Err(AlertError::InvalidChannel {
                reason: "twilio account sid and auth token are required".to_string(),
            });
        }

        Ok(Self {
            account_sid,
            auth_token,
            api_base: Self::DEFAULT_API_BASE.to_string(),
            timeout_secs: 15,
        })
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub const fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// The Messages resource URL for this account.
    #[must_use]
    pub fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base.trim_end_matches('/'),
            self.account_sid
        )
    }
}

/// Successful response body from the Messages resource.
#[derive(Debug, Deserialize)]
struct TwilioMessageResponse {
    sid: String,
}

/// A channel that delivers through the Twilio Messages API.
#[derive(Debug, Clone)]
pub struct TwilioChannel {
    config: TwilioConfig,
    client: reqwest::Client,
}

impl TwilioChannel {
    /// Creates a new Twilio channel.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::InvalidChannel` if the HTTP client cannot be built.
    pub fn new(config: TwilioConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AlertError::InvalidChannel {
                reason: format!("failed to build http client: {e}"),
            })?;

        Ok(Self { config, client })
    }

    fn failure(&self, reason: impl Into<String>) -> AlertError {
        AlertError::DispatchFailed {
            channel: self.name().to_string(),
            reason: reason.into(),
        }
    }
}

impl NotificationChannel for TwilioChannel {
    fn name(&self) -> &str {
        "twilio"
    }

    fn send<'a>(
        &'a self,
        message: &'a OutboundMessage,
    ) -> Pin<Box<dyn Future<Output = Result<DispatchReceipt>> + Send + 'a>> {
        Box::pin(async move {
            let url = self.config.messages_url();
            debug!(url = %url, to = %message.recipient, "posting message to twilio");

            let form = [
                ("To", message.recipient.as_str()),
                ("From", message.sender.as_str()),
                ("Body", message.body.as_str()),
            ];

            let response = self
                .client
                .post(&url)
                .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
                .form(&form)
                .send()
                .await
                .map_err(|e| self.failure(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let detail = response.text().await.unwrap_or_default();
                return Err(self.failure(format!("HTTP {status}: {detail}")));
            }

            let body: TwilioMessageResponse = response
                .json()
                .await
                .map_err(|e| self.failure(format!("unreadable response: {e}")))?;

            info!(channel = %self.name(), sid = %body.sid, "message accepted");
            Ok(DispatchReceipt::new(self.name(), body.sid))
        })
    }
}

/// A channel that logs messages instead of delivering them.
#[derive(Debug, Clone)]
pub struct LogChannel {
    name: String,
}

impl LogChannel {
    /// Creates a new log channel.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for LogChannel {
    fn default() -> Self {
        Self::new("log")
    }
}

impl NotificationChannel for LogChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn send<'a>(
        &'a self,
        message: &'a OutboundMessage,
    ) -> Pin<Box<dyn Future<Output = Result<DispatchReceipt>> + Send + 'a>> {
        Box::pin(async move {
            let dispatch_id = format!("log-{}", Uuid::new_v4());
            info!(
                channel = %self.name,
                dispatch_id = %dispatch_id,
                to = %message.recipient,
                from = %message.sender,
                body = %message.body,
                "ALERT"
            );
            Ok(DispatchReceipt::new(self.name(), dispatch_id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Form;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    fn message() -> OutboundMessage {
        OutboundMessage {
            body: "✅ Space weather normal".to_string(),
            recipient: "whatsapp:+15550001111".to_string(),
            sender: "whatsapp:+15559998888".to_string(),
        }
    }

    async fn spawn_gateway(router: Router) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    #[test]
    fn twilio_config_requires_credentials() {
        assert!(TwilioConfig::new("", "token").is_err());
        assert!(TwilioConfig::new("AC123", "").is_err());
        assert!(TwilioConfig::new("AC123", "token").is_ok());
    }

    #[test]
    fn twilio_messages_url() {
        let config = TwilioConfig::new("AC123", "token")
            .unwrap()
            .with_api_base("http://localhost:9000/");
        assert_eq!(
            config.messages_url(),
            "http://localhost:9000/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[test]
    fn twilio_config_debug_redacts_token() {
        let config = TwilioConfig::new("AC123", "super-secret").unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("AC123"));
    }

    #[tokio::test]
    async fn log_channel_returns_unique_ids() {
        let channel = LogChannel::default();
        let first = channel.send(&message()).await.unwrap();
        let second = channel.send(&message()).await.unwrap();

        assert_eq!(first.channel, "log");
        assert!(first.dispatch_id.starts_with("log-"));
        assert_ne!(first.dispatch_id, second.dispatch_id);
    }

    #[tokio::test]
    async fn twilio_posts_form_and_returns_sid() {
        let router = Router::new().route(
            "/2010-04-01/Accounts/AC123/Messages.json",
            post(
                |headers: HeaderMap, Form(form): Form<HashMap<String, String>>| async move {
                    let authorized = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .is_some_and(|v| v.starts_with("Basic "));
                    let to = form.get("To").map(String::as_str);
                    if !authorized || to != Some("whatsapp:+15550001111") {
                        return (StatusCode::BAD_REQUEST, Json(serde_json::json!({})));
                    }
                    (
                        StatusCode::CREATED,
                        Json(serde_json::json!({ "sid": "SM42", "status": "queued" })),
                    )
                },
            ),
        );
        let addr = spawn_gateway(router).await;

        let config = TwilioConfig::new("AC123", "token")
            .unwrap()
            .with_api_base(format!("http://{addr}"));
        let channel = TwilioChannel::new(config).unwrap();

        let receipt = channel.send(&message()).await.unwrap();
        assert_eq!(receipt.dispatch_id, "SM42");
        assert_eq!(receipt.channel, "twilio");
    }

    #[tokio::test]
    async fn twilio_rejection_is_dispatch_failure() {
        let router = Router::new().route(
            "/2010-04-01/Accounts/AC123/Messages.json",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad credentials") }),
        );
        let addr = spawn_gateway(router).await;

        let config = TwilioConfig::new("AC123", "wrong")
            .unwrap()
            .with_api_base(format!("http://{addr}"));
        let channel = TwilioChannel::new(config).unwrap();

        let err = channel.send(&message()).await.unwrap_err();
        match err {
            AlertError::DispatchFailed { channel, reason } => {
                assert_eq!(channel, "twilio");
                assert!(reason.contains("401"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn twilio_unreachable_is_dispatch_failure() {
        let config = TwilioConfig::new("AC123", "token")
            .unwrap()
            .with_api_base("http://127.0.0.1:1")
            .with_timeout_secs(2);
        let channel = TwilioChannel::new(config).unwrap();

        let result = channel.send(&message()).await;
        assert!(matches!(result, Err(AlertError::DispatchFailed { .. })));
    }
}
