//! The notifier formats an alert and hands it to a gateway.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::channels::{NotificationChannel, OutboundMessage};
use crate::error::{AlertError, Result};
use crate::message::{compose, Language};
use crate::types::{CycleReadings, NotificationRecord, Severity};

/// Formats alerts and dispatches them to a single recipient.
#[derive(Debug, Clone)]
pub struct Notifier {
    channel: Arc<dyn NotificationChannel>,
    recipient: String,
    sender: String,
    languages: Vec<Language>,
}

impl Notifier {
    /// Creates a notifier that renders English only.
    #[must_use]
    pub fn new(
        channel: Arc<dyn NotificationChannel>,
        recipient: impl Into<String>,
        sender: impl Into<String>,
    ) -> Self {
        Self {
            channel,
            recipient: recipient.into(),
            sender: sender.into(),
            languages: vec![Language::En],
        }
    }

    /// Sets the languages rendered into each message, in order.
    #[must_use]
    pub fn with_languages(mut self, languages: Vec<Language>) -> Self {
        self.languages = languages;
        self
    }

    /// Returns the channel name.
    #[must_use]
    pub fn channel_name(&self) -> &str {
        self.channel.name()
    }

    /// Returns the configured languages.
    #[must_use]
    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    /// Formats and dispatches an alert for `severity`.
    ///
    /// `previous` is the severity last recorded, or `None` when there is no
    /// usable prior state.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::DispatchFailed` if the gateway rejects the message.
    pub async fn notify(
        &self,
        severity: Severity,
        readings: &CycleReadings,
        previous: Option<Severity>,
    ) -> Result<NotificationRecord> {
        let now = Utc::now();
        let message = OutboundMessage {
            body: compose(severity, readings, &self.languages, now),
            recipient: self.recipient.clone(),
            sender: self.sender.clone(),
        };

        let previous_label = previous.map_or("UNINITIALIZED", |s| s.as_str());
        match self.channel.send(&message).await {
            Ok(receipt) => {
                info!(
                    channel = %receipt.channel,
                    dispatch_id = %receipt.dispatch_id,
                    severity = %severity,
                    previous = previous_label,
                    "alert dispatched"
                );
                Ok(NotificationRecord {
                    severity,
                    body: message.body,
                    dispatch_id: receipt.dispatch_id,
                    sent_at: Utc::now(),
                })
            }
            Err(err) => {
                warn!(
                    channel = %self.channel.name(),
                    severity = %severity,
                    previous = previous_label,
                    error = %err,
                    "alert dispatch failed"
                );
                Err(match err {
                    AlertError::DispatchFailed { .. } => err,
                    other => AlertError::DispatchFailed {
                        channel: self.channel.name().to_string(),
                        reason: other.to_string(),
                    },
                })
            }
        }
    }
}
