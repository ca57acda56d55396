//! Monitor configuration.
//!
//! Configuration is read from a TOML file with every section optional:
//! - Polling cadence, fetch timeout and state record location
//! - Provider endpoints and the NASA API key
//! - Severity thresholds
//! - Messaging gateway and recipients
//! - The read-only dashboard
//!
//! Credentials may instead come from the environment (`NASA_API_KEY`,
//! `TWILIO_SID`, `TWILIO_AUTH`, `TWILIO_WHATSAPP_FROM`, `TWILIO_TO`), which
//! take precedence over the file.

use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use spacewatch_alerts::{Language, Thresholds, TwilioConfig};
use spacewatch_sources::ProviderSettings;
use tracing::{info, warn};

use crate::error::MonitorError;

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/spacewatch/config.toml";

/// Which messaging gateway delivers alerts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayKind {
    /// Twilio Messages API.
    #[default]
    Twilio,
    /// Write alerts to the log only.
    Log,
}

/// Messaging gateway configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Gateway implementation.
    pub kind: GatewayKind,
    /// Twilio account SID.
    pub account_sid: Option<String>,
    /// Twilio auth token.
    pub auth_token: Option<String>,
    /// Sender address, e.g. `whatsapp:+14155238886`.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Twilio API base URL.
    pub api_base: String,
    /// Dispatch timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            kind: GatewayKind::default(),
            account_sid: None,
            auth_token: None,
            from: String::new(),
            to: String::new(),
            api_base: TwilioConfig::DEFAULT_API_BASE.to_string(),
            timeout_secs: 15,
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("kind", &self.kind)
            .field("account_sid", &self.account_sid)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("from", &self.from)
            .field("to", &self.to)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Dashboard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// Whether `run` serves the dashboard.
    pub enabled: bool,
    /// Address to bind.
    pub bind_addr: SocketAddr,
    /// Age after which the record is flagged stale. Defaults to three poll
    /// intervals.
    pub stale_after_secs: Option<u64>,
    /// Page auto-refresh interval in seconds; 0 disables it.
    pub refresh_secs: u64,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            stale_after_secs: None,
            refresh_secs: 60,
        }
    }
}

/// Main monitor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Path of the JSON alert record.
    pub state_path: PathBuf,
    /// Seconds between cycles.
    pub poll_interval_secs: u64,
    /// Per-source fetch timeout in seconds.
    pub fetch_timeout_secs: u64,
    /// Alert languages, rendered in order.
    pub languages: Vec<String>,
    /// Provider endpoints.
    pub providers: ProviderSettings,
    /// Severity thresholds.
    pub thresholds: Thresholds,
    /// Messaging gateway.
    pub gateway: GatewayConfig,
    /// Read-only dashboard.
    pub dashboard: DashboardSettings,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("/var/lib/spacewatch/status.json"),
            poll_interval_secs: 300,
            fetch_timeout_secs: 15,
            languages: vec!["en".to_string(), "ml".to_string()],
            providers: ProviderSettings::default(),
            thresholds: Thresholds::default(),
            gateway: GatewayConfig::default(),
            dashboard: DashboardSettings::default(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from `path`, apply environment overrides and
    /// validate. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the result
    /// fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MonitorError> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`MonitorConfig::load`] but without validation, for commands
    /// that only inspect the state record.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, MonitorError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            info!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a TOML file without validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MonitorError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            MonitorError::Config(format!(
                "failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string without validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn from_toml(content: &str) -> Result<Self, MonitorError> {
        toml::from_str(content).map_err(|e| MonitorError::Config(format!("invalid TOML: {e}")))
    }

    /// Serialize to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, MonitorError> {
        toml::to_string_pretty(self)
            .map_err(|e| MonitorError::Config(format!("failed to serialize config: {e}")))
    }

    /// Overlay credentials from the environment.
    ///
    /// `lookup` resolves a variable name; empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("NASA_API_KEY") {
            self.providers.nasa_api_key = Some(key);
        }
        if let Some(sid) = get("TWILIO_SID") {
            self.gateway.account_sid = Some(sid);
        }
        if let Some(token) = get("TWILIO_AUTH") {
            self.gateway.auth_token = Some(token);
        }
        if let Some(from) = get("TWILIO_WHATSAPP_FROM") {
            self.gateway.from = from;
        }
        if let Some(to) = get("TWILIO_TO") {
            self.gateway.to = to;
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.poll_interval_secs == 0 {
            return Err(MonitorError::Config(
                "poll_interval_secs must be greater than 0".to_string(),
            ));
        }

        if self.fetch_timeout_secs == 0 {
            return Err(MonitorError::Config(
                "fetch_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.state_path.as_os_str().is_empty() {
            return Err(MonitorError::Config("state_path cannot be empty".to_string()));
        }

        if self.languages.is_empty() {
            return Err(MonitorError::Config(
                "languages must list at least one language".to_string(),
            ));
        }

        self.providers.validate()?;
        self.thresholds.validate()?;

        if self.gateway.kind == GatewayKind::Twilio {
            let missing = |v: &Option<String>| v.as_deref().is_none_or(str::is_empty);
            if missing(&self.gateway.account_sid) || missing(&self.gateway.auth_token) {
                return Err(MonitorError::Config(
                    "twilio gateway requires account_sid and auth_token \
                     (or TWILIO_SID and TWILIO_AUTH)"
                        .to_string(),
                ));
            }
            if self.gateway.from.is_empty() || self.gateway.to.is_empty() {
                return Err(MonitorError::Config(
                    "twilio gateway requires from and to addresses".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// The poll interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// The per-source fetch timeout.
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Age after which the dashboard flags the record stale.
    #[must_use]
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(
            self.dashboard
                .stale_after_secs
                .unwrap_or_else(|| self.poll_interval_secs.saturating_mul(3)),
        )
    }

    /// Resolved alert languages, deduplicated in order.
    ///
    /// Unknown codes fall back to English.
    #[must_use]
    pub fn alert_languages(&self) -> Vec<Language> {
        let mut resolved = Vec::with_capacity(self.languages.len());
        for code in &self.languages {
            let language = Language::from_code(code);
            if language.code() != code.trim().to_ascii_lowercase() {
                warn!(code = %code, "unknown language code, using English");
            }
            if !resolved.contains(&language) {
                resolved.push(language);
            }
        }
        resolved
    }
}
