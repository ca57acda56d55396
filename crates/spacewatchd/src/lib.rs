//! spacewatchd - space weather monitor daemon
//!
//! Polls the NOAA planetary K index and NASA DONKI flare and coronal mass
//! ejection feeds on a fixed interval, classifies the combined severity and
//! sends an alert through the configured messaging gateway whenever the
//! severity differs from the last persisted record.
//!
//! ```text
//! Scheduler ──tick──> Monitor::run_cycle
//!                        │ sample_all (concurrent, per-source timeout)
//!                        │ classify_cycle
//!                        │ load prior record ── should_notify? ──> Notifier
//!                        └ save record (always)
//! ```
//!
//! The dashboard reads the same record and never writes it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod app;
pub mod config;
pub mod error;
pub mod monitor;
pub mod scheduler;

pub use config::{
    DashboardSettings, GatewayConfig, GatewayKind, MonitorConfig, DEFAULT_CONFIG_PATH,
};
pub use error::{MonitorError, Result};
pub use monitor::{should_notify, CycleOutcome, CyclePhase, CycleReport, Monitor};
pub use scheduler::Scheduler;
