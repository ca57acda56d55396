//! Severity model, classification and alert delivery for spacewatch.
//!
//! `spacewatch-alerts` turns the three space weather indicator samples
//! (geomagnetic index, flare class, coronal mass ejection speed) into one
//! combined [`Severity`] and delivers human-readable alerts through a
//! messaging gateway.
//!
//! # Features
//!
//! - **Classification**: A pure, total classifier with configurable thresholds
//! - **Explicit absence**: [`Sample::Unavailable`] is distinct from a low reading
//! - **Localized messages**: English and Malayalam renderings in one message
//! - **Gateways**: Twilio Messages API, or a log-only channel for dry runs
//!
//! # Example
//!
//! ```rust
//! use spacewatch_alerts::{
//!     classify, CycleReadings, FlareClass, IndicatorKind, Reading, Sample, Severity,
//!     Thresholds,
//! };
//!
//! let readings = CycleReadings::new(
//!     Sample::Observed(Reading::numeric(IndicatorKind::Geomagnetic, 4.0)),
//!     Sample::Observed(Reading::flare(FlareClass::M)),
//!     Sample::Unavailable,
//! );
//!
//! let severity = classify(
//!     &Thresholds::default(),
//!     &readings.geomagnetic,
//!     &readings.flare,
//!     &readings.ejection,
//! );
//! assert_eq!(severity, Severity::Elevated);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod channels;
pub mod classifier;
pub mod error;
pub mod message;
pub mod notifier;
pub mod types;

// Re-export main types at crate root
pub use channels::{
    DispatchReceipt, LogChannel, NotificationChannel, OutboundMessage, TwilioChannel, TwilioConfig,
};
pub use classifier::{
    classify, classify_cycle, combine, EjectionThresholds, FlareThresholds,
    GeomagneticThresholds, Thresholds,
};
pub use error::{AlertError, Result};
pub use message::{compose, render, Language, Phrasebook, DIVIDER};
pub use notifier::Notifier;
pub use types::{
    CycleReadings, FlareClass, IndicatorKind, NotificationRecord, Reading, ReadingValue, Sample,
    Severity,
};
