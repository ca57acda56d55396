//! Core types for the sampling pipeline.
//!
//! This module provides the fundamental types used throughout spacewatch:
//! - [`Severity`]: The combined ordinal hazard level
//! - [`IndicatorKind`]: Which external indicator a reading came from
//! - [`FlareClass`]: The letter class of a solar flare
//! - [`Reading`] and [`Sample`]: One metric sample, or its explicit absence
//! - [`CycleReadings`]: The three samples gathered in one cycle
//! - [`NotificationRecord`]: A dispatched alert

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The combined severity of the space weather indicators.
///
/// Variants are declared in ascending order, so the derived `Ord` gives
/// `Normal < Elevated < Critical`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Quiet conditions, no action needed.
    #[default]
    Normal,
    /// Moderate activity, navigation-sensitive work should take care.
    Elevated,
    /// Severe activity, disruptions are likely.
    Critical,
}

impl Severity {
    /// All severities in ascending order.
    pub const ALL: [Self; 3] = [Self::Normal, Self::Elevated, Self::Critical];

    /// Returns the severity as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Elevated => "ELEVATED",
            Self::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The external indicator a reading was sampled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    /// Planetary geomagnetic K index.
    Geomagnetic,
    /// Solar flare classification.
    Flare,
    /// Coronal mass ejection speed.
    Ejection,
}

impl IndicatorKind {
    /// All indicators in sampling order.
    pub const ALL: [Self; 3] = [Self::Geomagnetic, Self::Flare, Self::Ejection];

    /// Returns the indicator as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Geomagnetic => "geomagnetic",
            Self::Flare => "flare",
            Self::Ejection => "ejection",
        }
    }
}

impl std::fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// X-ray class of a solar flare, ordered `A < B < C < M < X`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FlareClass {
    /// Background level.
    A,
    /// Minor.
    B,
    /// Common, little effect.
    C,
    /// Medium, brief radio blackouts.
    M,
    /// Major, wide-area blackouts.
    X,
}

impl FlareClass {
    /// Parses a provider class code such as `"X1.0"` or `"M5.2"`.
    ///
    /// Only the first character is significant.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().chars().next()?.to_ascii_uppercase() {
            'A' => Some(Self::A),
            'B' => Some(Self::B),
            'C' => Some(Self::C),
            'M' => Some(Self::M),
            'X' => Some(Self::X),
            _ => None,
        }
    }

    /// Returns the class letter.
    #[must_use]
    pub const fn as_char(&self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::M => 'M',
            Self::X => 'X',
        }
    }

    /// Returns true for the classes that carry radio blackout risk (M and X).
    #[must_use]
    pub const fn is_material(&self) -> bool {
        matches!(self, Self::M | Self::X)
    }
}

impl std::fmt::Display for FlareClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// The value carried by a reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReadingValue {
    /// A numeric magnitude (Kp index, km/s).
    Numeric(f64),
    /// A flare class.
    Class(FlareClass),
}

/// One metric sample taken from a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// The indicator this reading belongs to.
    pub source: IndicatorKind,
    /// The sampled value.
    pub value: ReadingValue,
    /// The provider's time tag for the observation, verbatim.
    pub observed_at: Option<String>,
}

impl Reading {
    /// Creates a numeric reading.
    #[must_use]
    pub const fn numeric(source: IndicatorKind, value: f64) -> Self {
        Self {
            source,
            value: ReadingValue::Numeric(value),
            observed_at: None,
        }
    }

    /// Creates a flare reading.
    #[must_use]
    pub const fn flare(class: FlareClass) -> Self {
        Self {
            source: IndicatorKind::Flare,
            value: ReadingValue::Class(class),
            observed_at: None,
        }
    }

    /// Sets the observation time tag.
    #[must_use]
    pub fn with_observed_at(mut self, observed_at: impl Into<String>) -> Self {
        self.observed_at = Some(observed_at.into());
        self
    }

    /// Returns the numeric value, if this is a numeric reading.
    #[must_use]
    pub const fn as_numeric(&self) -> Option<f64> {
        match self.value {
            ReadingValue::Numeric(v) => Some(v),
            ReadingValue::Class(_) => None,
        }
    }

    /// Returns the flare class, if this is a flare reading.
    #[must_use]
    pub const fn as_flare_class(&self) -> Option<FlareClass> {
        match self.value {
            ReadingValue::Class(c) => Some(c),
            ReadingValue::Numeric(_) => None,
        }
    }
}

/// The outcome of sampling one indicator.
///
/// `Unavailable` means "don't know", which is distinct from an observed low
/// value even though the default classification folds both to `Normal`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Sample {
    /// The provider returned a usable reading.
    Observed(Reading),
    /// The provider failed, timed out, returned nothing, or nothing material.
    #[default]
    Unavailable,
}

impl Sample {
    /// Returns true if a reading was obtained.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Observed(_))
    }

    /// Returns the reading, if any.
    #[must_use]
    pub const fn reading(&self) -> Option<&Reading> {
        match self {
            Self::Observed(r) => Some(r),
            Self::Unavailable => None,
        }
    }

    /// Returns the numeric value, if a numeric reading was obtained.
    #[must_use]
    pub fn numeric(&self) -> Option<f64> {
        self.reading().and_then(Reading::as_numeric)
    }

    /// Returns the flare class, if a flare reading was obtained.
    #[must_use]
    pub fn flare_class(&self) -> Option<FlareClass> {
        self.reading().and_then(Reading::as_flare_class)
    }

    /// Returns the observation time tag, if known.
    #[must_use]
    pub fn observed_at(&self) -> Option<&str> {
        self.reading().and_then(|r| r.observed_at.as_deref())
    }
}

impl From<Option<Reading>> for Sample {
    fn from(reading: Option<Reading>) -> Self {
        reading.map_or(Self::Unavailable, Self::Observed)
    }
}

/// The three samples gathered during one cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReadings {
    /// Geomagnetic index sample.
    pub geomagnetic: Sample,
    /// Flare class sample.
    pub flare: Sample,
    /// Ejection speed sample.
    pub ejection: Sample,
}

impl CycleReadings {
    /// Creates a reading set from the three samples.
    #[must_use]
    pub const fn new(geomagnetic: Sample, flare: Sample, ejection: Sample) -> Self {
        Self {
            geomagnetic,
            flare,
            ejection,
        }
    }

    /// Returns the sample for an indicator.
    #[must_use]
    pub const fn get(&self, kind: IndicatorKind) -> &Sample {
        match kind {
            IndicatorKind::Geomagnetic => &self.geomagnetic,
            IndicatorKind::Flare => &self.flare,
            IndicatorKind::Ejection => &self.ejection,
        }
    }

    /// Returns the indicators that produced no reading this cycle.
    #[must_use]
    pub fn unavailable(&self) -> Vec<IndicatorKind> {
        IndicatorKind::ALL
            .into_iter()
            .filter(|kind| !self.get(*kind).is_available())
            .collect()
    }

    /// Geomagnetic index, if observed.
    #[must_use]
    pub fn geo_value(&self) -> Option<f64> {
        self.geomagnetic.numeric()
    }

    /// Flare class, if observed.
    #[must_use]
    pub fn flare_class(&self) -> Option<FlareClass> {
        self.flare.flare_class()
    }

    /// Ejection speed in km/s, if a material ejection was observed.
    #[must_use]
    pub fn ejection_speed(&self) -> Option<f64> {
        self.ejection.numeric()
    }
}

/// A notification that was accepted by the messaging gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    /// The severity the notification announced.
    pub severity: Severity,
    /// The full message body that was sent.
    pub body: String,
    /// The gateway's identifier for the dispatched message.
    pub dispatch_id: String,
    /// When the gateway accepted the message.
    pub sent_at: DateTime<Utc>,
}
