//! Alert message composition.
//!
//! A message is rendered once per configured [`Language`] and the renderings
//! are joined with [`DIVIDER`]. Each rendering has the same structure:
//!
//! 1. A title keyed by severity.
//! 2. The observation time and geomagnetic index, followed by the flare class
//!    (M or X only) and ejection speed when present.
//! 3. Advisories chosen by severity.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CycleReadings, Severity};

/// Separator placed between renderings in different languages.
pub const DIVIDER: &str = "\n\n---\n";

/// A language with a phrase book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    #[default]
    En,
    /// Malayalam.
    Ml,
}

impl Language {
    /// Resolves a language code, falling back to English for unknown codes.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "ml" => Self::Ml,
            _ => Self::En,
        }
    }

    /// Returns the language code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ml => "ml",
        }
    }

    /// Returns the phrase book for this language.
    #[must_use]
    pub fn phrases(&self) -> &'static Phrasebook {
        match self {
            Self::En => &ENGLISH,
            Self::Ml => &MALAYALAM,
        }
    }
}

/// Fixed phrases used to render an alert in one language.
#[derive(Debug)]
pub struct Phrasebook {
    /// Title for critical conditions.
    pub title_critical: &'static str,
    /// Title for elevated conditions.
    pub title_elevated: &'static str,
    /// Title for normal conditions.
    pub title_normal: &'static str,
    /// Navigation and precision work advisory.
    pub navigation_advice: &'static str,
    /// Power and communication disruption advisory.
    pub power_advice: &'static str,
    /// Radio blackout risk note.
    pub flare_risk: &'static str,
    /// Label preceding the observation time.
    pub observed_at: &'static str,
    /// Line used when nothing needs doing.
    pub no_action: &'static str,
}

impl Phrasebook {
    /// Returns the title line for a severity.
    #[must_use]
    pub const fn title(&self, severity: Severity) -> &'static str {
        match severity {
            Severity::Critical => self.title_critical,
            Severity::Elevated => self.title_elevated,
            Severity::Normal => self.title_normal,
        }
    }
}

static ENGLISH: Phrasebook = Phrasebook {
    title_critical: "⚠ High Space Risk — Action Needed!",
    title_elevated: "⚠ Moderate Space Risk — Caution",
    title_normal: "✅ Space weather normal",
    navigation_advice: "GPS & navigation may be inaccurate. \
                        Avoid precision machine work (seeding, mapping).",
    power_advice: "Power or communication disruptions possible — \
                   keep pumps/devices charged or on standby.",
    flare_risk: "Solar Flare/CME Risk: Radio Blackouts & communication loss possible.",
    observed_at: "Observed at",
    no_action: "No immediate action needed.",
};

static MALAYALAM: Phrasebook = Phrasebook {
    title_critical: "⚠ സൂര്യ പ്രവൃത്തിയൂൻ ഉയർന്നിരിക്കുന്നു — ശ്രദ്ധ വേണം",
    title_elevated: "⚠ മിതമായ സൂര്യ പ്രവൃത്തി — ജാഗ്രത",
    title_normal: "✅ സാധാരണ സ്ഫേസ് വേതർ",
    navigation_advice: "GPS ശതം കൃത്യമായിരിക്കില്ല. യന്ത്രവലംബ ജോലി മാറ്റിയിടുക.",
    power_advice: "വൈദ്യുതി/കമ്യൂണിക്കേഷൻ പ്രശ്നം സാധ്യത — പമ്പുകൾ ചാർജ് ചെയ്യുക.",
    flare_risk: "സോളാർ ഫ്ലെയർ/CME റിസ്ക്: റേഡിയോ തടസ്സങ്ങൾ സാധ്യത.",
    observed_at: "കണ്ടെടുത്തത്",
    no_action: "ഉടൻ നടപടി ആവശ്യമില്ല.",
};

/// Renders the alert for one language.
///
/// `now` stands in for the observation time when the geomagnetic reading
/// carries no time tag (or is unavailable).
#[must_use]
pub fn render(
    severity: Severity,
    readings: &CycleReadings,
    language: Language,
    now: DateTime<Utc>,
) -> String {
    let phrases = language.phrases();

    let observed_at = readings
        .geomagnetic
        .observed_at()
        .map_or_else(|| now.to_rfc3339_opts(SecondsFormat::Secs, true), str::to_string);
    let kp = readings
        .geo_value()
        .map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"));

    let material_flare = readings.flare_class().filter(|c| c.is_material());
    let ejection_speed = readings.ejection_speed();

    let mut summary = format!("{}: {observed_at} (Kp={kp})", phrases.observed_at);
    if let Some(class) = material_flare {
        summary.push_str(&format!(" | Flare Class: {class}"));
    }
    if let Some(speed) = ejection_speed {
        summary.push_str(&format!(" | CME Speed: {speed} km/s"));
    }

    let mut lines = vec![phrases.title(severity).to_string(), summary];
    match severity {
        Severity::Critical => {
            lines.push(phrases.navigation_advice.to_string());
            lines.push(phrases.power_advice.to_string());
            lines.push(phrases.flare_risk.to_string());
        }
        Severity::Elevated => {
            lines.push(phrases.navigation_advice.to_string());
            if material_flare.is_some() || ejection_speed.is_some() {
                lines.push(phrases.flare_risk.to_string());
            }
        }
        Severity::Normal => lines.push(phrases.no_action.to_string()),
    }

    lines.join("\n")
}

/// Renders the alert in every language and joins the renderings.
///
/// An empty language list renders English only.
#[must_use]
pub fn compose(
    severity: Severity,
    readings: &CycleReadings,
    languages: &[Language],
    now: DateTime<Utc>,
) -> String {
    if languages.is_empty() {
        return render(severity, readings, Language::En, now);
    }

    languages
        .iter()
        .map(|language| render(severity, readings, *language, now))
        .collect::<Vec<_>>()
        .join(DIVIDER)
}
