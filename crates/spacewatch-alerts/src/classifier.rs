//! Severity classification.
//!
//! [`classify`] combines the three indicator samples into one [`Severity`].
//! It is pure and total: any mix of observed and unavailable samples yields a
//! severity, and an unavailable sample always contributes [`Severity::Normal`].
//!
//! Thresholds are policy and are supplied by the caller, usually from the
//! `[thresholds]` table of the daemon configuration.

use serde::{Deserialize, Serialize};

use crate::error::{AlertError, Result};
use crate::types::{CycleReadings, FlareClass, Sample, Severity};

/// Geomagnetic index bounds. Both bounds are inclusive (`value >= bound`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeomagneticThresholds {
    /// Index at or above which the indicator is elevated.
    pub elevated: f64,
    /// Index at or above which the indicator is critical.
    pub critical: f64,
}

impl Default for GeomagneticThresholds {
    fn default() -> Self {
        Self {
            elevated: 3.0,
            critical: 6.0,
        }
    }
}

impl GeomagneticThresholds {
    /// Severity contributed by one geomagnetic sample.
    #[must_use]
    pub fn severity(&self, sample: &Sample) -> Severity {
        match sample.numeric() {
            Some(kp) if kp >= self.critical => Severity::Critical,
            Some(kp) if kp >= self.elevated => Severity::Elevated,
            _ => Severity::Normal,
        }
    }
}

/// Flare class bounds. Both bounds are inclusive (`class >= bound`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlareThresholds {
    /// Class at or above which the indicator is elevated.
    pub elevated: FlareClass,
    /// Class at or above which the indicator is critical.
    pub critical: FlareClass,
}

impl Default for FlareThresholds {
    fn default() -> Self {
        Self {
            elevated: FlareClass::M,
            critical: FlareClass::X,
        }
    }
}

impl FlareThresholds {
    /// Severity contributed by one flare sample.
    #[must_use]
    pub fn severity(&self, sample: &Sample) -> Severity {
        match sample.flare_class() {
            Some(class) if class >= self.critical => Severity::Critical,
            Some(class) if class >= self.elevated => Severity::Elevated,
            _ => Severity::Normal,
        }
    }
}

/// Ejection speed bounds in km/s. Both bounds are exclusive (`speed > bound`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EjectionThresholds {
    /// Speed above which the indicator is elevated.
    pub elevated: f64,
    /// Speed above which the indicator is critical.
    pub critical: f64,
}

impl Default for EjectionThresholds {
    fn default() -> Self {
        Self {
            elevated: 600.0,
            critical: 1000.0,
        }
    }
}

impl EjectionThresholds {
    /// Severity contributed by one ejection sample.
    #[must_use]
    pub fn severity(&self, sample: &Sample) -> Severity {
        match sample.numeric() {
            Some(speed) if speed > self.critical => Severity::Critical,
            Some(speed) if speed > self.elevated => Severity::Elevated,
            _ => Severity::Normal,
        }
    }
}

/// The full per-indicator threshold table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Geomagnetic index bounds.
    pub geomagnetic: GeomagneticThresholds,
    /// Flare class bounds.
    pub flare: FlareThresholds,
    /// Ejection speed bounds.
    pub ejection: EjectionThresholds,
}

impl Thresholds {
    /// Checks that every elevated bound lies at or below its critical bound.
    ///
    /// # Errors
    ///
    /// Returns `AlertError::InvalidThresholds` describing the first bad table.
    pub fn validate(&self) -> Result<()> {
        let geo = &self.geomagnetic;
        if !geo.elevated.is_finite() || !geo.critical.is_finite() {
            return Err(AlertError::InvalidThresholds {
                reason: "geomagnetic bounds must be finite".to_string(),
            });
        }
        if geo.elevated > geo.critical {
            return Err(AlertError::InvalidThresholds {
                reason: format!(
                    "geomagnetic elevated bound {} exceeds critical bound {}",
                    geo.elevated, geo.critical
                ),
            });
        }

        if self.flare.elevated > self.flare.critical {
            return Err(AlertError::InvalidThresholds {
                reason: format!(
                    "flare elevated class {} exceeds critical class {}",
                    self.flare.elevated, self.flare.critical
                ),
            });
        }

        let cme = &self.ejection;
        if !cme.elevated.is_finite() || !cme.critical.is_finite() {
            return Err(AlertError::InvalidThresholds {
                reason: "ejection bounds must be finite".to_string(),
            });
        }
        if cme.elevated > cme.critical {
            return Err(AlertError::InvalidThresholds {
                reason: format!(
                    "ejection elevated speed {} exceeds critical speed {}",
                    cme.elevated, cme.critical
                ),
            });
        }

        Ok(())
    }
}

/// Combines per-indicator severities; an empty input is `Normal`.
#[must_use]
pub fn combine(severities: impl IntoIterator<Item = Severity>) -> Severity {
    severities.into_iter().max().unwrap_or_default()
}

/// Classifies the three indicator samples into one combined severity.
#[must_use]
pub fn classify(
    thresholds: &Thresholds,
    geomagnetic: &Sample,
    flare: &Sample,
    ejection: &Sample,
) -> Severity {
    combine([
        thresholds.geomagnetic.severity(geomagnetic),
        thresholds.flare.severity(flare),
        thresholds.ejection.severity(ejection),
    ])
}

/// Classifies a full cycle's readings.
#[must_use]
pub fn classify_cycle(thresholds: &Thresholds, readings: &CycleReadings) -> Severity {
    classify(
        thresholds,
        &readings.geomagnetic,
        &readings.flare,
        &readings.ejection,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IndicatorKind, Reading};
    use test_case::test_case;

    fn geo(kp: f64) -> Sample {
        Sample::Observed(Reading::numeric(IndicatorKind::Geomagnetic, kp))
    }

    fn flare(code: &str) -> Sample {
        Sample::from(FlareClass::from_code(code).map(Reading::flare))
    }

    fn cme(speed: f64) -> Sample {
        Sample::Observed(Reading::numeric(IndicatorKind::Ejection, speed))
    }

    #[test_case(0.0, Severity::Normal ; "quiet")]
    #[test_case(2.99, Severity::Normal ; "just below elevated")]
    #[test_case(3.0, Severity::Elevated ; "elevated bound inclusive")]
    #[test_case(5.99, Severity::Elevated ; "just below critical")]
    #[test_case(6.0, Severity::Critical ; "critical bound inclusive")]
    #[test_case(9.0, Severity::Critical ; "extreme")]
    #[test_case(f64::NAN, Severity::Normal ; "nan")]
    fn geomagnetic_levels(kp: f64, expected: Severity) {
        let t = GeomagneticThresholds::default();
        assert_eq!(t.severity(&geo(kp)), expected);
    }

    #[test_case("A1.0", Severity::Normal ; "a class")]
    #[test_case("C9.9", Severity::Normal ; "c class")]
    #[test_case("M1.0", Severity::Elevated ; "m class")]
    #[test_case("X2.3", Severity::Critical ; "x class")]
    fn flare_levels(code: &str, expected: Severity) {
        let t = FlareThresholds::default();
        assert_eq!(t.severity(&flare(code)), expected);
    }

    #[test_case(450.0, Severity::Normal ; "slow")]
    #[test_case(600.0, Severity::Normal ; "elevated bound exclusive")]
    #[test_case(600.5, Severity::Elevated ; "above elevated")]
    #[test_case(1000.0, Severity::Elevated ; "critical bound exclusive")]
    #[test_case(1100.0, Severity::Critical ; "fast")]
    fn ejection_levels(speed: f64, expected: Severity) {
        let t = EjectionThresholds::default();
        assert_eq!(t.severity(&cme(speed)), expected);
    }

    #[test]
    fn all_unavailable_is_normal() {
        let severity = classify(
            &Thresholds::default(),
            &Sample::Unavailable,
            &Sample::Unavailable,
            &Sample::Unavailable,
        );
        assert_eq!(severity, Severity::Normal);
    }

    #[test]
    fn mismatched_reading_kind_contributes_normal() {
        let t = Thresholds::default();
        let wrong = Sample::Observed(Reading::flare(FlareClass::X));
        assert_eq!(t.geomagnetic.severity(&wrong), Severity::Normal);
        assert_eq!(t.flare.severity(&cme(2000.0)), Severity::Normal);
    }

    #[test]
    fn storm_scenario_is_critical() {
        let severity = classify(&Thresholds::default(), &geo(6.5), &flare("X1.0"), &cme(1100.0));
        assert_eq!(severity, Severity::Critical);
    }

    #[test]
    fn moderate_scenario_is_elevated() {
        let severity = classify(
            &Thresholds::default(),
            &geo(4.0),
            &flare("M5.0"),
            &Sample::Unavailable,
        );
        assert_eq!(severity, Severity::Elevated);
    }

    #[test]
    fn quiet_scenario_is_normal() {
        let readings = CycleReadings::new(geo(2.0), Sample::Unavailable, Sample::Unavailable);
        assert_eq!(
            classify_cycle(&Thresholds::default(), &readings),
            Severity::Normal
        );
    }

    #[test]
    fn custom_thresholds_apply() {
        let t = Thresholds {
            geomagnetic: GeomagneticThresholds {
                elevated: 5.0,
                critical: 7.0,
            },
            ..Thresholds::default()
        };
        assert_eq!(t.geomagnetic.severity(&geo(4.0)), Severity::Normal);
        assert_eq!(t.geomagnetic.severity(&geo(6.5)), Severity::Elevated);
    }

    #[test]
    fn default_thresholds_are_valid() {
        assert!(Thresholds::default().validate().is_ok());
    }

    #[test]
    fn inverted_geomagnetic_thresholds_rejected() {
        let t = Thresholds {
            geomagnetic: GeomagneticThresholds {
                elevated: 7.0,
                critical: 6.0,
            },
            ..Thresholds::default()
        };
        assert!(matches!(
            t.validate(),
            Err(AlertError::InvalidThresholds { .. })
        ));
    }

    #[test]
    fn inverted_flare_thresholds_rejected() {
        let t = Thresholds {
            flare: FlareThresholds {
                elevated: FlareClass::X,
                critical: FlareClass::M,
            },
            ..Thresholds::default()
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn non_finite_ejection_thresholds_rejected() {
        let t = Thresholds {
            ejection: EjectionThresholds {
                elevated: f64::NAN,
                critical: 1000.0,
            },
            ..Thresholds::default()
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn thresholds_deserialize_partial_table() {
        let t: Thresholds =
            serde_json::from_str(r#"{"flare":{"elevated":"C"},"ejection":{"critical":1500.0}}"#)
                .unwrap();
        assert_eq!(t.flare.elevated, FlareClass::C);
        assert_eq!(t.flare.critical, FlareClass::X);
        assert!((t.ejection.critical - 1500.0).abs() < f64::EPSILON);
        assert!((t.geomagnetic.critical - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn combine_empty_is_normal() {
        assert_eq!(combine(std::iter::empty()), Severity::Normal);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn kp_sample() -> impl Strategy<Value = Sample> {
            prop::option::of(0.0f64..9.0).prop_map(|v| {
                Sample::from(v.map(|kp| Reading::numeric(IndicatorKind::Geomagnetic, kp)))
            })
        }

        fn flare_sample() -> impl Strategy<Value = Sample> {
            prop::option::of(prop::sample::select(vec![
                FlareClass::A,
                FlareClass::B,
                FlareClass::C,
                FlareClass::M,
                FlareClass::X,
            ]))
            .prop_map(|c| Sample::from(c.map(Reading::flare)))
        }

        fn cme_sample() -> impl Strategy<Value = Sample> {
            prop::option::of(0.0f64..3000.0).prop_map(|v| {
                Sample::from(v.map(|speed| Reading::numeric(IndicatorKind::Ejection, speed)))
            })
        }

        proptest! {
            #[test]
            fn combined_is_max_of_indicators(
                g in kp_sample(),
                f in flare_sample(),
                e in cme_sample(),
            ) {
                let t = Thresholds::default();
                let expected = t.geomagnetic.severity(&g)
                    .max(t.flare.severity(&f))
                    .max(t.ejection.severity(&e));
                prop_assert_eq!(classify(&t, &g, &f, &e), expected);
            }

            #[test]
            fn raising_geomagnetic_never_lowers(
                a in 0.0f64..9.0,
                b in 0.0f64..9.0,
                f in flare_sample(),
                e in cme_sample(),
            ) {
                let t = Thresholds::default();
                let (low, high) = if a <= b { (a, b) } else { (b, a) };
                prop_assert!(classify(&t, &geo(low), &f, &e) <= classify(&t, &geo(high), &f, &e));
            }

            #[test]
            fn raising_ejection_never_lowers(
                a in 0.0f64..3000.0,
                b in 0.0f64..3000.0,
                g in kp_sample(),
                f in flare_sample(),
            ) {
                let t = Thresholds::default();
                let (low, high) = if a <= b { (a, b) } else { (b, a) };
                prop_assert!(classify(&t, &g, &f, &cme(low)) <= classify(&t, &g, &f, &cme(high)));
            }

            #[test]
            fn observing_never_lowers_below_unavailable(
                g in kp_sample(),
                f in flare_sample(),
                e in cme_sample(),
            ) {
                let t = Thresholds::default();
                let without_geo = classify(&t, &Sample::Unavailable, &f, &e);
                prop_assert!(classify(&t, &g, &f, &e) >= without_geo);
            }
        }
    }
}
