//! Space weather indicator sources.
//!
//! Each source polls one public provider over HTTP and yields a
//! [`spacewatch_alerts::Sample`]:
//!
//! - [`GeomagneticSource`]: NOAA SWPC planetary K index
//! - [`FlareSource`]: NASA DONKI solar flares
//! - [`EjectionSource`]: NASA DONKI coronal mass ejection analyses
//!
//! Failures are contained: [`sample`] and [`IndicatorSources::sample_all`]
//! log provider errors and timeouts and report the indicator as unavailable.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ejection;
pub mod error;
pub mod fields;
pub mod flare;
pub mod geomagnetic;
pub mod settings;
pub mod source;

pub use ejection::{parse_ejection, EjectionSource};
pub use error::{SourceError, SourceResult};
pub use fields::FieldTable;
pub use flare::{parse_flare, FlareSource};
pub use geomagnetic::{parse_geomagnetic, GeomagneticSource};
pub use settings::ProviderSettings;
pub use source::{sample, IndicatorSource, IndicatorSources, ProviderClient};
