//! Candidate-key tables and value coercion for provider payloads.
//!
//! Providers have renamed fields over the years, so each logical field is
//! looked up through an ordered list of keys. The first non-null match wins.

use serde_json::{Map, Value};

use crate::error::{SourceError, SourceResult};

/// Candidate keys for one indicator's fields.
#[derive(Debug, Clone, Copy)]
pub struct FieldTable {
    /// Keys holding the indicator value.
    pub value: &'static [&'static str],
    /// Keys holding the observation time.
    pub observed_at: &'static [&'static str],
    /// Keys holding the "most accurate analysis" flag. Empty when unused.
    pub accuracy: &'static [&'static str],
}

/// NOAA planetary K-index entries.
pub const GEOMAGNETIC_FIELDS: FieldTable = FieldTable {
    value: &["kp_index", "kp", "Kp"],
    observed_at: &["time_tag", "date_time", "timestamp", "date"],
    accuracy: &[],
};

/// NASA DONKI FLR entries.
pub const FLARE_FIELDS: FieldTable = FieldTable {
    value: &["classType", "class_type"],
    observed_at: &["beginTime", "peakTime"],
    accuracy: &[],
};

/// NASA DONKI CMEAnalysis entries.
pub const EJECTION_FIELDS: FieldTable = FieldTable {
    value: &["speed"],
    observed_at: &["time21_5", "time215"],
    accuracy: &["isMostAccurate", "is_most_accurate"],
};

/// Returns the first non-null value among `keys`.
#[must_use]
pub fn first_present<'a>(entry: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| entry.get(*key))
        .find(|value| !value.is_null())
}

/// Coerces a JSON number or numeric string to `f64`.
#[must_use]
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Coerces a JSON string or number to text.
#[must_use]
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerces a JSON bool or `"true"`/`"false"` string.
#[must_use]
pub fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Interprets a payload as an array of entries.
///
/// # Errors
///
/// Returns `SourceError::Malformed` if the payload is not a JSON array.
pub fn entries(payload: &Value) -> SourceResult<&[Value]> {
    payload
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| SourceError::Malformed {
            reason: format!("expected a JSON array, got {}", kind_of(payload)),
        })
}

/// Interprets one entry as a JSON object.
///
/// # Errors
///
/// Returns `SourceError::Malformed` if the entry is not an object.
pub fn object(entry: &Value) -> SourceResult<&Map<String, Value>> {
    entry.as_object().ok_or_else(|| SourceError::Malformed {
        reason: format!("expected an object entry, got {}", kind_of(entry)),
    })
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
