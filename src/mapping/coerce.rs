//! Value coercions used by the row mapper.
//!
//! Every function returns `None` when the raw value cannot be turned into the target type; the
//! mapper then substitutes the field's fallback. Callers only pass non-empty values
//! (see [`Value::is_empty`]).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::types::Value;

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];
const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];

/// Floating point number. NaN and infinities are rejected.
pub fn to_number(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Int64(i) => *i as f64,
        Value::Float64(f) => *f,
        Value::Utf8(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Integer. Fractional numbers are truncated toward zero.
pub fn to_integer(v: &Value) -> Option<i64> {
    match v {
        Value::Int64(i) => Some(*i),
        Value::Utf8(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| truncate(s.parse::<f64>().ok()?))
        }
        Value::Float64(f) => truncate(*f),
        _ => None,
    }
}

fn truncate(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    (f.is_finite() && f.abs() < i64::MAX as f64).then(|| f.trunc() as i64)
}

/// Text. Scalars are rendered; lists are joined with `", "`.
pub fn to_text(v: &Value) -> Option<String> {
    match v {
        Value::Utf8(s) => Some(s.trim().to_string()),
        Value::Int64(i) => Some(i.to_string()),
        Value::Float64(f) => Some(f.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::List(items) => {
            let parts: Vec<String> = items.iter().filter_map(to_text).filter(|s| !s.is_empty()).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Value::Null | Value::Object(_) => None,
    }
}

/// Truthiness: anything provided is true unless it reads as false.
pub fn to_flag(v: &Value) -> Option<bool> {
    match v {
        Value::Null => None,
        Value::Bool(b) => Some(*b),
        Value::Int64(i) => Some(*i != 0),
        Value::Float64(f) => Some(*f != 0.0),
        Value::Utf8(s) => Some(!matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "false" | "0" | "no" | "n" | "f" | "off"
        )),
        Value::List(_) | Value::Object(_) => Some(true),
    }
}

/// Tag list. Strings are split on commas; lists pass through element-wise.
pub fn to_tags(v: &Value) -> Option<Vec<String>> {
    let tags: Vec<String> = match v {
        Value::Utf8(s) => s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        Value::List(items) => items.iter().filter_map(to_text).filter(|t| !t.is_empty()).collect(),
        _ => return None,
    };
    (!tags.is_empty()).then_some(tags)
}

/// Timestamp. Strings try RFC 3339 and a few common layouts (naive values are UTC); numbers are
/// milliseconds since the Unix epoch.
pub fn to_timestamp(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::Utf8(s) => parse_timestamp(s.trim()),
        Value::Int64(ms) => DateTime::from_timestamp_millis(*ms),
        Value::Float64(ms) if ms.is_finite() => DateTime::from_timestamp_millis(ms.trunc() as i64),
        _ => None,
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(naive.and_utc());
    }
    NAIVE_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
