//! Field names of the `/warning` JSON payloads and the lenient coercions the
//! wire format has always allowed.

use chrono::{DateTime, NaiveDateTime};
use serde_json::{Map, Value};

pub const NICKNAME: &str = "nickname";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const DANGERTYPE: &str = "dangertype";
pub const SENT: &str = "sent";
pub const AREACODE: &str = "areacode";
pub const PHONENUMBER: &str = "phonenumber";
pub const WEATHER: &str = "weather";

pub const QUERY: &str = "query";
pub const QUERY_TYPE: &str = "queryType";
pub const TIME_START: &str = "timestart";
pub const TIME_END: &str = "timeend";

/// True when `field` exists and is not JSON `null`.
pub fn is_present(payload: &Map<String, Value>, field: &str) -> bool {
    payload.get(field).is_some_and(|v| !v.is_null())
}

/// Reads a double from either a JSON number or a numeric string.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    // NaN and infinities cannot be stored or rendered back as JSON numbers
    parsed.filter(|v| v.is_finite())
}

/// Reads a free-form text field; numbers are accepted and rendered as-is.
pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parses an ISO-8601 offset datetime into UTC epoch milliseconds.
pub fn parse_offset_datetime(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    // date and time must be joined by `T`; RFC 3339 parsing alone also takes a space
    if !matches!(raw.as_bytes().get(10), Some(b'T' | b't')) {
        return None;
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.timestamp_millis());
    }
    // ISO-8601 also allows dropping the seconds
    if let Ok(t) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z") {
        return Some(t.timestamp_millis());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ")
        .ok()
        .map(|t| t.and_utc().timestamp_millis())
}
