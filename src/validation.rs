//! Stateless checks run against a raw warning body before anything touches the
//! store or the weather service.

use serde_json::{Map, Value};

use crate::config::DEFAULT_HAZARD_TYPES;
use crate::models::payload::{
    coerce_f64, is_present, DANGERTYPE, LATITUDE, LONGITUDE, NICKNAME, SENT,
};

pub const REQUIRED_WARNING_FIELDS: [&str; 5] = [NICKNAME, LATITUDE, LONGITUDE, DANGERTYPE, SENT];

/// Parses `raw` as a JSON object. Arrays, scalars and parse errors yield `None`.
pub fn parse_object(raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(payload)) => Some(payload),
        _ => None,
    }
}

pub fn is_well_formed_json(raw: &str) -> bool {
    parse_object(raw).is_some()
}

/// First mandatory field that is absent or `null`, in payload order.
pub fn missing_warning_field(payload: &Map<String, Value>) -> Option<&'static str> {
    REQUIRED_WARNING_FIELDS
        .into_iter()
        .find(|field| !is_present(payload, field))
}

pub fn has_required_warning_fields(payload: &Map<String, Value>) -> bool {
    missing_warning_field(payload).is_none()
}

/// First coordinate that is missing or does not parse as a finite double.
pub fn invalid_coordinate(payload: &Map<String, Value>) -> Option<&'static str> {
    [LATITUDE, LONGITUDE]
        .into_iter()
        .find(|field| payload.get(*field).and_then(coerce_f64).is_none())
}

pub fn has_valid_coordinates(payload: &Map<String, Value>) -> bool {
    invalid_coordinate(payload).is_none()
}

/// The accepted hazard categories, compared case-insensitively.
#[derive(Debug, Clone)]
pub struct HazardCatalog {
    accepted: Vec<String>,
}

impl HazardCatalog {
    pub fn new<I, S>(accepted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            accepted: accepted
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn has_accepted_hazard_type(&self, hazard_type: &str) -> bool {
        let wanted = hazard_type.to_lowercase();
        self.accepted.iter().any(|h| *h == wanted)
    }
}

impl Default for HazardCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_HAZARD_TYPES)
    }
}
