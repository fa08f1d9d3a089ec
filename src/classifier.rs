use serde_json::{Map, Value};

use crate::error::IngestError;
use crate::models::payload::{
    coerce_f64, coerce_text, is_present, parse_offset_datetime, AREACODE, DANGERTYPE, LATITUDE,
    LONGITUDE, NICKNAME, PHONENUMBER, QUERY, QUERY_TYPE, SENT, TIME_END, TIME_START, WEATHER,
};
use crate::models::{ContactInfo, QueryKind, WarningRecord, WarningRequest};
use crate::validation::{invalid_coordinate, missing_warning_field, HazardCatalog};

/// Decides what a parsed `/warning` body asks for and validates it for that purpose.
///
/// A body carrying a non-null `query` field is a query; anything else must be a
/// complete warning submission.
pub fn classify(
    payload: &Map<String, Value>,
    hazards: &HazardCatalog,
) -> Result<WarningRequest, IngestError> {
    if is_present(payload, QUERY) {
        classify_query(payload)
    } else {
        classify_submission(payload, hazards)
    }
}

fn classify_query(payload: &Map<String, Value>) -> Result<WarningRequest, IngestError> {
    let query_type = match payload.get(QUERY_TYPE) {
        None | Some(Value::Null) => return Err(IngestError::MissingField(QUERY_TYPE)),
        Some(Value::String(s)) => s.as_str(),
        Some(other) => return Err(IngestError::UnsupportedQuery(other.to_string())),
    };

    match QueryKind::parse(query_type) {
        Some(QueryKind::User) => Ok(WarningRequest::UserQuery {
            nickname: required_nickname(payload)?,
        }),
        Some(QueryKind::Time) => Ok(WarningRequest::TimeRangeQuery {
            start: required_timestamp(payload, TIME_START)?,
            end: required_timestamp(payload, TIME_END)?,
        }),
        None => Err(IngestError::UnsupportedQuery(query_type.to_string())),
    }
}

fn classify_submission(
    payload: &Map<String, Value>,
    hazards: &HazardCatalog,
) -> Result<WarningRequest, IngestError> {
    if let Some(field) = missing_warning_field(payload) {
        return Err(IngestError::MissingField(field));
    }
    if let Some(field) = invalid_coordinate(payload) {
        return Err(IngestError::InvalidCoordinate(field));
    }

    let reporter_id = required_nickname(payload)?;

    let hazard_type = match payload.get(DANGERTYPE) {
        Some(Value::String(s)) => s.clone(),
        _ => return Err(IngestError::InvalidField(DANGERTYPE)),
    };
    if !hazards.has_accepted_hazard_type(&hazard_type) {
        return Err(IngestError::UnsupportedHazard(hazard_type));
    }

    let sent_at = required_timestamp(payload, SENT)?;

    // coordinates were checked above
    let latitude = payload.get(LATITUDE).and_then(coerce_f64).unwrap_or_default();
    let longitude = payload.get(LONGITUDE).and_then(coerce_f64).unwrap_or_default();

    Ok(WarningRequest::Submission {
        warning: WarningRecord {
            sent_at,
            reporter_id,
            latitude,
            longitude,
            hazard_type,
            contact: contact_info(payload),
            weather: None,
        },
        weather_requested: is_present(payload, WEATHER),
    })
}

fn required_nickname(payload: &Map<String, Value>) -> Result<String, IngestError> {
    match payload.get(NICKNAME) {
        None | Some(Value::Null) => Err(IngestError::MissingField(NICKNAME)),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(_) => Err(IngestError::InvalidField(NICKNAME)),
    }
}

fn required_timestamp(payload: &Map<String, Value>, field: &'static str) -> Result<i64, IngestError> {
    let raw = match payload.get(field) {
        None | Some(Value::Null) => return Err(IngestError::MissingField(field)),
        Some(Value::String(s)) => s,
        Some(other) => {
            return Err(IngestError::InvalidTimestamp {
                field,
                value: other.to_string(),
            })
        }
    };

    parse_offset_datetime(raw).ok_or_else(|| IngestError::InvalidTimestamp {
        field,
        value: raw.clone(),
    })
}

/// Contact details survive only as a pair.
fn contact_info(payload: &Map<String, Value>) -> Option<ContactInfo> {
    let area_code = payload.get(AREACODE).and_then(coerce_text)?;
    let phone_number = payload.get(PHONENUMBER).and_then(coerce_text)?;
    Some(ContactInfo {
        area_code,
        phone_number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classify_json(value: Value) -> Result<WarningRequest, IngestError> {
        classify(value.as_object().unwrap(), &HazardCatalog::default())
    }

    fn alice() -> Value {
        json!({
            "nickname": "alice",
            "latitude": 61.5,
            "longitude": 23.7,
            "dangertype": "Moose",
            "sent": "2024-01-01T10:00:00+02:00"
        })
    }

    #[test]
    fn test_plain_submission() {
        let request = classify_json(alice()).unwrap();
        let WarningRequest::Submission {
            warning,
            weather_requested,
        } = request
        else {
            panic!("expected a submission");
        };
        assert_eq!(warning.reporter_id, "alice");
        assert_eq!(warning.hazard_type, "Moose");
        assert_eq!(warning.sent_at, 1_704_096_000_000);
        assert_eq!(warning.latitude, 61.5);
        assert_eq!(warning.contact, None);
        assert_eq!(warning.weather, None);
        assert!(!weather_requested);
    }

    #[test]
    fn test_submission_with_contact_and_weather() {
        let mut body = alice();
        body["areacode"] = json!(358);
        body["phonenumber"] = json!("0401234567");
        body["weather"] = json!("yes please");

        let Ok(WarningRequest::Submission {
            warning,
            weather_requested,
        }) = classify_json(body)
        else {
            panic!("expected a submission");
        };
        assert_eq!(
            warning.contact,
            Some(ContactInfo {
                area_code: "358".to_string(),
                phone_number: "0401234567".to_string(),
            })
        );
        assert!(weather_requested);
    }

    #[test]
    fn test_half_contact_is_dropped() {
        let mut body = alice();
        body["areacode"] = json!("358");
        body["phonenumber"] = Value::Null;

        let Ok(WarningRequest::Submission { warning, .. }) = classify_json(body) else {
            panic!("expected a submission");
        };
        assert_eq!(warning.contact, None);
    }

    #[test]
    fn test_null_weather_does_not_request_enrichment() {
        let mut body = alice();
        body["weather"] = Value::Null;
        let Ok(WarningRequest::Submission {
            weather_requested, ..
        }) = classify_json(body)
        else {
            panic!("expected a submission");
        };
        assert!(!weather_requested);
    }

    #[test]
    fn test_submission_rejections() {
        let mut body = alice();
        body.as_object_mut().unwrap().remove("sent");
        assert!(matches!(classify_json(body), Err(IngestError::MissingField("sent"))));

        let mut body = alice();
        body["longitude"] = json!("east-ish");
        assert!(matches!(
            classify_json(body),
            Err(IngestError::InvalidCoordinate("longitude"))
        ));

        let mut body = alice();
        body["dangertype"] = json!("Bear");
        assert!(matches!(classify_json(body), Err(IngestError::UnsupportedHazard(h)) if h == "Bear"));

        let mut body = alice();
        body["dangertype"] = json!(3);
        assert!(matches!(classify_json(body), Err(IngestError::InvalidField("dangertype"))));

        let mut body = alice();
        body["nickname"] = json!("  ");
        assert!(matches!(classify_json(body), Err(IngestError::InvalidField("nickname"))));

        let mut body = alice();
        body["sent"] = json!("2024-01-01T10:00:00");
        assert!(matches!(
            classify_json(body),
            Err(IngestError::InvalidTimestamp { field: "sent", .. })
        ));
    }

    #[test]
    fn test_user_query() {
        let request = classify_json(json!({"query": true, "queryType": "user", "nickname": "alice"}));
        assert_eq!(
            request.unwrap(),
            WarningRequest::UserQuery {
                nickname: "alice".to_string()
            }
        );

        let request = classify_json(json!({"query": true, "queryType": "user"}));
        assert!(matches!(request, Err(IngestError::MissingField("nickname"))));
    }

    #[test]
    fn test_time_query_keeps_inverted_bounds() {
        let request = classify_json(json!({
            "query": true,
            "queryType": "time",
            "timestart": "2024-01-02T00:00:00Z",
            "timeend": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        let WarningRequest::TimeRangeQuery { start, end } = request else {
            panic!("expected a time query");
        };
        assert!(start > end);
    }

    #[test]
    fn test_time_query_needs_both_bounds() {
        let request = classify_json(json!({
            "query": true,
            "queryType": "time",
            "timestart": "2024-01-01T00:00:00Z"
        }));
        assert!(matches!(request, Err(IngestError::MissingField("timeend"))));

        let request = classify_json(json!({
            "query": true,
            "queryType": "time",
            "timestart": "soon",
            "timeend": "2024-01-01T00:00:00Z"
        }));
        assert!(matches!(
            request,
            Err(IngestError::InvalidTimestamp { field: "timestart", .. })
        ));
    }

    #[test]
    fn test_unknown_query_type_is_not_a_submission() {
        let mut body = alice();
        body["query"] = json!(true);
        body["queryType"] = json!("location");
        assert!(matches!(classify_json(body), Err(IngestError::UnsupportedQuery(q)) if q == "location"));

        let request = classify_json(json!({"query": true}));
        assert!(matches!(request, Err(IngestError::MissingField("queryType"))));
    }
}
