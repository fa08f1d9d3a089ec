use serde::{Serialize, Serializer};

/// Contact details a reporter may attach. Both parts travel together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactInfo {
    #[serde(rename = "areacode")]
    pub area_code: String,
    #[serde(rename = "phonenumber")]
    pub phone_number: String,
}

/// One accepted hazard report, as stored and as served back to clients.
///
/// Identity is `(sent_at, reporter_id)`. Records are never modified after insertion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarningRecord {
    /// UTC epoch milliseconds.
    #[serde(rename = "sent")]
    pub sent_at: i64,
    #[serde(rename = "nickname")]
    pub reporter_id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Kept exactly as submitted; matching is case-insensitive.
    #[serde(rename = "dangertype")]
    pub hazard_type: String,
    #[serde(flatten)]
    pub contact: Option<ContactInfo>,
    /// Temperature in Celsius, `None` when enrichment was not requested or failed.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_weather"
    )]
    pub weather: Option<i32>,
}

fn serialize_weather<S>(weather: &Option<i32>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match weather {
        Some(celsius) => serializer.serialize_str(&format!("{} Celsius", celsius)),
        None => serializer.serialize_none(),
    }
}
