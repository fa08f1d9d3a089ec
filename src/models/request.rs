use super::warning::WarningRecord;

/// A `POST /warning` body, decoded once and matched exhaustively downstream.
#[derive(Debug, Clone, PartialEq)]
pub enum WarningRequest {
    /// A new report to persist. `weather_requested` asks for enrichment before insert.
    Submission {
        warning: WarningRecord,
        weather_requested: bool,
    },
    /// Every report sent under one nickname.
    UserQuery { nickname: String },
    /// Every report whose `sent` falls in `[start, end]`, epoch milliseconds.
    TimeRangeQuery { start: i64, end: i64 },
}

/// Inner discriminant of a query payload (`queryType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    User,
    Time,
}

impl QueryKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(QueryKind::User),
            "time" => Some(QueryKind::Time),
            _ => None,
        }
    }
}
