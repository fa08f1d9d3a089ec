use axum::http::StatusCode;
use thiserror::Error;

use crate::db::StoreError;

/// Every way a `/warning` request can fail.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("request body is empty")]
    EmptyBody,

    #[error("request body is not a JSON object")]
    MalformedJson,

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{0}` has an invalid value")]
    InvalidField(&'static str),

    #[error("field `{0}` is not a number")]
    InvalidCoordinate(&'static str),

    #[error("field `{field}` is not an ISO-8601 offset datetime: {value:?}")]
    InvalidTimestamp { field: &'static str, value: String },

    #[error("hazard type {0:?} is not accepted")]
    UnsupportedHazard(String),

    #[error("unsupported query type {0:?}")]
    UnsupportedQuery(String),

    #[error("a warning from {nickname:?} sent at {sent} already exists")]
    DuplicateRecord { nickname: String, sent: i64 },

    #[error("storage is unavailable")]
    StorageUnavailable(#[source] sqlx::Error),

    #[error("storage failure")]
    Storage(#[source] sqlx::Error),
}

impl IngestError {
    pub fn status(&self) -> StatusCode {
        match self {
            IngestError::EmptyBody => StatusCode::PRECONDITION_FAILED,
            IngestError::MalformedJson | IngestError::UnsupportedQuery(_) => StatusCode::BAD_REQUEST,
            IngestError::MissingField(_)
            | IngestError::InvalidField(_)
            | IngestError::InvalidCoordinate(_)
            | IngestError::InvalidTimestamp { .. }
            | IngestError::UnsupportedHazard(_)
            | IngestError::DuplicateRecord { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            IngestError::StorageUnavailable(_) | IngestError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Fixed text sent to the client. The detailed cause stays in the server log.
    pub fn public_message(&self) -> &'static str {
        match self {
            IngestError::EmptyBody => "Error: Request body is empty",
            IngestError::MalformedJson => "Error: Request body is not valid JSON",
            IngestError::UnsupportedQuery(_) => "Error: Unsupported query",
            IngestError::MissingField(_) => "Error: Required information is missing",
            IngestError::InvalidField(_)
            | IngestError::InvalidCoordinate(_)
            | IngestError::InvalidTimestamp { .. } => "Error: Message content is invalid",
            IngestError::UnsupportedHazard(_) => "Error: Danger type is not accepted",
            IngestError::DuplicateRecord { .. } => "Error: Warning already exists",
            IngestError::StorageUnavailable(_) | IngestError::Storage(_) => {
                "Error: Internal server error"
            }
        }
    }
}

impl From<StoreError> for IngestError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey { nickname, sent } => {
                IngestError::DuplicateRecord { nickname, sent }
            }
            StoreError::Unavailable(e) => IngestError::StorageUnavailable(e),
            StoreError::Query(e) => IngestError::Storage(e),
        }
    }
}
