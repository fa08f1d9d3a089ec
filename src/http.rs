//! HTTP glue for the `/warning` resource.
//!
//! - `POST /warning` - submit a warning or run a query
//! - `GET /warning` - every stored warning
//! - `GET /health/live` - liveness probe
//!
//! Any other method on `/warning` is answered with `400`.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::IngestError;
use crate::processor::{PostOutcome, WarningProcessor};

const SERVICE_NAME: &str = env!("CARGO_PKG_NAME");
const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn router(processor: WarningProcessor) -> Router {
    Router::new()
        .route(
            "/warning",
            get(list_warnings)
                .post(submit_warning)
                .fallback(unsupported_method),
        )
        .route("/health/live", get(health_live))
        .with_state(processor)
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, cause = ?std::error::Error::source(&self), "request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "request rejected");
        }
        (status, self.public_message()).into_response()
    }
}

async fn submit_warning(State(processor): State<WarningProcessor>, body: Bytes) -> Response {
    let span = info_span!("post_warning", request_id = %Uuid::new_v4());

    async move {
        let Ok(text) = std::str::from_utf8(&body) else {
            return IngestError::MalformedJson.into_response();
        };

        match processor.process_post(text).await {
            Ok(PostOutcome::Accepted) => StatusCode::OK.into_response(),
            Ok(PostOutcome::Matches(warnings)) => (StatusCode::OK, Json(warnings)).into_response(),
            Err(e) => e.into_response(),
        }
    }
    .instrument(span)
    .await
}

async fn list_warnings(State(processor): State<WarningProcessor>) -> Response {
    let span = info_span!("get_warnings", request_id = %Uuid::new_v4());

    async move {
        match processor.list_all().await {
            Ok(warnings) => {
                info!(count = warnings.len(), "sending warnings");
                (StatusCode::OK, Json(warnings)).into_response()
            }
            Err(e) => e.into_response(),
        }
    }
    .instrument(span)
    .await
}

async fn unsupported_method() -> Response {
    warn!("unsupported method on /warning");
    (
        StatusCode::BAD_REQUEST,
        "Error: Requested function is not supported",
    )
        .into_response()
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

async fn health_live() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        service: SERVICE_NAME,
        version: SERVICE_VERSION,
    })
}
