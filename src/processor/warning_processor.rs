use std::sync::Arc;

use tracing::{info, warn};

use crate::classifier::classify;
use crate::db::Store;
use crate::enrichment::EnrichmentClient;
use crate::error::IngestError;
use crate::models::{WarningRecord, WarningRequest};
use crate::validation::{parse_object, HazardCatalog};

/// What a successful `POST /warning` produced.
#[derive(Debug, PartialEq)]
pub enum PostOutcome {
    /// A submission was persisted.
    Accepted,
    /// A query ran; possibly empty.
    Matches(Vec<WarningRecord>),
}

/// Runs the ingestion and query pipeline independently of the HTTP layer.
///
/// Validation completes before any enrichment or storage happens, so a rejected
/// body never leaves partial state behind.
#[derive(Clone)]
pub struct WarningProcessor {
    store: Store,
    enrichment: Arc<dyn EnrichmentClient>,
    hazards: Arc<HazardCatalog>,
}

impl WarningProcessor {
    pub fn new(store: Store, enrichment: Arc<dyn EnrichmentClient>, hazards: HazardCatalog) -> Self {
        Self {
            store,
            enrichment,
            hazards: Arc::new(hazards),
        }
    }

    pub async fn process_post(&self, body: &str) -> Result<PostOutcome, IngestError> {
        // 1. Body
        if body.trim().is_empty() {
            return Err(IngestError::EmptyBody);
        }

        // 2. Parse JSON
        let payload = parse_object(body).ok_or(IngestError::MalformedJson)?;

        // 3. Classify and validate
        match classify(&payload, &self.hazards)? {
            WarningRequest::Submission {
                warning,
                weather_requested,
            } => {
                self.ingest(warning, weather_requested).await?;
                Ok(PostOutcome::Accepted)
            }
            WarningRequest::UserQuery { nickname } => {
                let matches = self.store.query_by_user(&nickname).await?;
                info!(nickname = %nickname, matches = matches.len(), "user query served");
                Ok(PostOutcome::Matches(matches))
            }
            WarningRequest::TimeRangeQuery { start, end } => {
                if start > end {
                    warn!(start, end, "time query with inverted bounds");
                }
                let matches = self.store.query_by_time_range(start, end).await?;
                info!(start, end, matches = matches.len(), "time query served");
                Ok(PostOutcome::Matches(matches))
            }
        }
    }

    pub async fn list_all(&self) -> Result<Vec<WarningRecord>, IngestError> {
        Ok(self.store.list_all().await?)
    }

    async fn ingest(
        &self,
        mut warning: WarningRecord,
        weather_requested: bool,
    ) -> Result<(), IngestError> {
        // 4. Enrich (best effort)
        if weather_requested {
            warning.weather = self
                .enrichment
                .fetch_temperature(warning.latitude, warning.longitude)
                .await;
            if warning.weather.is_none() {
                warn!(
                    nickname = %warning.reporter_id,
                    "storing warning without weather reading"
                );
            }
        }

        // 5. Persist
        self.store.insert(&warning).await?;
        info!(
            nickname = %warning.reporter_id,
            dangertype = %warning.hazard_type,
            sent = warning.sent_at,
            weather = ?warning.weather,
            "warning accepted"
        );
        Ok(())
    }
}
