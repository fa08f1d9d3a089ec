//! Best-effort weather enrichment.
//!
//! The weather service takes an XML coordinates document and answers with an XML
//! body carrying `<temperature>`. Any failure degrades to "no reading"; it never
//! fails the ingestion that asked for it.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

/// Narrow contract to whatever supplies temperatures for a location.
#[async_trait]
pub trait EnrichmentClient: Send + Sync {
    /// Temperature in whole degrees Celsius, or `None` when no reading could be had.
    async fn fetch_temperature(&self, latitude: f64, longitude: f64) -> Option<i32>;
}

#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("could not spool coordinates payload: {0}")]
    Spool(#[from] std::io::Error),

    #[error("weather service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("weather service answered with status {0}")]
    Status(StatusCode),

    #[error("weather service response carries no temperature")]
    MissingTemperature,

    #[error("weather service temperature {0:?} is not a whole number")]
    InvalidTemperature(String),
}

/// HTTP adapter for the XML weather service.
pub struct WeatherServiceClient {
    client: Client,
    endpoint: String,
    spool_dir: PathBuf,
}

impl WeatherServiceClient {
    /// Builds the adapter. `timeout` bounds each whole request, body included.
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        spool_dir: impl Into<PathBuf>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            spool_dir: spool_dir.into(),
        })
    }

    async fn request_temperature(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<i32, EnrichmentError> {
        let document = coordinates_document(latitude, longitude);

        // removed when `spooled` drops, on every return path
        let spooled = {
            let dir = self.spool_dir.clone();
            let document = document.clone();
            tokio::task::spawn_blocking(move || spool_coordinates(&dir, &document))
                .await
                .map_err(std::io::Error::other)??
        };
        debug!(path = %spooled.path().display(), "coordinates spooled for weather service");

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/xml")
            .body(document)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::Status(status));
        }

        let body = response.text().await?;
        parse_temperature(&body)
    }
}

#[async_trait]
impl EnrichmentClient for WeatherServiceClient {
    async fn fetch_temperature(&self, latitude: f64, longitude: f64) -> Option<i32> {
        match self.request_temperature(latitude, longitude).await {
            Ok(celsius) => {
                debug!(latitude, longitude, celsius, "weather reading received");
                Some(celsius)
            }
            Err(e) => {
                warn!(latitude, longitude, error = %e, "weather enrichment unavailable");
                None
            }
        }
    }
}

fn coordinates_document(latitude: f64, longitude: f64) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <coordinates><latitude>{:?}</latitude><longitude>{:?}</longitude></coordinates>",
        latitude, longitude
    )
}

fn spool_coordinates(dir: &Path, document: &str) -> std::io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("weathercoordinates_")
        .suffix(".xml")
        .tempfile_in(dir)?;
    file.write_all(document.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Pulls `<temperature>` out of a weather service reply.
pub fn parse_temperature(body: &str) -> Result<i32, EnrichmentError> {
    const OPEN: &str = "<temperature>";
    const CLOSE: &str = "</temperature>";

    if !body.contains("weather") {
        return Err(EnrichmentError::MissingTemperature);
    }
    let start = body
        .find(OPEN)
        .map(|i| i + OPEN.len())
        .ok_or(EnrichmentError::MissingTemperature)?;
    let len = body
        .get(start..)
        .and_then(|rest| rest.find(CLOSE))
        .ok_or(EnrichmentError::MissingTemperature)?;
    let raw = body
        .get(start..start + len)
        .ok_or(EnrichmentError::MissingTemperature)?
        .trim();

    raw.parse::<i32>()
        .map_err(|_| EnrichmentError::InvalidTemperature(raw.to_string()))
}
