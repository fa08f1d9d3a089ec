use std::sync::Arc;
use std::time::Duration;

use hazard_warnings::config::AppConfig;
use hazard_warnings::db::Store;
use hazard_warnings::enrichment::WeatherServiceClient;
use hazard_warnings::http;
use hazard_warnings::processor::WarningProcessor;
use hazard_warnings::validation::HazardCatalog;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = AppConfig::load()?;

    // Init logging
    if config.log_format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .with_env_filter(&config.log_level)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(&config.log_level)
            .init();
    }

    info!("Starting Hazard Warning Service...");

    // Init DB
    let store = Store::connect(&config.database_url, config.db_max_connections).await?;
    info!("Connected to database");

    // Weather enrichment
    let weather = WeatherServiceClient::new(
        config.weather_service_url.clone(),
        Duration::from_millis(config.weather_timeout_ms),
        config.weather_spool_dir.clone(),
    )?;
    info!(
        url = %config.weather_service_url,
        timeout_ms = config.weather_timeout_ms,
        "Weather service configured"
    );

    let processor = WarningProcessor::new(
        store.clone(),
        Arc::new(weather),
        HazardCatalog::new(&config.hazard_types),
    );
    info!(hazards = ?config.hazard_types, "Accepted hazard types");

    // Serve
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Listening for warnings");

    axum::serve(listener, http::router(processor))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
