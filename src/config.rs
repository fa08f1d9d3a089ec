use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_HAZARD_TYPES: [&str; 3] = ["moose", "reindeer", "meteorite"];

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub weather_service_url: String,
    pub weather_timeout_ms: u64,
    pub weather_spool_dir: PathBuf,
    pub hazard_types: Vec<String>,
    pub log_level: String,
    pub log_format: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8001".to_string());
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://warnings.db".to_string());
        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);

        let weather_service_url = env::var("WEATHER_SERVICE_URL")
            .unwrap_or_else(|_| "http://localhost:4001/weather".to_string());
        let weather_timeout_ms = env::var("WEATHER_TIMEOUT_MS")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .unwrap_or(3000);
        let weather_spool_dir = env::var("WEATHER_SPOOL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| env::temp_dir());

        let hazard_types = parse_hazard_types(&env::var("HAZARD_TYPES").unwrap_or_default());

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        Ok(Self {
            bind_addr,
            database_url,
            db_max_connections,
            weather_service_url,
            weather_timeout_ms,
            weather_spool_dir,
            hazard_types,
            log_level,
            log_format,
        })
    }
}

/// Splits a comma separated hazard list, falling back to the built-in set when
/// nothing usable is configured.
pub fn parse_hazard_types(raw: &str) -> Vec<String> {
    let parsed: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    if parsed.is_empty() {
        DEFAULT_HAZARD_TYPES.iter().map(|s| s.to_string()).collect()
    } else {
        parsed
    }
}
