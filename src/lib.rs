//! Hazard warning ingestion service.
//!
//! Accepts geotagged hazard reports over HTTP, validates and optionally
//! enriches them with a weather reading, stores them in SQLite and serves
//! them back in full, per reporter, or per time window.

pub mod classifier;
pub mod config;
pub mod db;
pub mod enrichment;
pub mod error;
pub mod http;
pub mod models;
pub mod processor;
pub mod validation;
