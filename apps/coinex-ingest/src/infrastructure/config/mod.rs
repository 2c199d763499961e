//! Configuration
//!
//! Environment-driven settings for the ingestion service.

pub mod settings;

pub use settings::{ConfigError, Credentials, DatabaseSettings, IngestConfig, WebSocketSettings};
