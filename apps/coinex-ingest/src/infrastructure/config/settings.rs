//! Ingest Configuration Settings
//!
//! Configuration types for the ingestion service, loaded from environment
//! variables.

use std::time::Duration;

use chrono::TimeDelta;

/// Default CoinEx v2 futures WebSocket endpoint.
pub const DEFAULT_STREAM_URL: &str = "wss://socket.coinex.com/v2/futures";

/// CoinEx API credentials.
///
/// `signed_str` is a pre-signed HMAC secret supplied by the credential
/// source; this service never re-derives it. The `Debug` implementation
/// redacts both values for safe logging.
#[derive(Clone)]
pub struct Credentials {
    access_id: String,
    signed_str: String,
}

impl Credentials {
    /// Create new credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if either value is empty.
    pub fn new(
        access_id: impl Into<String>,
        signed_str: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let access_id = access_id.into();
        let signed_str = signed_str.into();

        if access_id.is_empty() {
            return Err(ConfigError::EmptyValue("APIKEYCOINEX".to_string()));
        }
        if signed_str.is_empty() {
            return Err(ConfigError::EmptyValue("APISECRETKEYCOINEX".to_string()));
        }

        Ok(Self {
            access_id,
            signed_str,
        })
    }

    /// Get the API access id.
    #[must_use]
    pub fn access_id(&self) -> &str {
        &self.access_id
    }

    /// Get the pre-signed secret.
    #[must_use]
    pub fn signed_str(&self) -> &str {
        &self.signed_str
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_id", &"[REDACTED]")
            .field("signed_str", &"[REDACTED]")
            .finish()
    }
}

/// WebSocket connection settings.
#[derive(Debug, Clone)]
pub struct WebSocketSettings {
    /// Initial reconnection delay.
    pub reconnect_delay_initial: Duration,
    /// Maximum reconnection delay.
    pub reconnect_delay_max: Duration,
    /// Reconnection delay multiplier (1.0 = fixed delay).
    pub reconnect_delay_multiplier: f64,
    /// Maximum reconnection attempts before giving up (0 = unlimited).
    pub max_reconnect_attempts: u32,
}

impl Default for WebSocketSettings {
    fn default() -> Self {
        Self {
            reconnect_delay_initial: Duration::from_millis(500),
            reconnect_delay_max: Duration::from_secs(30),
            reconnect_delay_multiplier: 1.0,
            max_reconnect_attempts: 0, // Unlimited
        }
    }
}

/// Database connection settings.
#[derive(Clone)]
pub struct DatabaseSettings {
    /// PostgreSQL connection string.
    pub url: String,
    /// Maximum connections in the pool.
    pub max_connections: u32,
}

impl std::fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// Complete service configuration.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Stream endpoint URL.
    pub stream_url: String,
    /// API credentials.
    pub credentials: Credentials,
    /// Database settings.
    pub database: DatabaseSettings,
    /// WebSocket connection settings.
    pub websocket: WebSocketSettings,
    /// Subscription list refresh cadence.
    pub refresh_interval: TimeDelta,
    /// Prometheus metrics port (0 = no listener).
    pub metrics_port: u16,
}

impl IngestConfig {
    /// Create configuration from environment variables.
    ///
    /// Required: `APIKEYCOINEX`, `APISECRETKEYCOINEX`, `DATABASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if a required environment variable is missing or
    /// empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let access_id = require_env("APIKEYCOINEX")?;
        let signed_str = require_env("APISECRETKEYCOINEX")?;
        let database_url = require_env("DATABASE_URL")?;

        let stream_url =
            std::env::var("COINEX_WS_URL").unwrap_or_else(|_| DEFAULT_STREAM_URL.to_string());

        let websocket = WebSocketSettings {
            reconnect_delay_initial: parse_env_duration_millis(
                "COINEX_RECONNECT_DELAY_MS",
                WebSocketSettings::default().reconnect_delay_initial,
            ),
            reconnect_delay_max: parse_env_duration_secs(
                "COINEX_RECONNECT_DELAY_MAX_SECS",
                WebSocketSettings::default().reconnect_delay_max,
            ),
            reconnect_delay_multiplier: parse_env_f64(
                "COINEX_RECONNECT_MULTIPLIER",
                WebSocketSettings::default().reconnect_delay_multiplier,
            ),
            max_reconnect_attempts: parse_env_u32(
                "COINEX_MAX_RECONNECT_ATTEMPTS",
                WebSocketSettings::default().max_reconnect_attempts,
            ),
        };

        let refresh_interval =
            TimeDelta::hours(parse_env_i64("COINEX_REFRESH_INTERVAL_HOURS", 24).max(1));

        Ok(Self {
            stream_url,
            credentials: Credentials::new(access_id, signed_str)?,
            database: DatabaseSettings {
                url: database_url,
                max_connections: parse_env_u32("COINEX_DB_MAX_CONNECTIONS", 5),
            },
            websocket,
            refresh_interval,
            metrics_port: parse_env_u16("INGEST_METRICS_PORT", 0),
        })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    let value =
        std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))?;
    if value.is_empty() {
        return Err(ConfigError::EmptyValue(key.to_string()));
    }
    Ok(value)
}

fn parse_env_u16(key: &str, default: u16) -> u16 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_env_duration_secs(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}

fn parse_env_duration_millis(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map_or(default, Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_rejects_empty_values() {
        assert!(Credentials::new("", "secret").is_err());
        assert!(Credentials::new("key", "").is_err());
        assert!(Credentials::new("key", "secret").is_ok());
    }

    #[test]
    fn credentials_redacted_debug() {
        let creds = Credentials::new("key123", "secret456").unwrap();
        let debug = format!("{creds:?}");
        assert!(!debug.contains("key123"));
        assert!(!debug.contains("secret456"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn database_settings_redacted_debug() {
        let settings = DatabaseSettings {
            url: "postgres://user:hunter2@db/quotes".to_string(),
            max_connections: 5,
        };
        let debug = format!("{settings:?}");
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn websocket_settings_defaults() {
        let settings = WebSocketSettings::default();
        assert_eq!(settings.reconnect_delay_initial, Duration::from_millis(500));
        assert_eq!(settings.reconnect_delay_max, Duration::from_secs(30));
        assert!((settings.reconnect_delay_multiplier - 1.0).abs() < f64::EPSILON);
        assert_eq!(settings.max_reconnect_attempts, 0);
    }
}
