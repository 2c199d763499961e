//! CoinEx Ingest Binary
//!
//! Starts the BBO stream recorder.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin coinex-ingest
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `APIKEYCOINEX`: CoinEx API access id
//! - `APISECRETKEYCOINEX`: Pre-signed CoinEx secret (`signed_str`)
//! - `DATABASE_URL`: PostgreSQL connection string
//!
//! ## Optional
//! - `COINEX_WS_URL`: Stream endpoint (default: wss://socket.coinex.com/v2/futures)
//! - `COINEX_RECONNECT_DELAY_MS`: Reconnect delay (default: 500)
//! - `COINEX_RECONNECT_DELAY_MAX_SECS`: Delay cap (default: 30)
//! - `COINEX_RECONNECT_MULTIPLIER`: Delay growth factor (default: 1.0, fixed)
//! - `COINEX_MAX_RECONNECT_ATTEMPTS`: Attempt budget (default: 0 = unlimited)
//! - `COINEX_REFRESH_INTERVAL_HOURS`: Subscription refresh cadence (default: 24)
//! - `COINEX_DB_MAX_CONNECTIONS`: Pool size (default: 5)
//! - `INGEST_METRICS_PORT`: Prometheus port (default: 0 = disabled)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use coinex_ingest::infrastructure::coinex::{BboClient, BboClientConfig, ReconnectConfig};
use coinex_ingest::infrastructure::telemetry;
use coinex_ingest::{IngestConfig, PgQuoteStore, QuoteStore, SubscriptionDirectory, init_metrics};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls crypto provider"))?;

    load_dotenv();

    telemetry::init();

    tracing::info!("Starting CoinEx ingest");

    let config = IngestConfig::from_env()?;
    log_config(&config);

    init_metrics(config.metrics_port);

    let shutdown_token = CancellationToken::new();

    let store = PgQuoteStore::connect(&config.database.url, config.database.max_connections).await?;
    store.ping().await?;
    tracing::info!("Database connection established");

    let store: Arc<dyn QuoteStore> = Arc::new(store);
    let directory = SubscriptionDirectory::new(Arc::clone(&store), config.refresh_interval);

    let client_config = BboClientConfig {
        url: config.stream_url.clone(),
        credentials: config.credentials.clone(),
        reconnect: ReconnectConfig::from_websocket_settings(&config.websocket),
    };
    let client = BboClient::new(client_config, store, directory, shutdown_token.clone());

    let client_handle = tokio::spawn(async move {
        if let Err(e) = client.run().await {
            tracing::error!(error = %e, "BBO client error");
        }
    });

    tracing::info!("Ingest pipeline running");

    await_shutdown(shutdown_token).await;
    let _ = client_handle.await;

    tracing::info!("CoinEx ingest stopped");
    Ok(())
}

/// Log the parsed configuration.
fn log_config(config: &IngestConfig) {
    tracing::info!(
        stream_url = %config.stream_url,
        refresh_interval_hours = config.refresh_interval.num_hours(),
        metrics_port = config.metrics_port,
        db_max_connections = config.database.max_connections,
        "Configuration loaded"
    );
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();
}
