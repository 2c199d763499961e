//! Prometheus Metrics Module
//!
//! Exposes ingestion metrics via Prometheus format for monitoring.
//!
//! # Metrics Categories
//!
//! - **Frames**: Counts of frames received and dropped by reason
//! - **Quotes**: Counts of quote rows persisted and store write failures
//! - **Connection**: Reconnection attempts and subscription size

use std::net::SocketAddr;
use std::sync::OnceLock;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// With a non-zero port, an HTTP exposition endpoint is served on
/// `0.0.0.0:port` (requires a Tokio runtime context). With port 0 the
/// recorder is installed without a listener; metrics are still recorded.
/// Subsequent calls are no-ops.
///
/// # Panics
///
/// Panics if the recorder cannot be installed.
#[allow(clippy::expect_used)]
pub fn init_metrics(port: u16) {
    INSTALLED.get_or_init(|| {
        if port == 0 {
            let _handle = PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder");
        } else {
            let addr: SocketAddr = ([0, 0, 0, 0], port).into();
            PrometheusBuilder::new()
                .with_http_listener(addr)
                .install()
                .expect("failed to install Prometheus recorder");
        }

        register_metrics();
    });
}

fn register_metrics() {
    describe_counter!(
        "coinex_ingest_frames_received_total",
        "Total binary frames received from the feed"
    );
    describe_counter!(
        "coinex_ingest_frames_dropped_total",
        "Total frames dropped, by reason (decode, malformed)"
    );
    describe_counter!(
        "coinex_ingest_quotes_persisted_total",
        "Total quote rows written to the store"
    );
    describe_counter!(
        "coinex_ingest_store_errors_total",
        "Total persistence failures (tick dropped, session kept)"
    );
    describe_counter!(
        "coinex_ingest_reconnects_total",
        "Total WebSocket reconnection attempts"
    );
    describe_gauge!(
        "coinex_ingest_subscription_size",
        "Number of instruments in the current subscription set"
    );
}

/// Record a received binary frame.
pub fn record_frame_received() {
    counter!("coinex_ingest_frames_received_total").increment(1);
}

/// Record a dropped frame with the drop reason.
pub fn record_frame_dropped(reason: &'static str) {
    counter!("coinex_ingest_frames_dropped_total", "reason" => reason).increment(1);
}

/// Record a persisted quote row.
pub fn record_quote_persisted() {
    counter!("coinex_ingest_quotes_persisted_total").increment(1);
}

/// Record a persistence failure.
pub fn record_store_error() {
    counter!("coinex_ingest_store_errors_total").increment(1);
}

/// Record a reconnection attempt.
pub fn record_reconnect() {
    counter!("coinex_ingest_reconnects_total").increment(1);
}

/// Update the subscription size gauge.
#[allow(clippy::cast_precision_loss)]
pub fn set_subscription_size(count: usize) {
    gauge!("coinex_ingest_subscription_size").set(count as f64);
}
