//! Tracing Integration
//!
//! Configures the `tracing` subscriber for the service.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter directives (default: `coinex_ingest=info`)

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the tracing subscriber.
///
/// Reads filter directives from `RUST_LOG`, defaulting this crate to info
/// and quieting chatty transport internals.
#[allow(clippy::expect_used)]
pub fn init() {
    let env_filter = EnvFilter::from_default_env()
        .add_directive(
            "coinex_ingest=info"
                .parse()
                .expect("static directive 'coinex_ingest=info' is valid"),
        )
        .add_directive(
            "tungstenite=warn"
                .parse()
                .expect("static directive 'tungstenite=warn' is valid"),
        )
        .add_directive(
            "sqlx=warn"
                .parse()
                .expect("static directive 'sqlx=warn' is valid"),
        );

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
