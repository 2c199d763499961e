#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::too_many_lines,
        clippy::default_trait_access
    )
)]

//! CoinEx Ingest - BBO Market Data Recorder
//!
//! A long-running service that maintains a single WebSocket connection to
//! the CoinEx v2 futures feed, authenticates, subscribes to best-bid/offer
//! updates for a database-driven instrument list, and persists every tick
//! append-only to PostgreSQL.
//!
//! # Layers (inside -> outside)
//!
//! - **Domain**: Core quote types with no I/O dependencies
//!   - `quote`: The canonical quote update record
//!
//! - **Application**: Port definitions
//!   - `ports`: The `QuoteStore` interface the pipeline writes through
//!
//! - **Infrastructure**: Adapters and external integrations
//!   - `coinex`: WebSocket client, frame codec, wire types, normalizer
//!   - `directory`: Subscription list refreshed from the store on a schedule
//!   - `persistence`: PostgreSQL adapter (plus in-memory adapter for tests)
//!   - `config`: Environment-driven configuration
//!   - `metrics`: Prometheus instrumentation
//!   - `telemetry`: Tracing subscriber setup
//!
//! # Data Flow
//!
//! ```text
//! CoinEx WS ──► gzip + JSON codec ──► normalizer ──► PostgreSQL
//!     ▲                                                  │
//!     └────── subscription directory (daily refresh) ◄───┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Core quote types with no external dependencies.
pub mod domain;

/// Application layer - Port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::quote::{EXCHANGE, QuoteUpdate};

// Persistence port
pub use application::ports::{QuoteStore, StoreError};

// Infrastructure config
pub use infrastructure::config::{
    ConfigError, Credentials, DatabaseSettings, IngestConfig, WebSocketSettings,
};

// CoinEx client
pub use infrastructure::coinex::{
    BboClient, BboClientConfig, BboClientError, DecodeError, Envelope, FrameCodec,
    MalformedQuoteError, ReconnectConfig, ReconnectPolicy, normalize,
};

// Subscription directory
pub use infrastructure::directory::SubscriptionDirectory;

// Store adapters
pub use infrastructure::persistence::{InMemoryQuoteStore, PgQuoteStore};

// Metrics
pub use infrastructure::metrics::init_metrics;

// Telemetry
pub use infrastructure::telemetry::init as init_telemetry;
