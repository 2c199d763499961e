//! Infrastructure Layer - Adapters and external integrations.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer.

/// CoinEx WebSocket client, frame codec, wire types, and normalizer.
pub mod coinex;

/// Environment-driven configuration.
pub mod config;

/// Subscription directory refreshed from the store on a fixed cadence.
pub mod directory;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Persistence adapters (PostgreSQL, in-memory).
pub mod persistence;

/// Tracing subscriber setup.
pub mod telemetry;
