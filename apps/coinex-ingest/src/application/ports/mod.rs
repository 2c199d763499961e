//! Port Interfaces
//!
//! Defines the interfaces (ports) for external systems following the
//! Hexagonal Architecture pattern. These are the contracts that
//! infrastructure adapters must implement.
//!
//! ## Driven Ports (Outbound)
//!
//! - [`QuoteStore`]: Interface for the relational store the pipeline
//!   resolves instruments against and writes quote rows through.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::quote::QuoteUpdate;

/// Errors surfaced by a [`QuoteStore`] implementation.
///
/// The supervisor contains these at the write boundary: a store failure
/// drops the affected tick, never the session.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A query or transaction failed.
    #[error("query failed: {0}")]
    Query(String),
}

/// Outbound port for instrument resolution and quote persistence.
///
/// Implementations must guarantee that instrument resolution is race-safe:
/// two concurrent `resolve_instrument` calls for the same unseen name must
/// converge on a single durable identifier with exactly one backing row.
#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// All known instrument names, in stable (insertion) order.
    async fn instrument_names(&self) -> Result<Vec<String>, StoreError>;

    /// Map a symbolic name to its durable identifier, inserting on first sight.
    async fn resolve_instrument(&self, name: &str) -> Result<i32, StoreError>;

    /// Persist one quote update atomically (resolve + insert in one transaction).
    async fn record_quote(&self, update: &QuoteUpdate) -> Result<(), StoreError>;
}
