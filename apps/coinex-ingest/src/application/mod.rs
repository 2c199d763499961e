//! Application Layer - Port definitions.
//!
//! This layer defines the contracts the ingestion pipeline uses to reach
//! external systems; infrastructure adapters implement them.

/// Port interfaces for external systems (persistence).
pub mod ports;
