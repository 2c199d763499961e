//! Domain Layer - Core quote types.
//!
//! This layer contains the canonical data types the pipeline produces and
//! persists. All types here are pure Rust with serialization support.

/// The canonical quote update record.
pub mod quote;
