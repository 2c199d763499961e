//! Persistence Adapters
//!
//! Implementations of the [`QuoteStore`](crate::application::ports::QuoteStore)
//! port: PostgreSQL for production, in-memory for tests and development.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryQuoteStore;
pub use postgres::PgQuoteStore;
