//! Durable store implementations.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Link storage in PostgreSQL
//! - [`PgAnalyticsRepository`] - Click analytics in PostgreSQL
//! - [`MemoryStore`] - In-process implementation of both traits, with
//!   simulated outages, for tests and local runs

mod conversions;
pub mod memory_store;
pub mod pg_analytics_repository;
pub mod pg_link_repository;

pub use memory_store::MemoryStore;
pub use pg_analytics_repository::PgAnalyticsRepository;
pub use pg_link_repository::PgLinkRepository;
