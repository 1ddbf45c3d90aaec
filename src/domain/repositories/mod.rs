//! Repository trait definitions for the domain layer.
//!
//! These traits describe the durable store as consumed by the services: a
//! key-unique, sequence-generating persistence service. Implementations live
//! in `crate::infrastructure::persistence`; mock implementations are
//! generated via `mockall` for unit tests.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Short link persistence and lookups
//! - [`AnalyticsRepository`] - Durable click counters

pub mod analytics_repository;
pub mod link_repository;

pub use analytics_repository::AnalyticsRepository;
pub use link_repository::LinkRepository;

#[cfg(test)]
pub use analytics_repository::MockAnalyticsRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
