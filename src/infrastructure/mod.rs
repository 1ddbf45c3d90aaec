//! Infrastructure layer for external integrations.
//!
//! Implements the interfaces defined by the domain layer and the cache
//! capability consumed by the services.
//!
//! # Modules
//!
//! - [`cache`] - Redis, in-process and disabled cache backends
//! - [`persistence`] - PostgreSQL and in-process repository implementations

pub mod cache;
pub mod persistence;
