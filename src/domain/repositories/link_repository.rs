//! Repository trait for short link data access.

use crate::domain::entities::{InsertOutcome, LinkRecord, NewLinkRecord};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for durable short links.
///
/// The store enforces uniqueness of both `short_key` and `content_hash`; those
/// constraints are the correctness backstop against cache incoherence.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryStore`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Persists a link unless one with the same fingerprint already exists.
    ///
    /// When `new_link.sequence_id` is `None` the store assigns its own
    /// sequence and derives the short key from it atomically with the insert.
    ///
    /// # Returns
    ///
    /// - `inserted = true` with the new record
    /// - `inserted = false` with the record already stored for the fingerprint
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the supplied sequence (or its short
    /// key) is already taken by a different link.
    /// Returns [`AppError::Unavailable`] if the store cannot be reached.
    async fn insert_if_absent(&self, new_link: NewLinkRecord) -> Result<InsertOutcome, AppError>;

    /// Finds a link by its short key.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] or [`AppError::Internal`] on database errors.
    async fn find_by_short_key(&self, short_key: &str) -> Result<Option<LinkRecord>, AppError>;

    /// Finds a link by the fingerprint of its long URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] or [`AppError::Internal`] on database errors.
    async fn find_by_fingerprint(&self, fingerprint: &str)
    -> Result<Option<LinkRecord>, AppError>;

    /// Lists the most recently created links, newest first.
    async fn list_recent(&self, limit: i64) -> Result<Vec<LinkRecord>, AppError>;

    /// Checks if the store is reachable.
    async fn health_check(&self) -> bool;
}
