//! Repository trait for durable click analytics.

use crate::domain::entities::AnalyticsRecord;
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for [`AnalyticsRecord`] rows, keyed by short key.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgAnalyticsRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryStore`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    /// Loads the record for `short_key`, if any.
    async fn find(&self, short_key: &str) -> Result<Option<AnalyticsRecord>, AppError>;

    /// Inserts or fully overwrites the record for `record.short_key`.
    async fn upsert(&self, record: AnalyticsRecord) -> Result<(), AppError>;

    /// Inserts `record` only if no row exists for its short key.
    ///
    /// Returns `true` if a row was inserted.
    async fn create_if_absent(&self, record: AnalyticsRecord) -> Result<bool, AppError>;
}
