//! Cache implementation used when caching is disabled.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use tracing::debug;

/// A cache that holds nothing and reports every operation as failed.
///
/// Used when Redis is not configured or could not be reached at startup.
/// Because every call returns [`CacheError::Disabled`], services take their
/// degraded paths: the rate limiter fails open, sequence numbers come from the
/// durable store and clicks are written straight to the database.
pub struct NullCache;

impl NullCache {
    /// Creates a new NullCache instance.
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn incr(&self, _key: &str) -> CacheResult<i64> {
        Err(CacheError::Disabled)
    }

    async fn raise_to(&self, _key: &str, _floor: i64) -> CacheResult<i64> {
        Err(CacheError::Disabled)
    }

    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Err(CacheError::Disabled)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl_seconds: u64) -> CacheResult<()> {
        Err(CacheError::Disabled)
    }

    async fn set_persistent(&self, _key: &str, _value: &str) -> CacheResult<()> {
        Err(CacheError::Disabled)
    }

    async fn expire(&self, _key: &str, _ttl_seconds: u64) -> CacheResult<bool> {
        Err(CacheError::Disabled)
    }

    async fn ttl(&self, _key: &str) -> CacheResult<Option<u64>> {
        Err(CacheError::Disabled)
    }

    async fn health_check(&self) -> bool {
        false
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
