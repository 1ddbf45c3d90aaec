//! Cache service trait and error types.

use async_trait::async_trait;

/// Errors that can occur during cache operations.
///
/// Every variant means "the cache could not answer". Callers treat them alike
/// and apply their own degradation policy.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("Cache operation timed out after {0}ms")]
    Timeout(u64),

    #[error("Cache operation error: {0}")]
    Operation(String),

    #[error("Caching is disabled")]
    Disabled,
}

impl CacheError {
    /// Returns `true` when the backend is intentionally absent rather than failing.
    pub fn is_disabled(&self) -> bool {
        matches!(self, CacheError::Disabled)
    }
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Fast, shared, disposable key-value store with atomic counters.
///
/// Unlike a read-through cache, every operation reports failure explicitly so
/// each service can decide how to degrade: fail open, fall back to the durable
/// store, or skip a best-effort write.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed, every call bounded by a timeout
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process, with simulated outages
/// - [`crate::infrastructure::cache::NullCache`] - Caching disabled
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Atomically increments the integer at `key` by one and returns the new value.
    ///
    /// A missing key counts as 0. The key's TTL, if any, is left untouched.
    async fn incr(&self, key: &str) -> CacheResult<i64>;

    /// Atomically raises the integer at `key` to at least `floor` and returns
    /// the resulting value.
    ///
    /// A missing key counts as 0. A value already at or above `floor` is left as is.
    async fn raise_to(&self, key: &str, floor: i64) -> CacheResult<i64>;

    /// Reads the string at `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))` on hit
    /// - `Ok(None)` on miss or after expiry
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Writes `value` at `key` with a fresh TTL of `ttl_seconds`.
    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> CacheResult<()>;

    /// Writes `value` at `key` without an expiry.
    async fn set_persistent(&self, key: &str, value: &str) -> CacheResult<()>;

    /// Sets the TTL of an existing key.
    ///
    /// Returns `false` if the key does not exist.
    async fn expire(&self, key: &str, ttl_seconds: u64) -> CacheResult<bool>;

    /// Returns the remaining TTL of `key` in whole seconds.
    ///
    /// `Ok(None)` means the key is missing or has no expiry.
    async fn ttl(&self, key: &str) -> CacheResult<Option<u64>>;

    /// Checks if the cache backend is reachable.
    async fn health_check(&self) -> bool;

    /// Returns `false` for backends that never hold data.
    fn is_enabled(&self) -> bool {
        true
    }
}
