//! In-process cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct CachedValue {
    value: String,
    expires_at: Option<Instant>,
}

impl CachedValue {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// A [`CacheService`] held in a `DashMap`, with Redis-like TTL semantics.
///
/// Expiry is evaluated lazily against `tokio::time::Instant`, so tests can
/// drive windows with a paused clock. [`MemoryCache::set_available`] simulates
/// an outage: while unavailable every operation fails with
/// [`CacheError::Unavailable`] and stored data is kept.
#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<DashMap<String, CachedValue>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles simulated unavailability.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Drops every entry, as after a cache restart without persistence.
    pub fn flush(&self) {
        self.entries.clear();
    }

    /// Returns `true` if `key` holds a live value. Ignores simulated outages.
    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Removes a single key.
    pub fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    fn ensure_available(&self) -> CacheResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(CacheError::Unavailable("simulated outage".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn incr(&self, key: &str) -> CacheResult<i64> {
        self.ensure_available()?;
        let now = Instant::now();

        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if entry.is_expired(now) {
                    *entry = CachedValue {
                        value: "1".to_string(),
                        expires_at: None,
                    };
                    return Ok(1);
                }

                let current: i64 = entry.value.parse().map_err(|_| {
                    CacheError::Operation(format!("value at {key} is not an integer"))
                })?;
                let next = current
                    .checked_add(1)
                    .ok_or_else(|| CacheError::Operation(format!("increment overflow at {key}")))?;
                entry.value = next.to_string();
                Ok(next)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CachedValue {
                    value: "1".to_string(),
                    expires_at: None,
                });
                Ok(1)
            }
        }
    }

    async fn raise_to(&self, key: &str, floor: i64) -> CacheResult<i64> {
        self.ensure_available()?;
        let now = Instant::now();

        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if entry.is_expired(now) {
                    *entry = CachedValue {
                        value: floor.max(0).to_string(),
                        expires_at: None,
                    };
                    return Ok(floor.max(0));
                }

                let current: i64 = entry.value.parse().map_err(|_| {
                    CacheError::Operation(format!("value at {key} is not an integer"))
                })?;
                if current < floor {
                    entry.value = floor.to_string();
                    Ok(floor)
                } else {
                    Ok(current)
                }
            }
            Entry::Vacant(vacant) => {
                let value = floor.max(0);
                vacant.insert(CachedValue {
                    value: value.to_string(),
                    expires_at: None,
                });
                Ok(value)
            }
        }
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.ensure_available()?;
        let now = Instant::now();

        let value = self
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone());

        if value.is_none() {
            self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> CacheResult<()> {
        self.ensure_available()?;
        self.entries.insert(
            key.to_string(),
            CachedValue {
                value: value.to_string(),
                expires_at: Some(Instant::now() + Duration::from_secs(ttl_seconds)),
            },
        );
        Ok(())
    }

    async fn set_persistent(&self, key: &str, value: &str) -> CacheResult<()> {
        self.ensure_available()?;
        self.entries.insert(
            key.to_string(),
            CachedValue {
                value: value.to_string(),
                expires_at: None,
            },
        );
        Ok(())
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> CacheResult<bool> {
        self.ensure_available()?;
        let now = Instant::now();

        match self.entries.get_mut(key) {
            Some(mut entry) if !entry.is_expired(now) => {
                entry.expires_at = Some(now + Duration::from_secs(ttl_seconds));
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn ttl(&self, key: &str) -> CacheResult<Option<u64>> {
        self.ensure_available()?;
        let now = Instant::now();

        Ok(self
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .and_then(|entry| entry.expires_at)
            .map(|at| {
                // Round up like Redis does for partially elapsed seconds.
                let remaining = at.saturating_duration_since(now);
                remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
            }))
    }

    async fn health_check(&self) -> bool {
        self.ensure_available().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_incr_starts_at_one() {
        let cache = MemoryCache::new();

        assert_eq!(cache.incr("counter").await.unwrap(), 1);
        assert_eq!(cache.incr("counter").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_incr_keeps_ttl() {
        let cache = MemoryCache::new();
        cache.incr("counter").await.unwrap();
        cache.expire("counter", 60).await.unwrap();

        cache.incr("counter").await.unwrap();

        assert_eq!(cache.ttl("counter").await.unwrap(), Some(60));
    }

    #[tokio::test]
    async fn test_incr_rejects_non_integer() {
        let cache = MemoryCache::new();
        cache.set("k", "not-a-number", 60).await.unwrap();

        assert!(matches!(
            cache.incr("k").await,
            Err(CacheError::Operation(_))
        ));
    }

    #[tokio::test]
    async fn test_raise_to_moves_counter_forward_only() {
        let cache = MemoryCache::new();

        assert_eq!(cache.raise_to("counter", 4).await.unwrap(), 4);
        assert_eq!(cache.raise_to("counter", 2).await.unwrap(), 4);
        assert_eq!(cache.incr("counter").await.unwrap(), 5);
        assert_eq!(cache.raise_to("counter", 9).await.unwrap(), 9);
        assert_eq!(cache.get("counter").await.unwrap(), Some("9".to_string()));
    }

    #[tokio::test]
    async fn test_raise_to_keeps_ttl() {
        let cache = MemoryCache::new();
        cache.incr("counter").await.unwrap();
        cache.expire("counter", 60).await.unwrap();

        cache.raise_to("counter", 10).await.unwrap();

        assert_eq!(cache.ttl("counter").await.unwrap(), Some(60));
    }

    #[tokio::test]
    async fn test_raise_to_rejects_non_integer() {
        let cache = MemoryCache::new();
        cache.set("k", "not-a-number", 60).await.unwrap();

        assert!(matches!(
            cache.raise_to("k", 3).await,
            Err(CacheError::Operation(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_expires_after_ttl() {
        let cache = MemoryCache::new();
        cache.set("k", "v", 10).await.unwrap();

        tokio::time::advance(Duration::from_secs(9)).await;
        assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ttl_of_missing_or_persistent_key() {
        let cache = MemoryCache::new();
        assert_eq!(cache.ttl("missing").await.unwrap(), None);

        cache.incr("persistent").await.unwrap();
        assert_eq!(cache.ttl("persistent").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_persistent_clears_previous_ttl() {
        let cache = MemoryCache::new();
        cache.set("k", "old", 5).await.unwrap();

        cache.set_persistent("k", "new").await.unwrap();
        tokio::time::advance(Duration::from_secs(3600)).await;

        assert_eq!(cache.ttl("k").await.unwrap(), None);
        assert_eq!(cache.get("k").await.unwrap(), Some("new".to_string()));
    }

    #[tokio::test]
    async fn test_expire_missing_key_returns_false() {
        let cache = MemoryCache::new();
        assert!(!cache.expire("missing", 10).await.unwrap());
    }

    #[tokio::test]
    async fn test_simulated_outage() {
        let cache = MemoryCache::new();
        cache.set("k", "v", 60).await.unwrap();

        cache.set_available(false);
        assert!(matches!(
            cache.get("k").await,
            Err(CacheError::Unavailable(_))
        ));
        assert!(cache.incr("c").await.is_err());
        assert!(!cache.health_check().await);

        cache.set_available(true);
        assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_flush_drops_everything() {
        let cache = MemoryCache::new();
        cache.set("k", "v", 60).await.unwrap();
        cache.incr("c").await.unwrap();

        cache.flush();

        assert!(!cache.contains("k"));
        assert_eq!(cache.incr("c").await.unwrap(), 1);
    }
}
