//! Short link creation and resolution over the cache and the durable store.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::entities::{InsertOutcome, LinkRecord, NewLinkRecord};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheError, CacheResult, CacheService, keys};
use crate::utils::base62;
use crate::utils::fingerprint::fingerprint;

/// Where the sequence number of a new link comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceSource {
    /// Value handed out by the shared cache counter.
    Counter(u64),
    /// The durable store assigns its own sequence.
    Durable,
}

impl SequenceSource {
    pub fn sequence_id(&self) -> Option<u64> {
        match self {
            SequenceSource::Counter(sequence_id) => Some(*sequence_id),
            SequenceSource::Durable => None,
        }
    }
}

/// Picks the sequence source from the outcome of the counter increment.
///
/// An unreachable counter, or one that returns a non-positive value, defers to
/// the durable store for this request only.
pub fn sequence_source(counter: &CacheResult<i64>) -> SequenceSource {
    match counter {
        Ok(value) => match u64::try_from(*value) {
            Ok(sequence_id) if sequence_id > 0 => SequenceSource::Counter(sequence_id),
            _ => SequenceSource::Durable,
        },
        Err(_) => SequenceSource::Durable,
    }
}

/// Cache-aside orchestrator for creating and resolving short links.
///
/// The durable store is the source of truth. Cache reads and writes are
/// best-effort: a failing cache slows requests down but never fails them.
/// Only when the durable store is unreachable too does an operation fail.
///
/// Two cache tables are maintained, each entry with its own TTL refreshed on
/// write:
/// - `hash:{fingerprint}` → short key
/// - `url:{sequence}` → long URL
pub struct LinkService<L: LinkRepository + ?Sized> {
    link_repository: Arc<L>,
    cache: Arc<dyn CacheService>,
    cache_ttl_seconds: u64,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    /// Creates a new link service.
    pub fn new(
        link_repository: Arc<L>,
        cache: Arc<dyn CacheService>,
        cache_ttl_seconds: u64,
    ) -> Self {
        Self {
            link_repository,
            cache,
            cache_ttl_seconds,
        }
    }

    /// Returns the short key for `long_url`, creating a link if none exists.
    ///
    /// The same URL always yields the same short key. Lookup order is the
    /// fingerprint cache, then the durable store; only when both miss is a new
    /// sequence allocated, preferably from the shared counter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] if the durable store cannot be reached.
    /// Cache failures never surface here.
    pub async fn create(&self, long_url: &str) -> Result<String, AppError> {
        let fingerprint = fingerprint(long_url);
        let hash_key = keys::hash_key(&fingerprint);

        match self.cache.get(&hash_key).await {
            Ok(Some(short_key)) => {
                debug!(short_key = %short_key, "Fingerprint cache hit");
                return Ok(short_key);
            }
            Ok(None) => debug!(fingerprint = %fingerprint, "Fingerprint cache miss"),
            Err(e) => log_cache_error("fingerprint lookup", &e),
        }

        if let Some(existing) = self
            .link_repository
            .find_by_fingerprint(&fingerprint)
            .await?
        {
            debug!(short_key = %existing.short_key, "Existing link found in durable store");
            self.populate(&existing).await;
            return Ok(existing.short_key);
        }

        let counter = self.cache.incr(keys::SEQUENCE_KEY).await;
        if let Err(e) = &counter {
            log_cache_error("sequence counter", e);
        }
        let source = sequence_source(&counter);

        let outcome = self.persist(source, long_url, fingerprint).await?;
        if outcome.inserted {
            info!(
                short_key = %outcome.record.short_key,
                sequence = outcome.record.sequence_id,
                degraded = source == SequenceSource::Durable,
                "Short link created"
            );
        } else {
            debug!(
                short_key = %outcome.record.short_key,
                "Concurrent creation resolved to the stored link"
            );
        }

        // A store-assigned sequence leaves the counter behind the store.
        if counter.is_ok()
            && outcome.inserted
            && source.sequence_id() != Some(outcome.record.sequence_id)
        {
            self.resync_counter(outcome.record.sequence_id).await;
        }

        self.populate(&outcome.record).await;
        Ok(outcome.record.short_key)
    }

    /// Resolves a short key to its long URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `short_key` is not valid base62.
    /// Returns [`AppError::NotFound`] if no link uses `short_key`.
    /// Returns [`AppError::Unavailable`] if the key is not cached and the
    /// durable store cannot be reached.
    pub async fn resolve(&self, short_key: &str) -> Result<String, AppError> {
        let sequence_id = base62::decode(short_key)?;

        // "ab" decodes to the same sequence as "b" but no link is stored under it
        if base62::encode(sequence_id) != short_key {
            return Err(not_found(short_key));
        }

        let url_key = keys::url_key(sequence_id);
        match self.cache.get(&url_key).await {
            Ok(Some(long_url)) => {
                debug!(short_key, "URL cache hit");
                return Ok(long_url);
            }
            Ok(None) => debug!(short_key, "URL cache miss"),
            Err(e) => log_cache_error("url lookup", &e),
        }

        let record = self
            .link_repository
            .find_by_short_key(short_key)
            .await?
            .ok_or_else(|| not_found(short_key))?;

        if let Err(e) = self
            .cache
            .set(&url_key, &record.long_url, self.cache_ttl_seconds)
            .await
        {
            log_cache_error("url repopulate", &e);
        }

        Ok(record.long_url)
    }

    /// Reads a link from the durable store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link uses `short_key`.
    pub async fn get_link(&self, short_key: &str) -> Result<LinkRecord, AppError> {
        self.link_repository
            .find_by_short_key(short_key)
            .await?
            .ok_or_else(|| not_found(short_key))
    }

    /// Lists the most recently created links.
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<LinkRecord>, AppError> {
        self.link_repository.list_recent(limit).await
    }

    /// Checks if the durable store is reachable.
    pub async fn store_healthy(&self) -> bool {
        self.link_repository.health_check().await
    }

    /// Builds the public short URL for `short_key`.
    pub fn short_url(&self, base_url: &str, short_key: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), short_key)
    }

    /// Persists a new link.
    ///
    /// A counter-assigned sequence that is already taken durably (the counter
    /// was reset after cache data loss) is retried once with a store-assigned
    /// sequence.
    async fn persist(
        &self,
        source: SequenceSource,
        long_url: &str,
        content_hash: String,
    ) -> Result<InsertOutcome, AppError> {
        let new_link = NewLinkRecord {
            sequence_id: source.sequence_id(),
            long_url: long_url.to_string(),
            content_hash,
        };

        match self.link_repository.insert_if_absent(new_link.clone()).await {
            Err(AppError::Conflict { .. }) if new_link.sequence_id.is_some() => {
                warn!(
                    sequence = new_link.sequence_id,
                    "Counter sequence already taken, falling back to durable sequence"
                );
                self.link_repository
                    .insert_if_absent(NewLinkRecord {
                        sequence_id: None,
                        ..new_link
                    })
                    .await
            }
            other => other,
        }
    }

    /// Moves the sequence counter up to `sequence_id` so later increments
    /// skip sequences the durable store already handed out.
    async fn resync_counter(&self, sequence_id: u64) {
        let Ok(floor) = i64::try_from(sequence_id) else {
            return;
        };

        match self.cache.raise_to(keys::SEQUENCE_KEY, floor).await {
            Ok(value) => debug!(sequence = value, "Sequence counter resynced"),
            Err(e) => log_cache_error("sequence resync", &e),
        }
    }

    /// Writes both cache tables for `record`. Failures are logged only.
    async fn populate(&self, record: &LinkRecord) {
        let ttl = self.cache_ttl_seconds;

        if let Err(e) = self
            .cache
            .set(&keys::hash_key(&record.content_hash), &record.short_key, ttl)
            .await
        {
            log_cache_error("fingerprint populate", &e);
        }

        if let Err(e) = self
            .cache
            .set(&keys::url_key(record.sequence_id), &record.long_url, ttl)
            .await
        {
            log_cache_error("url populate", &e);
        }
    }
}

fn not_found(short_key: &str) -> AppError {
    AppError::not_found("Short link not found", json!({ "short_key": short_key }))
}

fn log_cache_error(operation: &'static str, error: &CacheError) {
    if error.is_disabled() {
        debug!(operation, "Cache disabled");
    } else {
        warn!(operation, error = %error, "Cache unavailable, continuing without it");
    }
}
