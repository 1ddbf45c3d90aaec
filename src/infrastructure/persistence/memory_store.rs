//! In-process durable store.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::entities::{AnalyticsRecord, InsertOutcome, LinkRecord, NewLinkRecord};
use crate::domain::repositories::{AnalyticsRepository, LinkRepository};
use crate::error::AppError;
use crate::utils::base62;

#[derive(Default)]
struct StoreState {
    links: BTreeMap<u64, LinkRecord>,
    by_short_key: HashMap<String, u64>,
    by_fingerprint: HashMap<String, u64>,
    next_sequence: u64,
    analytics: HashMap<String, AnalyticsRecord>,
}

impl StoreState {
    /// Mirrors the PostgreSQL sequence: never below `MAX(sequence_id) + 1`.
    fn assign_sequence(&mut self) -> u64 {
        let after_max = self.links.keys().next_back().map_or(1, |max| max + 1);
        let sequence = self.next_sequence.max(after_max).max(1);
        self.next_sequence = sequence + 1;
        sequence
    }
}

/// Implements [`LinkRepository`] and [`AnalyticsRepository`] in memory with
/// the same uniqueness guarantees as the PostgreSQL schema.
///
/// Clones share state. [`MemoryStore::set_available`] simulates a database
/// outage: while unavailable every call fails with [`AppError::Unavailable`].
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggles simulated unavailability.
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Number of stored links.
    pub fn link_count(&self) -> usize {
        self.lock().links.len()
    }

    /// Number of links stored for `fingerprint` (0 or 1).
    pub fn links_with_fingerprint(&self, fingerprint: &str) -> usize {
        self.lock()
            .links
            .values()
            .filter(|link| link.content_hash == fingerprint)
            .count()
    }

    /// Reads an analytics row directly, bypassing simulated outages.
    pub fn analytics_snapshot(&self, short_key: &str) -> Option<AnalyticsRecord> {
        self.lock().analytics.get(short_key).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn checked(&self) -> Result<MutexGuard<'_, StoreState>, AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::unavailable(
                "Database unavailable",
                json!({ "reason": "simulated outage" }),
            ));
        }
        Ok(self.lock())
    }
}

#[async_trait]
impl LinkRepository for MemoryStore {
    async fn insert_if_absent(&self, new_link: NewLinkRecord) -> Result<InsertOutcome, AppError> {
        let mut state = self.checked()?;

        if let Some(existing) = state
            .by_fingerprint
            .get(&new_link.content_hash)
            .and_then(|seq| state.links.get(seq))
        {
            return Ok(InsertOutcome {
                record: existing.clone(),
                inserted: false,
            });
        }

        let sequence_id = match new_link.sequence_id {
            Some(sequence_id) => sequence_id,
            None => state.assign_sequence(),
        };
        let short_key = base62::encode(sequence_id);

        if state.links.contains_key(&sequence_id) || state.by_short_key.contains_key(&short_key) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "links_pkey", "sequence_id": sequence_id }),
            ));
        }

        let record = LinkRecord::new(
            sequence_id,
            short_key.clone(),
            new_link.long_url,
            new_link.content_hash.clone(),
            Utc::now(),
        );

        state.by_short_key.insert(short_key, sequence_id);
        state.by_fingerprint.insert(new_link.content_hash, sequence_id);
        state.links.insert(sequence_id, record.clone());

        Ok(InsertOutcome {
            record,
            inserted: true,
        })
    }

    async fn find_by_short_key(&self, short_key: &str) -> Result<Option<LinkRecord>, AppError> {
        let state = self.checked()?;
        Ok(state
            .by_short_key
            .get(short_key)
            .and_then(|seq| state.links.get(seq))
            .cloned())
    }

    async fn find_by_fingerprint(
        &self,
        fingerprint: &str,
    ) -> Result<Option<LinkRecord>, AppError> {
        let state = self.checked()?;
        Ok(state
            .by_fingerprint
            .get(fingerprint)
            .and_then(|seq| state.links.get(seq))
            .cloned())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<LinkRecord>, AppError> {
        let state = self.checked()?;
        let limit = usize::try_from(limit).unwrap_or(0);

        let mut links: Vec<LinkRecord> = state.links.values().cloned().collect();
        links.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.sequence_id.cmp(&a.sequence_id))
        });
        links.truncate(limit);
        Ok(links)
    }

    async fn health_check(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalyticsRepository for MemoryStore {
    async fn find(&self, short_key: &str) -> Result<Option<AnalyticsRecord>, AppError> {
        Ok(self.checked()?.analytics.get(short_key).cloned())
    }

    async fn upsert(&self, record: AnalyticsRecord) -> Result<(), AppError> {
        let mut state = self.checked()?;

        // created_at is immutable once the row exists
        let created_at = state
            .analytics
            .get(&record.short_key)
            .map_or(record.created_at, |existing| existing.created_at);

        state.analytics.insert(
            record.short_key.clone(),
            AnalyticsRecord {
                created_at,
                ..record
            },
        );
        Ok(())
    }

    async fn create_if_absent(&self, record: AnalyticsRecord) -> Result<bool, AppError> {
        let mut state = self.checked()?;
        if state.analytics.contains_key(&record.short_key) {
            return Ok(false);
        }
        state.analytics.insert(record.short_key.clone(), record);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_link(sequence_id: Option<u64>, url: &str) -> NewLinkRecord {
        NewLinkRecord {
            sequence_id,
            long_url: url.to_string(),
            content_hash: format!("hash-{url}"),
        }
    }

    #[tokio::test]
    async fn test_insert_with_explicit_sequence() {
        let store = MemoryStore::new();

        let outcome = store
            .insert_if_absent(new_link(Some(1), "https://a.com"))
            .await
            .unwrap();

        assert!(outcome.inserted);
        assert_eq!(outcome.record.short_key, "b");
    }

    #[tokio::test]
    async fn test_insert_same_fingerprint_returns_existing() {
        let store = MemoryStore::new();
        store
            .insert_if_absent(new_link(Some(1), "https://a.com"))
            .await
            .unwrap();

        let outcome = store
            .insert_if_absent(new_link(Some(2), "https://a.com"))
            .await
            .unwrap();

        assert!(!outcome.inserted);
        assert_eq!(outcome.record.sequence_id, 1);
        assert_eq!(store.link_count(), 1);
    }

    #[tokio::test]
    async fn test_store_sequence_skips_counter_assigned_values() {
        let store = MemoryStore::new();
        store
            .insert_if_absent(new_link(Some(5), "https://a.com"))
            .await
            .unwrap();

        let outcome = store
            .insert_if_absent(new_link(None, "https://b.com"))
            .await
            .unwrap();

        assert_eq!(outcome.record.sequence_id, 6);
        assert_eq!(outcome.record.short_key, base62::encode(6));
    }

    #[tokio::test]
    async fn test_duplicate_sequence_is_conflict() {
        let store = MemoryStore::new();
        store
            .insert_if_absent(new_link(Some(3), "https://a.com"))
            .await
            .unwrap();

        let result = store
            .insert_if_absent(new_link(Some(3), "https://b.com"))
            .await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_outage_fails_every_call() {
        let store = MemoryStore::new();
        store.set_available(false);

        assert!(matches!(
            store.find_by_short_key("b").await,
            Err(AppError::Unavailable { .. })
        ));
        assert!(AnalyticsRepository::find(&store, "b").await.is_err());
        assert!(!store.health_check().await);
    }

    #[tokio::test]
    async fn test_upsert_keeps_created_at() {
        let store = MemoryStore::new();
        let original = AnalyticsRecord::zeroed("b", Utc::now());
        store.create_if_absent(original.clone()).await.unwrap();

        let mut updated = AnalyticsRecord::zeroed("b", Utc::now() + chrono::Duration::days(1));
        updated.total_clicks = 9;
        store.upsert(updated).await.unwrap();

        let stored = store.analytics_snapshot("b").unwrap();
        assert_eq!(stored.total_clicks, 9);
        assert_eq!(stored.created_at, original.created_at);
    }

    #[tokio::test]
    async fn test_create_if_absent_is_idempotent() {
        let store = MemoryStore::new();

        assert!(
            store
                .create_if_absent(AnalyticsRecord::zeroed("b", Utc::now()))
                .await
                .unwrap()
        );
        assert!(
            !store
                .create_if_absent(AnalyticsRecord::zeroed("b", Utc::now()))
                .await
                .unwrap()
        );
    }
}
