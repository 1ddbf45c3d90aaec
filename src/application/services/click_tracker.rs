//! Click counting with a fast cache path and lazy durable reconciliation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::domain::entities::{AnalyticsRecord, DataSource, StatsSnapshot};
use crate::domain::repositories::AnalyticsRepository;
use crate::error::AppError;
use crate::infrastructure::cache::{CacheResult, CacheService, keys};

/// Click state read from the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FastCounters {
    pub clicks: Option<u64>,
    pub last_access: Option<DateTime<Utc>>,
}

/// Merges cached counters into a durable baseline.
///
/// Returns the record to persist, or `None` when the baseline is already up
/// to date (or the cache was unreachable). Counters only move forward, so
/// applying the result twice is a no-op.
pub fn reconcile(
    baseline: &AnalyticsRecord,
    fast: &CacheResult<FastCounters>,
) -> Option<AnalyticsRecord> {
    let Ok(fast) = fast else {
        return None;
    };

    let mut record = baseline.clone();
    let mut changed = false;

    if let Some(clicks) = fast.clicks.filter(|clicks| *clicks > record.total_clicks) {
        record.total_clicks = clicks;
        changed = true;
    }

    if let Some(last_access) = fast.last_access {
        if record.last_accessed_at.is_none_or(|at| last_access > at) {
            record.last_accessed_at = Some(last_access);
            changed = true;
        }
    }

    changed.then_some(record)
}

/// Hybrid click counter.
///
/// Clicks go to a cache counter plus a last-access timestamp. When the cache
/// is unreachable the click is applied to the durable record with a
/// read-modify-write, which may lose increments under concurrent fallback.
///
/// The durable record catches up with the cache only when stats are read.
/// Clicks counted on the fast path do not roll `clicks_today`.
pub struct ClickTracker<A: AnalyticsRepository + ?Sized> {
    analytics_repository: Arc<A>,
    cache: Arc<dyn CacheService>,
}

impl<A: AnalyticsRepository + ?Sized> ClickTracker<A> {
    pub fn new(analytics_repository: Arc<A>, cache: Arc<dyn CacheService>) -> Self {
        Self {
            analytics_repository,
            cache,
        }
    }

    /// Records one click on `short_key`.
    ///
    /// # Errors
    ///
    /// Returns an error only if both the cache and the durable store fail.
    pub async fn record_click(&self, short_key: &str) -> Result<(), AppError> {
        let now = Utc::now();

        let clicks = match self.cache.incr(&keys::clicks_key(short_key)).await {
            Ok(clicks) => clicks,
            Err(e) => {
                if !e.is_disabled() {
                    warn!(short_key, error = %e, "Click counter unavailable, writing to database");
                }
                return self.record_durable(short_key, now).await;
            }
        };

        // The click is already counted; a lost timestamp is only logged.
        if let Err(e) = self
            .cache
            .set_persistent(
                &keys::last_access_key(short_key),
                &now.timestamp_millis().to_string(),
            )
            .await
        {
            warn!(short_key, error = %e, "Failed to store last access time");
        }

        debug!(short_key, clicks, "Click recorded in cache");
        Ok(())
    }

    /// Returns current stats for `short_key`, reconciling cached counters into
    /// the durable record first.
    ///
    /// Unknown keys yield a zeroed snapshot; nothing is persisted for them
    /// unless the cache holds clicks.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] if the durable store cannot be read.
    pub async fn get_stats(&self, short_key: &str) -> Result<StatsSnapshot, AppError> {
        let baseline = self
            .analytics_repository
            .find(short_key)
            .await?
            .unwrap_or_else(|| AnalyticsRecord::zeroed(short_key, Utc::now()));

        let fast = self.read_fast_counters(short_key).await;
        let data_source = match &fast {
            Ok(_) => DataSource::CacheAndDurable,
            Err(e) => {
                if !e.is_disabled() {
                    warn!(short_key, error = %e, "Click counters unavailable, using database values");
                }
                DataSource::DurableOnly
            }
        };

        let record = match reconcile(&baseline, &fast) {
            Some(updated) => {
                match self.analytics_repository.upsert(updated.clone()).await {
                    Ok(()) => debug!(
                        short_key,
                        total_clicks = updated.total_clicks,
                        "Click counters synced"
                    ),
                    Err(e) => warn!(short_key, error = %e, "Failed to persist synced counters"),
                }
                updated
            }
            None => baseline,
        };

        Ok(StatsSnapshot::from_record(&record, data_source))
    }

    /// Creates a zeroed analytics record for a new link. Safe to repeat.
    pub async fn initialize(&self, short_key: &str) -> Result<(), AppError> {
        let created = self
            .analytics_repository
            .create_if_absent(AnalyticsRecord::zeroed(short_key, Utc::now()))
            .await?;

        if created {
            debug!(short_key, "Analytics initialized");
        }
        Ok(())
    }

    async fn read_fast_counters(&self, short_key: &str) -> CacheResult<FastCounters> {
        let clicks = self
            .cache
            .get(&keys::clicks_key(short_key))
            .await?
            .and_then(|value| value.parse::<u64>().ok());

        let last_access = self
            .cache
            .get(&keys::last_access_key(short_key))
            .await?
            .and_then(|value| value.parse::<i64>().ok())
            .and_then(DateTime::<Utc>::from_timestamp_millis);

        Ok(FastCounters {
            clicks,
            last_access,
        })
    }

    async fn record_durable(&self, short_key: &str, now: DateTime<Utc>) -> Result<(), AppError> {
        let mut record = self
            .analytics_repository
            .find(short_key)
            .await?
            .unwrap_or_else(|| AnalyticsRecord::zeroed(short_key, now));

        record.register_click(now);
        let total_clicks = record.total_clicks;
        self.analytics_repository.upsert(record).await?;

        debug!(short_key, total_clicks, "Click recorded in database");
        Ok(())
    }
}
