//! Click analytics entities.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Durable click counters for a single short key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyticsRecord {
    pub short_key: String,
    pub total_clicks: u64,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub clicks_today: u64,
    pub last_aggregation_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl AnalyticsRecord {
    /// Creates a zeroed record as of `now`.
    pub fn zeroed(short_key: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            short_key: short_key.into(),
            total_clicks: 0,
            last_accessed_at: None,
            clicks_today: 0,
            last_aggregation_date: now.date_naive(),
            created_at: now,
        }
    }

    /// Applies one click at `now`.
    ///
    /// `clicks_today` restarts at 1 when `now` falls on a different day than
    /// `last_aggregation_date`.
    pub fn register_click(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();

        self.total_clicks = self.total_clicks.saturating_add(1);
        self.last_accessed_at = Some(now);

        if self.last_aggregation_date != today {
            self.clicks_today = 1;
            self.last_aggregation_date = today;
        } else {
            self.clicks_today = self.clicks_today.saturating_add(1);
        }
    }
}

/// Which tiers contributed to a stats read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataSource {
    #[serde(rename = "redis+db")]
    CacheAndDurable,
    #[serde(rename = "db-only")]
    DurableOnly,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::CacheAndDurable => "redis+db",
            DataSource::DurableOnly => "db-only",
        }
    }
}

/// Point-in-time view of a link's analytics returned to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub short_key: String,
    pub total_clicks: u64,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub clicks_today: u64,
    pub data_source: DataSource,
}

impl StatsSnapshot {
    pub fn from_record(record: &AnalyticsRecord, data_source: DataSource) -> Self {
        Self {
            short_key: record.short_key.clone(),
            total_clicks: record.total_clicks,
            last_accessed_at: record.last_accessed_at,
            created_at: record.created_at,
            clicks_today: record.clicks_today,
            data_source,
        }
    }
}
