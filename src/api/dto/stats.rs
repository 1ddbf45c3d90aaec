//! DTOs for link statistics endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::{DataSource, StatsSnapshot};

/// Click analytics for a single short link.
///
/// `dataSource` is `"redis+db"` when the click counters in the cache were
/// read during the request and `"db-only"` otherwise.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub short_key: String,
    pub total_clicks: u64,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub clicks_today: u64,
    pub data_source: DataSource,
}

impl From<StatsSnapshot> for StatsResponse {
    fn from(snapshot: StatsSnapshot) -> Self {
        Self {
            short_key: snapshot.short_key,
            total_clicks: snapshot.total_clicks,
            last_accessed_at: snapshot.last_accessed_at,
            created_at: snapshot.created_at,
            clicks_today: snapshot.clicks_today,
            data_source: snapshot.data_source,
        }
    }
}
