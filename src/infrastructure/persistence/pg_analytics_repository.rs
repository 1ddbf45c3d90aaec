//! PostgreSQL implementation of analytics repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use super::conversions::{to_i64, to_u64};
use crate::domain::entities::AnalyticsRecord;
use crate::domain::repositories::AnalyticsRepository;
use crate::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct AnalyticsRow {
    short_key: String,
    total_clicks: i64,
    last_accessed_at: Option<DateTime<Utc>>,
    clicks_today: i64,
    last_aggregation_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl AnalyticsRow {
    fn into_record(self) -> Result<AnalyticsRecord, AppError> {
        Ok(AnalyticsRecord {
            short_key: self.short_key,
            total_clicks: to_u64(self.total_clicks, "total_clicks")?,
            last_accessed_at: self.last_accessed_at,
            clicks_today: to_u64(self.clicks_today, "clicks_today")?,
            last_aggregation_date: self.last_aggregation_date,
            created_at: self.created_at,
        })
    }
}

/// PostgreSQL repository for per-link click counters.
pub struct PgAnalyticsRepository {
    pool: Arc<PgPool>,
}

impl PgAnalyticsRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsRepository for PgAnalyticsRepository {
    async fn find(&self, short_key: &str) -> Result<Option<AnalyticsRecord>, AppError> {
        let row = sqlx::query_as::<_, AnalyticsRow>(
            r#"
            SELECT short_key, total_clicks, last_accessed_at, clicks_today,
                   last_aggregation_date, created_at
            FROM link_analytics
            WHERE short_key = $1
            "#,
        )
        .bind(short_key)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(AnalyticsRow::into_record).transpose()
    }

    async fn upsert(&self, record: AnalyticsRecord) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO link_analytics
                (short_key, total_clicks, last_accessed_at, clicks_today,
                 last_aggregation_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (short_key) DO UPDATE SET
                total_clicks = EXCLUDED.total_clicks,
                last_accessed_at = EXCLUDED.last_accessed_at,
                clicks_today = EXCLUDED.clicks_today,
                last_aggregation_date = EXCLUDED.last_aggregation_date
            "#,
        )
        .bind(&record.short_key)
        .bind(to_i64(record.total_clicks))
        .bind(record.last_accessed_at)
        .bind(to_i64(record.clicks_today))
        .bind(record.last_aggregation_date)
        .bind(record.created_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn create_if_absent(&self, record: AnalyticsRecord) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO link_analytics
                (short_key, total_clicks, last_accessed_at, clicks_today,
                 last_aggregation_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (short_key) DO NOTHING
            "#,
        )
        .bind(&record.short_key)
        .bind(to_i64(record.total_clicks))
        .bind(record.last_accessed_at)
        .bind(to_i64(record.clicks_today))
        .bind(record.last_aggregation_date)
        .bind(record.created_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
