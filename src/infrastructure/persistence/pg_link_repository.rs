//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, warn};

use super::conversions::{to_i64, to_u64};
use crate::domain::entities::{InsertOutcome, LinkRecord, NewLinkRecord};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::base62;

/// Advisory lock key serializing store-assigned sequence inserts.
const SEQUENCE_LOCK_KEY: i64 = 0x6c69_6e6b_7365_71;

#[derive(Debug, sqlx::FromRow)]
struct LinkRow {
    sequence_id: i64,
    short_key: Option<String>,
    long_url: String,
    content_hash: String,
    created_at: DateTime<Utc>,
}

impl LinkRow {
    fn into_record(self) -> Result<LinkRecord, AppError> {
        let sequence_id = to_u64(self.sequence_id, "sequence_id")?;
        let short_key = self
            .short_key
            .unwrap_or_else(|| base62::encode(sequence_id));

        Ok(LinkRecord::new(
            sequence_id,
            short_key,
            self.long_url,
            self.content_hash,
            self.created_at,
        ))
    }
}

/// PostgreSQL repository for link storage and retrieval.
///
/// Uniqueness of `content_hash` and `short_key` is enforced by the schema;
/// inserts use `ON CONFLICT (content_hash) DO NOTHING` followed by a re-read so
/// concurrent creators of the same URL converge on one row.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn insert_with_sequence(
        &self,
        sequence_id: u64,
        new_link: &NewLinkRecord,
    ) -> Result<Option<LinkRow>, AppError> {
        let short_key = base62::encode(sequence_id);

        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO links (sequence_id, short_key, long_url, content_hash)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (content_hash) DO NOTHING
            RETURNING sequence_id, short_key, long_url, content_hash, created_at
            "#,
        )
        .bind(to_i64(sequence_id))
        .bind(&short_key)
        .bind(&new_link.long_url)
        .bind(&new_link.content_hash)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    /// Inserts with a store-assigned sequence and writes the derived short key
    /// in the same transaction.
    ///
    /// The sequence never goes below `MAX(sequence_id) + 1`, so values handed
    /// out by the shared counter are not reused. A transaction-scoped advisory
    /// lock keeps concurrent store-assigned inserts from reading the same `MAX`.
    async fn insert_with_store_sequence(
        &self,
        new_link: &NewLinkRecord,
    ) -> Result<Option<LinkRow>, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(SEQUENCE_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let inserted = sqlx::query_as::<_, (i64,)>(
            r#"
            INSERT INTO links (sequence_id, long_url, content_hash)
            VALUES (
                GREATEST(
                    nextval(pg_get_serial_sequence('links', 'sequence_id')),
                    (SELECT COALESCE(MAX(sequence_id), 0) + 1 FROM links)
                ),
                $1,
                $2
            )
            ON CONFLICT (content_hash) DO NOTHING
            RETURNING sequence_id
            "#,
        )
        .bind(&new_link.long_url)
        .bind(&new_link.content_hash)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((sequence_id,)) = inserted else {
            tx.rollback().await?;
            return Ok(None);
        };

        let short_key = base62::encode(to_u64(sequence_id, "sequence_id")?);
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            UPDATE links SET short_key = $1
            WHERE sequence_id = $2
            RETURNING sequence_id, short_key, long_url, content_hash, created_at
            "#,
        )
        .bind(&short_key)
        .bind(sequence_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(row))
    }

    async fn winner(&self, content_hash: &str) -> Result<InsertOutcome, AppError> {
        let record = self.find_by_fingerprint(content_hash).await?.ok_or_else(|| {
            AppError::internal(
                "Fingerprint conflict without a stored link",
                json!({ "content_hash": content_hash }),
            )
        })?;

        Ok(InsertOutcome {
            record,
            inserted: false,
        })
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn insert_if_absent(&self, new_link: NewLinkRecord) -> Result<InsertOutcome, AppError> {
        let row = match new_link.sequence_id {
            Some(sequence_id) => self.insert_with_sequence(sequence_id, &new_link).await?,
            None => {
                // Only a counter-assigned insert can still take the value;
                // nextval moves forward on every attempt.
                let mut attempt = 1u32;
                loop {
                    match self.insert_with_store_sequence(&new_link).await {
                        Err(AppError::Conflict { .. }) => {
                            warn!(attempt, "Store-assigned sequence collided, retrying");
                            attempt += 1;
                        }
                        other => break other?,
                    }
                }
            }
        };

        match row {
            Some(row) => {
                let record = row.into_record()?;
                debug!(
                    short_key = %record.short_key,
                    sequence = record.sequence_id,
                    "Link persisted"
                );
                Ok(InsertOutcome {
                    record,
                    inserted: true,
                })
            }
            None => self.winner(&new_link.content_hash).await,
        }
    }

    async fn find_by_short_key(&self, short_key: &str) -> Result<Option<LinkRecord>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT sequence_id, short_key, long_url, content_hash, created_at
            FROM links
            WHERE short_key = $1
            "#,
        )
        .bind(short_key)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(LinkRow::into_record).transpose()
    }

    async fn find_by_fingerprint(
        &self,
        fingerprint: &str,
    ) -> Result<Option<LinkRecord>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT sequence_id, short_key, long_url, content_hash, created_at
            FROM links
            WHERE content_hash = $1
            "#,
        )
        .bind(fingerprint)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(LinkRow::into_record).transpose()
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<LinkRecord>, AppError> {
        let rows = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT sequence_id, short_key, long_url, content_hash, created_at
            FROM links
            ORDER BY created_at DESC, sequence_id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter().map(LinkRow::into_record).collect()
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
