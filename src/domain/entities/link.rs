//! Link entity mapping a short key to a long URL.

use chrono::{DateTime, Utc};

/// A persisted short link.
///
/// `short_key` is always the base62 encoding of `sequence_id`, and
/// `content_hash` is unique across all records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub sequence_id: u64,
    pub short_key: String,
    pub long_url: String,
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
}

impl LinkRecord {
    /// Creates a new LinkRecord instance.
    pub fn new(
        sequence_id: u64,
        short_key: String,
        long_url: String,
        content_hash: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sequence_id,
            short_key,
            long_url,
            content_hash,
            created_at,
        }
    }
}

/// Input data for persisting a new link.
///
/// `sequence_id` is `None` when the shared counter was unreachable and the
/// durable store must assign its own sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLinkRecord {
    pub sequence_id: Option<u64>,
    pub long_url: String,
    pub content_hash: String,
}

/// Outcome of an insert-if-absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOutcome {
    pub record: LinkRecord,
    /// `false` when another writer already stored a link with the same fingerprint.
    pub inserted: bool,
}
