//! Core domain entities.
//!
//! - [`LinkRecord`] - A persisted short link
//! - [`AnalyticsRecord`] - Durable click counters for a short link
//! - [`StatsSnapshot`] - Reconciled analytics view returned to callers
//!
//! Creation inputs use separate structs (`NewLinkRecord`), following the
//! "New Type" pattern.

pub mod analytics;
pub mod link;

pub use analytics::{AnalyticsRecord, DataSource, StatsSnapshot};
pub use link::{InsertOutcome, LinkRecord, NewLinkRecord};
