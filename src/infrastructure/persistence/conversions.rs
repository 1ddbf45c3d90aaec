//! Conversions between unsigned domain counters and PostgreSQL `BIGINT`.

use crate::error::AppError;
use serde_json::json;

/// Converts a stored `BIGINT` into an unsigned counter or sequence.
pub(crate) fn to_u64(value: i64, column: &'static str) -> Result<u64, AppError> {
    u64::try_from(value).map_err(|_| {
        AppError::internal(
            "Negative value in unsigned column",
            json!({ "column": column, "value": value }),
        )
    })
}

/// Converts an unsigned counter into a `BIGINT`, saturating at `i64::MAX`.
pub(crate) fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
