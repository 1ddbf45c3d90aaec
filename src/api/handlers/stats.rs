//! Handler for link statistics.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::json;

use crate::api::dto::stats::StatsResponse;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::base62;

/// Returns click statistics for a short link.
///
/// # Endpoint
///
/// `GET /stats/{short_key}`
///
/// Reading stats folds clicks counted in the cache into the database record.
/// Keys without recorded clicks return zero counters.
///
/// # Errors
///
/// Returns 400 Bad Request if the key is not valid base62.
/// Returns 404 Not Found for a key with leading zero digits, which no link uses.
/// Returns 503 Service Unavailable when the database cannot be reached.
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(short_key): Path<String>,
) -> Result<Json<StatsResponse>, AppError> {
    let sequence_id = base62::decode(&short_key)?;
    if base62::encode(sequence_id) != short_key {
        return Err(AppError::not_found(
            "Short link not found",
            json!({ "short_key": short_key }),
        ));
    }

    let snapshot = state.click_tracker.get_stats(&short_key).await?;

    Ok(Json(snapshot.into()))
}
