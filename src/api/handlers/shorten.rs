//! Handler for link shortening endpoint.

use axum::{Json, extract::State, http::StatusCode};
use tracing::warn;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Returns the short link for a long URL, creating it on first use.
///
/// # Endpoint
///
/// `POST /shorten`
///
/// Rate limited per client by [`crate::api::middleware::rate_limit`].
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/a" }
/// ```
///
/// # Response
///
/// `201 Created`. Repeated requests for the same URL return the same key.
///
/// ```json
/// {
///   "short_key": "b",
///   "short_url": "http://localhost:3000/b",
///   "long_url": "https://example.com/a"
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request for malformed or non-http(s) URLs.
/// Returns 503 Service Unavailable when the database cannot be reached.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    let long_url = payload.target()?;

    let short_key = state.link_service.create(long_url).await?;

    if let Err(e) = state.click_tracker.initialize(&short_key).await {
        warn!(short_key = %short_key, error = %e, "Failed to initialize analytics");
    }

    let short_url = state.link_service.short_url(&state.base_url, &short_key);

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse {
            short_key,
            short_url,
            long_url: long_url.to_string(),
        }),
    ))
}
