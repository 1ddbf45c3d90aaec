//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short key to its original URL.
///
/// # Endpoint
///
/// `GET /{short_key}`
///
/// The URL is served from the cache when possible and from the database
/// otherwise. After a successful lookup the click is recorded in a spawned
/// task, so tracking never delays or fails the redirect.
///
/// # Errors
///
/// Returns 400 Bad Request if the key is not valid base62.
/// Returns 404 Not Found if no link uses the key.
pub async fn redirect_handler(
    Path(short_key): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let long_url = state.link_service.resolve(&short_key).await?;

    let tracker = state.click_tracker.clone();
    tokio::spawn(async move {
        if let Err(e) = tracker.record_click(&short_key).await {
            warn!(short_key = %short_key, error = %e, "Click dropped");
        }
    });

    Ok(Redirect::temporary(&long_url))
}
