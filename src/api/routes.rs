//! API route configuration.

use crate::api::handlers::{health_handler, redirect_handler, shorten_handler, stats_handler};
use crate::api::middleware::rate_limit;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Link creation, rate limited per client.
///
/// - `POST /shorten` - Create (or look up) a short link
pub fn rate_limited_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route_layer(middleware::from_fn_with_state(state, rate_limit::layer))
}

/// Routes open to every client without limits.
///
/// - `GET /health`             - Database and cache status
/// - `GET /stats/{short_key}`  - Click statistics
/// - `GET /{short_key}`        - Redirect to the long URL
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/stats/{short_key}", get(stats_handler))
        .route("/{short_key}", get(redirect_handler))
}
