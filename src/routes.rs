//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /shorten`            - Create a short link (rate limited per client)
//! - `GET  /{short_key}`        - Redirect to the long URL
//! - `GET  /stats/{short_key}`  - Click statistics
//! - `GET  /health`             - Database and cache status
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Fixed window per client IP on creation only
//! - **Path normalization** - Trailing slash handling

use crate::api::middleware::tracing;
use crate::api::routes::{public_routes, rate_limited_routes};
use crate::state::AppState;
use axum::Router;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Builds the router with every route and middleware except path
/// normalization.
///
/// Handlers under rate limiting need [`axum::extract::ConnectInfo`], so the
/// router must be served with `into_make_service_with_connect_info`.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .merge(rate_limited_routes(state.clone()))
        .merge(public_routes())
        .with_state(state)
        .layer(tracing::layer())
}

/// Constructs the application router, trimming trailing slashes before routing.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(api_router(state))
}
