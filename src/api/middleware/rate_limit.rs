//! Per-client fixed-window rate limiting for link creation.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;

use crate::application::services::RateLimitDecision;
use crate::state::AppState;
use crate::utils::client_ip::client_identifier;

const LIMIT: &str = "x-ratelimit-limit";
const REMAINING: &str = "x-ratelimit-remaining";
const RESET: &str = "x-ratelimit-reset";

/// Counts the request against the client's window and rejects it once the
/// window is exhausted.
///
/// The client is identified by peer IP, or by the forwarded client IP when
/// `BEHIND_PROXY` is enabled. Every response carries `X-RateLimit-Limit`,
/// `X-RateLimit-Remaining` and `X-RateLimit-Reset`.
///
/// If the counter store is down the request passes (fail-open).
///
/// # Errors
///
/// Responds `429 Too Many Requests` with `Retry-After` and the limit details.
///
/// # Example
///
/// ```rust,ignore
/// let limited = Router::new()
///     .route("/shorten", post(shorten_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit::layer));
/// ```
pub async fn layer(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Response {
    let identifier = client_identifier(req.headers(), peer, state.behind_proxy);
    let decision = state.rate_limiter.allow(&identifier).await;
    let max_requests = state.rate_limiter.config().max_requests;

    let mut response = if decision.allowed {
        next.run(req).await
    } else {
        state.rate_limiter.rejection(&decision).into_response()
    };

    insert_headers(response.headers_mut(), max_requests, &decision);
    response
}

fn insert_headers(headers: &mut HeaderMap, max_requests: u32, decision: &RateLimitDecision) {
    headers.insert(LIMIT, HeaderValue::from(max_requests));
    headers.insert(REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(RESET, HeaderValue::from(decision.reset_seconds));
}
