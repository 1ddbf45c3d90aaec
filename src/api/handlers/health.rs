//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health with per-backend checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: Database reachable. A failing cache reports `degraded`
///   because every operation has a database fallback.
/// - **503 Service Unavailable**: Database unreachable
///
/// # Response
///
/// ```json
/// {
///   "status": "degraded",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok", "message": "Connected" },
///     "cache": { "status": "error", "message": "Redis unreachable, serving from database" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let database = check_database(&state).await;
    let cache = check_cache(&state).await;

    let (code, status) = match (database.status.as_str(), cache.status.as_str()) {
        ("ok", "error") => (StatusCode::OK, "degraded"),
        ("ok", _) => (StatusCode::OK, "healthy"),
        _ => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
    };

    let response = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks { database, cache },
    };

    (code, Json(response))
}

async fn check_database(state: &AppState) -> CheckStatus {
    if state.link_service.store_healthy().await {
        CheckStatus::new("ok", "Connected")
    } else {
        CheckStatus::new("error", "Database unreachable")
    }
}

async fn check_cache(state: &AppState) -> CheckStatus {
    if !state.cache.is_enabled() {
        return CheckStatus::new("disabled", "Caching disabled");
    }

    if state.cache.health_check().await {
        CheckStatus::new("ok", "Redis connected")
    } else {
        CheckStatus::new("error", "Redis unreachable, serving from database")
    }
}
