// handlers/mod.rs - Handler tiers
//
// Public (no token) and protected (bearer token, optionally role-gated)
// handlers, plus the unprefixed operational endpoints.

pub mod protected;
pub mod public;

use axum::{
    extract::{OriginalUri, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::error::Failure;
use crate::state::AppState;

/// GET / - liveness banner
pub async fn root() -> &'static str {
    "Server is running"
}

/// GET /health - reports whether the store answers
pub async fn health(State(state): State<AppState>) -> Response {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "message": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database": "unavailable"
                    }
                })),
            )
                .into_response()
        }
    }
}

/// Unmatched routes; the reported path keeps its query string
pub async fn route_not_found(OriginalUri(uri): OriginalUri) -> Failure {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    Failure::not_found(format!("Route {} not found", path))
}
