//! Health check handler

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use serde_json::json;

use super::super::state::AppState;
use super::super::types::{ApiResponse, HealthResponse};
use super::helpers::now_ms;

/// Health check endpoint
///
/// Pings the catalogue backend on every call. Backend details are logged,
/// never returned.
///
/// - Healthy: 200 OK + {data: {timestamp_ms}}
/// - Unhealthy: 503 Service Unavailable + {error: "unavailable"}
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse, content_type = "application/json"),
        (status = 503, description = "Backend unreachable", body = ApiResponse)
    ),
    tag = "System"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ApiResponse>) {
    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::data(json!(HealthResponse {
                timestamp_ms: now_ms(),
            }))),
        ),
        Err(e) => {
            tracing::error!("[HEALTH] {} backend ping failed: {}", state.store.name(), e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::error("unavailable")),
            )
        }
    }
}
