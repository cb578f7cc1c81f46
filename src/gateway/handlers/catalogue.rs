//! Catalogue action endpoint
//!
//! One POST route carries every action. Flow per request:
//!
//! 1. parse body into an [`Action`] (400 on malformed JSON or unknown action)
//! 2. owner gate for privileged actions (401 / 403)
//! 3. delegate to the product or order service

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, error};

use super::super::services::{OrderService, ProductService};
use super::super::state::AppState;
use super::super::types::{Action, ApiResponse, parse_body};
use crate::auth::require_owner;
use crate::error::ServiceError;

/// Catalogue endpoint
///
/// Privileged actions (`insert`, `upsert`, `delete`, `listOrders`,
/// `updateOrderStatus`) require an owner bearer token. `createOrder` is
/// public.
#[utoipa::path(
    post,
    path = "/api/catalogue",
    request_body = crate::gateway::types::CatalogueRequest,
    responses(
        (status = 200, description = "Action applied", body = ApiResponse),
        (status = 400, description = "Malformed body, unknown action or invalid fields", body = ApiResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ApiResponse),
        (status = 403, description = "Caller is not an owner", body = ApiResponse),
        (status = 404, description = "Order not found", body = ApiResponse),
        (status = 500, description = "Backend failure", body = ApiResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Catalogue"
)]
pub async fn catalogue(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let action = match parse_body(&body) {
        Ok(action) => action,
        Err(e) => {
            debug!("[CATALOGUE] Rejected body: {}", e);
            return e.into_response();
        }
    };

    let name = action.name();
    match dispatch(&state, &headers, action).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            if e.is_server_error() {
                error!(action = name, kind = e.name(), "[CATALOGUE] {} failed: {}", name, e);
            } else {
                debug!(action = name, kind = e.name(), "[CATALOGUE] {} rejected: {}", name, e);
            }
            e.into_response()
        }
    }
}

async fn dispatch(
    state: &AppState,
    headers: &HeaderMap,
    action: Action,
) -> Result<ApiResponse, ServiceError> {
    if action.requires_owner() {
        require_owner(state.verifier.as_ref(), state.store.as_ref(), headers).await?;
    }

    let store = state.store.as_ref();
    match action {
        Action::Insert(data) => ProductService::new(store).insert(data).await,
        Action::Upsert(data) => ProductService::new(store).upsert(data).await,
        Action::Delete(data) => ProductService::new(store).delete(&data).await,
        Action::ListOrders => OrderService::new(store).list_orders().await,
        Action::UpdateOrderStatus(data) => OrderService::new(store).update_status(&data).await,
        Action::CreateOrder(data) => {
            let outcome = OrderService::new(store).create_order(&data).await?;
            Ok(ApiResponse::data(json!({ "id": outcome.order_id })))
        }
    }
}

/// CORS preflight: 200 with an empty body.
pub async fn preflight() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST,OPTIONS"),
        )],
    )
}
