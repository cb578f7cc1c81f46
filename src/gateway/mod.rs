pub mod handlers;
pub mod openapi;
pub mod services;
pub mod state;
pub mod types;

use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Request, header},
    middleware::{Next, from_fn},
    response::Response,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::GatewayConfig;
use state::AppState;

/// Path the catalogue is also served on, for clients built against the
/// serverless deployment.
pub const FUNCTION_ALIAS_ROUTE: &str = "/.netlify/functions/catalogue";

pub const HEALTH_ROUTE: &str = "/api/health";

/// Axum middleware adding permissive CORS headers to every response.
async fn cors_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    response
}

/// Build the complete router: catalogue endpoint (plus alias), health probe
/// and API docs.
pub fn build_router(state: Arc<AppState>, route: &str) -> Router {
    let catalogue = post(handlers::catalogue).options(handlers::preflight);

    let mut app = Router::new()
        .route(route, catalogue.clone())
        .route(HEALTH_ROUTE, get(handlers::health_check));
    if route != FUNCTION_ALIAS_ROUTE {
        app = app.route(FUNCTION_ALIAS_ROUTE, catalogue);
    }

    app.with_state(state)
        // OpenAPI / Swagger UI (stateless, added after with_state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(from_fn(cors_middleware))
}

/// Start HTTP Gateway server
pub async fn run_server(config: &GatewayConfig, state: Arc<AppState>) -> std::io::Result<()> {
    let app = build_router(state.clone(), &config.route);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        tracing::error!(
            "[GATEWAY] Failed to bind to {} (port may already be in use): {}",
            addr,
            e
        );
        e
    })?;

    tracing::info!("[GATEWAY] Listening on http://{}", addr);
    tracing::info!("[GATEWAY] Catalogue: POST {}", config.route);
    tracing::info!("[GATEWAY] Backend: {}, verifier: {}", state.store.name(), state.verifier.name());
    tracing::info!("[GATEWAY] API Docs: http://{}/docs", addr);

    axum::serve(listener, app).await
}
