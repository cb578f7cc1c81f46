//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8888/docs`
//! - OpenAPI JSON: `http://localhost:8888/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::gateway::types::{ApiResponse, CatalogueRequest, HealthResponse};

/// Bearer access token issued by the hosted auth service
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Owner session token: Authorization: Bearer <access_token>. \
                             Required for every action except createOrder.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront Catalogue API",
        version = "1.0.0",
        description = "Product catalogue management, anonymous checkout and owner order management.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8888", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::catalogue::catalogue,
        crate::gateway::handlers::health::health_check,
    ),
    components(
        schemas(
            ApiResponse,
            CatalogueRequest,
            HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Catalogue", description = "Product mutations, checkout and order management"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
