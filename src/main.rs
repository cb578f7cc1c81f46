//! Storefront catalogue gateway
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────────┐    ┌───────────┐
//! │  Client  │───▶│ Gateway  │───▶│ Owner gate   │───▶│ Catalogue │
//! │ (POST)   │    │ (axum)   │    │ (verifier +  │    │  store    │
//! └──────────┘    └──────────┘    │  allowlist)  │    └───────────┘
//!                                 └──────────────┘
//! ```
//!
//! Usage: `storefront_gateway [--env <name>] [--port <port>]`
//! Configuration is read from `config/<env>.yaml` (default `dev`).

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use storefront_gateway::auth::{IdentityVerifier, JwtVerifier, RemoteVerifier, StaticVerifier};
use storefront_gateway::config::{AppConfig, BackendKind, VerifierKind};
use storefront_gateway::db::Database;
use storefront_gateway::gateway::{self, state::AppState};
use storefront_gateway::store::{CatalogueStore, MemoryStore, PgStore, RestStore};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

/// `validate()` has already guaranteed the field is present for the
/// selected backend or verifier.
fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str> {
    value
        .as_deref()
        .with_context(|| format!("{} is not configured", field))
}

async fn build_store(config: &AppConfig) -> Result<Arc<dyn CatalogueStore>> {
    let backend = &config.backend;
    let timeout = Duration::from_millis(backend.request_timeout_ms);

    let store: Arc<dyn CatalogueStore> = match backend.kind {
        BackendKind::Rest => Arc::new(
            RestStore::new(
                required(&backend.url, "backend.url")?,
                required(&backend.service_role_key, "backend.service_role_key")?,
                timeout,
            )
            .context("Failed to build REST client")?,
        ),
        BackendKind::Postgres => {
            let url = required(&backend.postgres_url, "backend.postgres_url")?;
            let db = Database::connect(url, backend.max_connections)
                .await
                .context("Failed to connect to PostgreSQL")?;
            Arc::new(PgStore::new(Arc::new(db)))
        }
        BackendKind::Memory => {
            let store = MemoryStore::new();
            for owner in &backend.seed_owners {
                store.add_owner(owner.clone());
            }
            tracing::warn!("Using in-memory backend; data is lost on exit");
            Arc::new(store)
        }
    };
    Ok(store)
}

fn build_verifier(config: &AppConfig) -> Result<Arc<dyn IdentityVerifier>> {
    let auth = &config.auth;
    let verifier: Arc<dyn IdentityVerifier> = match auth.verifier {
        VerifierKind::Remote => Arc::new(
            RemoteVerifier::new(
                required(&config.backend.url, "backend.url")?,
                required(&config.backend.service_role_key, "backend.service_role_key")?,
                Duration::from_millis(config.backend.request_timeout_ms),
            )
            .context("Failed to build auth client")?,
        ),
        VerifierKind::Jwt => Arc::new(JwtVerifier::new(required(
            &auth.jwt_secret,
            "auth.jwt_secret",
        )?)),
        VerifierKind::Static => Arc::new(StaticVerifier::new(auth.static_tokens.clone())),
    };
    Ok(verifier)
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env)
        .with_context(|| format!("Failed to load configuration for env '{}'", env))?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }
    let _log_guard = storefront_gateway::logging::init_logging(&app_config)
        .with_context(|| format!("Failed to open log directory '{}'", app_config.log_dir))?;

    tracing::info!("Starting storefront gateway in {} mode", env);

    let store = build_store(&app_config).await?;
    if let Err(e) = store.health_check().await {
        // Keep serving: /api/health reports the outage.
        tracing::error!("{} backend is not reachable at startup: {}", store.name(), e);
    }
    let verifier = build_verifier(&app_config)?;

    let state = Arc::new(AppState::new(store, verifier));
    gateway::run_server(&app_config.gateway, state)
        .await
        .context("Gateway server error")?;
    Ok(())
}
