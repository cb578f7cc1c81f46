use std::sync::Arc;

use crate::auth::IdentityVerifier;
use crate::store::CatalogueStore;

/// Gateway application state (shared, read-only)
#[derive(Clone)]
pub struct AppState {
    /// Catalogue backend (products, orders, allowlist)
    pub store: Arc<dyn CatalogueStore>,
    /// Bearer token → user id
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl AppState {
    pub fn new(store: Arc<dyn CatalogueStore>, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self { store, verifier }
    }
}
