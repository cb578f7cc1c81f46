use axum::http::{HeaderMap, header};
use tracing::{debug, error, warn};

use super::IdentityVerifier;
use crate::core_types::UserId;
use crate::error::ServiceError;
use crate::store::CatalogueStore;

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// Header names are case-insensitive by construction of [`HeaderMap`]; the
/// scheme is matched case-insensitively as well. Returns `None` for a
/// missing header, another scheme or an empty token.
pub fn parse_bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = raw.split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Authenticate the caller and check the owner allowlist.
///
/// 1. no bearer token → `Unauthenticated`
/// 2. token not resolvable → `Unauthenticated`
/// 3. allowlist lookup fails → `Unauthenticated` (verification failure)
/// 4. not on the allowlist → `Forbidden`
pub async fn require_owner(
    verifier: &dyn IdentityVerifier,
    store: &dyn CatalogueStore,
    headers: &HeaderMap,
) -> Result<UserId, ServiceError> {
    let token = parse_bearer_token(headers).ok_or_else(|| {
        ServiceError::Unauthenticated("Missing Authorization bearer token.".to_string())
    })?;

    let user_id = verifier.verify(&token).await.map_err(|e| {
        debug!("[AUTH] {} verifier rejected token: {}", verifier.name(), e);
        ServiceError::Unauthenticated("Invalid or expired session.".to_string())
    })?;

    let is_owner = store.is_owner(&user_id).await.map_err(|e| {
        error!("[AUTH] Owner lookup failed for user {}: {}", user_id, e);
        ServiceError::Unauthenticated("Owner verification failed.".to_string())
    })?;

    if !is_owner {
        warn!("[AUTH] User {} is not an owner", user_id);
        return Err(ServiceError::Forbidden("Not authorized.".to_string()));
    }

    Ok(user_id)
}
