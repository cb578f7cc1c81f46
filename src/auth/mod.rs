//! Owner authentication
//!
//! Privileged catalogue actions carry a bearer access token issued by the
//! hosted auth service. The token is resolved to a user id by an
//! [`IdentityVerifier`] and the user id is checked against the owner
//! allowlist by [`gate::require_owner`].

pub mod fixed;
pub mod gate;
pub mod jwt;
pub mod remote;

pub use fixed::StaticVerifier;
pub use gate::{parse_bearer_token, require_owner};
pub use jwt::JwtVerifier;
pub use remote::RemoteVerifier;

use async_trait::async_trait;
use thiserror::Error;

use crate::core_types::UserId;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("token rejected: {0}")]
    Rejected(String),

    #[error("auth service unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Resolves an access token to the user it was issued for.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verifier name for logging
    fn name(&self) -> &'static str;

    async fn verify(&self, token: &str) -> Result<UserId, VerifyError>;
}
