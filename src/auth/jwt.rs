use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use super::{IdentityVerifier, VerifyError};
use crate::core_types::UserId;

/// Access token claims we rely on
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Subject (user id)
    pub exp: usize,  // Expiration time (as UTC timestamp)
    #[serde(default)]
    pub role: Option<String>,
}

/// Verifies HS256 access tokens locally with the project JWT secret.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Hosted tokens carry aud = "authenticated"; the subject is all we need.
        validation.validate_aud = false;
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn decode_claims(&self, token: &str) -> Result<Claims, VerifyError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| VerifyError::Rejected(e.to_string()))
    }
}

#[async_trait]
impl IdentityVerifier for JwtVerifier {
    fn name(&self) -> &'static str {
        "jwt"
    }

    async fn verify(&self, token: &str) -> Result<UserId, VerifyError> {
        let claims = self.decode_claims(token)?;
        if claims.sub.is_empty() {
            return Err(VerifyError::Rejected("token has empty subject".to_string()));
        }
        Ok(claims.sub)
    }
}
