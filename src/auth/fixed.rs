use std::collections::HashMap;

use async_trait::async_trait;

use super::{IdentityVerifier, VerifyError};
use crate::core_types::UserId;

/// Fixed token table, for the in-memory backend and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticVerifier {
    tokens: HashMap<String, UserId>,
}

impl StaticVerifier {
    pub fn new(tokens: HashMap<String, UserId>) -> Self {
        Self { tokens }
    }

    pub fn with_token(mut self, token: impl Into<String>, user_id: impl Into<UserId>) -> Self {
        self.tokens.insert(token.into(), user_id.into());
        self
    }
}

#[async_trait]
impl IdentityVerifier for StaticVerifier {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn verify(&self, token: &str) -> Result<UserId, VerifyError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or_else(|| VerifyError::Rejected("unknown token".to_string()))
    }
}
