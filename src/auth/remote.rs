use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::{IdentityVerifier, VerifyError};
use crate::core_types::UserId;

/// Subset of the auth service's user object we rely on.
#[derive(Debug, Deserialize)]
struct AuthUser {
    id: Option<String>,
}

/// Asks the hosted auth service who a token belongs to
/// (`GET {project_url}/auth/v1/user`).
pub struct RemoteVerifier {
    client: reqwest::Client,
    user_url: String,
    api_key: String,
}

impl RemoteVerifier {
    pub fn new(project_url: &str, api_key: &str, timeout: Duration) -> Result<Self, VerifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, project_url, api_key))
    }

    pub fn with_client(client: reqwest::Client, project_url: &str, api_key: &str) -> Self {
        Self {
            client,
            user_url: format!("{}/auth/v1/user", project_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        }
    }

    pub fn user_url(&self) -> &str {
        &self.user_url
    }
}

#[async_trait]
impl IdentityVerifier for RemoteVerifier {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn verify(&self, token: &str) -> Result<UserId, VerifyError> {
        let response = self
            .client
            .get(&self.user_url)
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(VerifyError::Rejected(format!("auth service returned {}", status)));
        }

        let user: AuthUser = response.json().await?;
        match user.id {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(VerifyError::Rejected("user object has no id".to_string())),
        }
    }
}
