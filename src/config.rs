use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use thiserror::Error;

/// Startup configuration errors. Any of these aborts the process.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Missing configuration value: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Path of the catalogue endpoint
    #[serde(default = "default_route")]
    pub route: String,
}

fn default_route() -> String {
    "/api/catalogue".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Hosted PostgREST-style API (`{url}/rest/v1`)
    Rest,
    /// Direct PostgreSQL connection
    Postgres,
    /// In-process tables, for local development
    Memory,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Project URL of the hosted backend (also hosts the auth service)
    #[serde(default)]
    pub url: Option<String>,
    /// Service role key; prefer the SUPABASE_SERVICE_ROLE_KEY env var
    #[serde(default)]
    pub service_role_key: Option<String>,
    #[serde(default)]
    pub postgres_url: Option<String>,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Owner user ids loaded into the allowlist of the memory backend
    #[serde(default)]
    pub seed_owners: Vec<String>,
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_max_connections() -> u32 {
    10
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VerifierKind {
    /// Ask the hosted auth service (`{url}/auth/v1/user`)
    #[default]
    Remote,
    /// Verify HS256 access tokens locally with the project JWT secret
    Jwt,
    /// Fixed token table from config
    Static,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub verifier: VerifierKind,
    #[serde(default)]
    pub jwt_secret: Option<String>,
    /// token -> user id, only used by the static verifier
    #[serde(default)]
    pub static_tokens: HashMap<String, String>,
}

impl AppConfig {
    /// Load `config/{env}.yaml`, apply environment overrides and validate.
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;
        let mut config = Self::from_yaml(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Secrets are normally injected by the environment rather than committed
    /// to the yaml files; a set variable always wins.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("SUPABASE_URL") {
            self.backend.url = Some(url);
        }
        if let Some(key) = non_empty("SUPABASE_SERVICE_ROLE_KEY") {
            self.backend.service_role_key = Some(key);
        }
        if let Some(url) = non_empty("DATABASE_URL") {
            self.backend.postgres_url = Some(url);
        }
        if let Some(secret) = non_empty("SUPABASE_JWT_SECRET") {
            self.auth.jwt_secret = Some(secret);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gateway.route.starts_with('/') {
            return Err(ConfigError::Invalid {
                field: "gateway.route",
                reason: format!("must start with '/', got {:?}", self.gateway.route),
            });
        }

        match self.backend.kind {
            BackendKind::Rest => {
                require(&self.backend.url, "backend.url (SUPABASE_URL)")?;
                require(
                    &self.backend.service_role_key,
                    "backend.service_role_key (SUPABASE_SERVICE_ROLE_KEY)",
                )?;
            }
            BackendKind::Postgres => {
                require(&self.backend.postgres_url, "backend.postgres_url (DATABASE_URL)")?;
            }
            BackendKind::Memory => {}
        }

        match self.auth.verifier {
            VerifierKind::Remote => {
                require(&self.backend.url, "backend.url (SUPABASE_URL)")?;
                require(
                    &self.backend.service_role_key,
                    "backend.service_role_key (SUPABASE_SERVICE_ROLE_KEY)",
                )?;
            }
            VerifierKind::Jwt => {
                require(&self.auth.jwt_secret, "auth.jwt_secret (SUPABASE_JWT_SECRET)")?;
            }
            VerifierKind::Static => {}
        }

        if self.backend.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "backend.request_timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

fn require(value: &Option<String>, name: &'static str) -> Result<(), ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(ConfigError::Missing(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REST_YAML: &str = r#"
log_level: info
log_dir: ./logs
log_file: storefront.log
use_json: false
rotation: daily
gateway:
  host: 0.0.0.0
  port: 8888
backend:
  kind: rest
auth:
  verifier: remote
"#;

    #[test]
    fn test_rest_backend_requires_url_and_key() {
        let config = AppConfig::from_yaml(REST_YAML).unwrap();
        assert_eq!(config.gateway.route, "/api/catalogue");
        assert!(matches!(config.validate(), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn test_env_overrides_fill_secrets() {
        let mut config = AppConfig::from_yaml(REST_YAML).unwrap();
        config.apply_env_overrides(|key| match key {
            "SUPABASE_URL" => Some("https://project.supabase.co".to_string()),
            "SUPABASE_SERVICE_ROLE_KEY" => Some("service-key".to_string()),
            _ => None,
        });
        assert!(config.validate().is_ok());
        assert_eq!(
            config.backend.url.as_deref(),
            Some("https://project.supabase.co")
        );
    }

    #[test]
    fn test_blank_env_value_is_ignored() {
        let mut config = AppConfig::from_yaml(REST_YAML).unwrap();
        config.apply_env_overrides(|_| Some("   ".to_string()));
        assert!(config.backend.url.is_none());
    }

    #[test]
    fn test_memory_backend_with_static_tokens() {
        let yaml = r#"
log_level: debug
log_dir: ./logs
log_file: storefront.log
use_json: true
rotation: never
gateway:
  host: 127.0.0.1
  port: 8888
  route: /.netlify/functions/catalogue
backend:
  kind: memory
auth:
  verifier: static
  static_tokens:
    owner-token: owner-1
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.backend.kind, BackendKind::Memory);
        assert_eq!(config.backend.request_timeout_ms, 10_000);
        assert_eq!(
            config.auth.static_tokens.get("owner-token").map(String::as_str),
            Some("owner-1")
        );
    }

    #[test]
    fn test_jwt_verifier_requires_secret() {
        let yaml = REST_YAML.replace("kind: rest", "kind: memory").replace(
            "verifier: remote",
            "verifier: jwt",
        );
        let config = AppConfig::from_yaml(&yaml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("auth.jwt_secret (SUPABASE_JWT_SECRET)"))
        ));
    }

    #[test]
    fn test_route_must_be_absolute() {
        let yaml = REST_YAML
            .replace("kind: rest", "kind: memory")
            .replace("verifier: remote", "verifier: static")
            .replace("port: 8888", "port: 8888\n  route: catalogue");
        let config = AppConfig::from_yaml(&yaml).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "gateway.route",
                ..
            })
        ));
    }
}
