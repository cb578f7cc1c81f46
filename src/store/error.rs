use serde::Deserialize;
use thiserror::Error;

use super::ORDER_ITEMS_TABLE;

/// Postgres SQLSTATE for `undefined_table`.
pub const PG_UNDEFINED_TABLE: &str = "42P01";

/// PostgREST code for a table missing from its schema cache.
pub const PGRST_TABLE_NOT_FOUND: &str = "PGRST205";

/// PostgREST code for an embed whose relationship is missing from its schema
/// cache (e.g. `orders` exists but `order_items` does not).
pub const PGRST_RELATIONSHIP_NOT_FOUND: &str = "PGRST200";

#[derive(Error, Debug)]
pub enum StoreError {
    /// Backing table has not been created yet
    #[error("{message}")]
    MissingTable { message: String },

    /// A single-row lookup matched nothing
    #[error("{0} not found")]
    NotFound(String),

    /// Error reported by the backend itself (constraint violation, bad column, ...)
    #[error("{message}")]
    Backend {
        status: Option<u16>,
        code: Option<String>,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Backend answered with a payload we could not interpret
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn is_missing_table(&self) -> bool {
        matches!(self, StoreError::MissingTable { .. })
    }

    /// Classify an error body returned by a PostgREST endpoint.
    pub fn from_postgrest(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct PostgrestError {
            code: Option<String>,
            message: Option<String>,
        }

        let parsed: Option<PostgrestError> = serde_json::from_str(body).ok();
        let (code, message) = match parsed {
            Some(e) => (e.code, e.message),
            None => (None, None),
        };
        let message = message.unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("backend returned HTTP {}", status)
            } else {
                body.trim().to_string()
            }
        });

        if is_missing_table(code.as_deref(), &message) {
            return StoreError::MissingTable { message };
        }
        StoreError::Backend {
            status: Some(status),
            code,
            message,
        }
    }
}

fn is_missing_table(code: Option<&str>, message: &str) -> bool {
    match code {
        Some(PG_UNDEFINED_TABLE) | Some(PGRST_TABLE_NOT_FOUND) => true,
        Some(PGRST_RELATIONSHIP_NOT_FOUND) => message.contains(ORDER_ITEMS_TABLE),
        _ => message.contains("relation \"") && message.contains("does not exist"),
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db) = err {
            let code = db.code().map(|c| c.into_owned());
            if is_missing_table(code.as_deref(), db.message()) {
                return StoreError::MissingTable {
                    message: db.message().to_string(),
                };
            }
            return StoreError::Backend {
                status: None,
                code,
                message: db.message().to_string(),
            };
        }
        StoreError::Database(err)
    }
}
