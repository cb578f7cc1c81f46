//! API response envelope
//!
//! Every reply from the catalogue endpoint is a JSON object with any subset
//! of `data`, `error`, `meta` and `success`. Absent members are omitted, not
//! serialized as `null`.

use serde::Serialize;
use serde_json::{Value, json};
use utoipa::ToSchema;

/// Unified catalogue response
///
/// - success with payload: `{ "data": ... }`
/// - success without payload: `{ "success": true }`
/// - failure: `{ "error": "message" }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct ApiResponse {
    /// Result payload (row, list of rows or `{ id }`)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<Value>,
    /// Human-readable failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Not authorized.")]
    pub error: Option<String>,
    /// Diagnostics (e.g. `missingOrdersTable`)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub meta: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
}

impl ApiResponse {
    pub fn data(data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    pub fn with_meta(data: Value, meta: Value) -> Self {
        Self {
            data: Some(data),
            meta: Some(meta),
            ..Self::default()
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            error: Some(msg.into()),
            ..Self::default()
        }
    }

    pub fn success() -> Self {
        Self {
            success: Some(true),
            ..Self::default()
        }
    }
}

/// Health probe payload
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Server time in milliseconds since the Unix epoch
    #[schema(example = 1767225600000_i64)]
    pub timestamp_ms: i64,
}

/// `meta` attached to an order listing when the order tables are missing.
pub fn missing_orders_meta(message: &str) -> Value {
    json!({
        "missingOrdersTable": true,
        "message": message,
    })
}
