//! Catalogue request parsing
//!
//! Body shape: `{ "action": string, "data"?: any }`. The action name is
//! resolved to a closed [`Action`] enum before any backend work starts.

use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::ServiceError;

/// Catalogue request body (documentation shape; parsing goes through
/// [`parse_body`] so that shape errors map to precise messages).
#[derive(Debug, Deserialize, ToSchema)]
pub struct CatalogueRequest {
    /// One of `insert`, `upsert`, `delete`, `listOrders`,
    /// `updateOrderStatus`, `createOrder`
    #[schema(example = "createOrder")]
    pub action: String,
    /// Action payload
    #[schema(value_type = Object)]
    pub data: Option<Value>,
}

/// One variant per supported action, carrying the raw `data` payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Insert(Value),
    Upsert(Value),
    Delete(Value),
    ListOrders,
    UpdateOrderStatus(Value),
    CreateOrder(Value),
}

impl Action {
    pub const NAMES: [&'static str; 6] = [
        "insert",
        "upsert",
        "delete",
        "listOrders",
        "updateOrderStatus",
        "createOrder",
    ];

    /// Resolve an action name. Names are case-sensitive.
    pub fn parse(name: &str, data: Value) -> Result<Self, ServiceError> {
        match name {
            "insert" => Ok(Action::Insert(data)),
            "upsert" => Ok(Action::Upsert(data)),
            "delete" => Ok(Action::Delete(data)),
            "listOrders" => Ok(Action::ListOrders),
            "updateOrderStatus" => Ok(Action::UpdateOrderStatus(data)),
            "createOrder" => Ok(Action::CreateOrder(data)),
            other => Err(ServiceError::invalid(format!(
                "Unsupported action \"{}\".",
                other
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Insert(_) => "insert",
            Action::Upsert(_) => "upsert",
            Action::Delete(_) => "delete",
            Action::ListOrders => "listOrders",
            Action::UpdateOrderStatus(_) => "updateOrderStatus",
            Action::CreateOrder(_) => "createOrder",
        }
    }

    /// Whether the owner gate applies. Checkout is public.
    pub fn requires_owner(&self) -> bool {
        match self {
            Action::Insert(_)
            | Action::Upsert(_)
            | Action::Delete(_)
            | Action::ListOrders
            | Action::UpdateOrderStatus(_) => true,
            Action::CreateOrder(_) => false,
        }
    }
}

/// Parse the raw request body into an [`Action`].
///
/// An empty body is treated as `{}` and therefore fails with
/// "Missing action.".
pub fn parse_body(body: &[u8]) -> Result<Action, ServiceError> {
    let is_blank = body.iter().all(u8::is_ascii_whitespace);
    let parsed: Value = if is_blank {
        Value::Object(Default::default())
    } else {
        serde_json::from_slice(body)
            .map_err(|_| ServiceError::invalid("Request body must be valid JSON."))?
    };

    let Value::Object(mut fields) = parsed else {
        return Err(ServiceError::invalid("Missing action."));
    };

    let name = match fields.get("action") {
        Some(Value::String(name)) if !name.is_empty() => name.clone(),
        _ => return Err(ServiceError::invalid("Missing action.")),
    };
    let data = fields.remove("data").unwrap_or(Value::Null);

    Action::parse(&name, data)
}
