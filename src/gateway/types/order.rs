//! Checkout and order-status request types
//!
//! The storefront UI posts loosely typed JSON (numbers as strings, missing
//! fields, stray items). Parsing here is deliberately lenient; items that
//! cannot become a valid order line are dropped, never rejected.

use serde_json::{Map, Value, json};

use crate::core_types::{Cents, DEFAULT_CURRENCY, INVENTORY_BASE_KEY, OrderId, ProductId};
use crate::error::ServiceError;
use crate::models::{
    NewOrder, NewOrderItem, OrderStatus, coerce_cents, coerce_number, id_from_value,
};

// ============================================================================
// Checkout (createOrder)
// ============================================================================

/// Largest quantity the `order_items.quantity` INTEGER column can hold.
const MAX_LINE_QUANTITY: f64 = i32::MAX as f64;

/// One kept order line, before it is tied to an order id.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub product_id: ProductId,
    pub sku: Option<String>,
    pub name: Option<String>,
    pub quantity: u32,
    pub unit_price_cents: Cents,
    pub subtotal_cents: Cents,
    pub variants: Value,
    pub inventory_key: String,
}

impl LineItem {
    /// Parse one submitted item. `None` when it has no product reference or
    /// no positive whole quantity.
    pub fn from_value(raw: &Value) -> Option<Self> {
        let item = raw.as_object()?;
        let product_id = item.get("product_id").and_then(id_from_value)?;

        let quantity = item
            .get("quantity")
            .and_then(coerce_number)
            .map(f64::trunc)
            .filter(|q| *q >= 1.0)?;

        Some(Self {
            product_id,
            sku: text_field(item, "sku"),
            name: text_field(item, "name"),
            quantity: quantity.min(MAX_LINE_QUANTITY) as u32,
            unit_price_cents: coerce_cents(item.get("unit_price_cents")),
            subtotal_cents: coerce_cents(item.get("subtotal_cents")),
            variants: match item.get("variants") {
                Some(v @ Value::Object(_)) => v.clone(),
                _ => json!({}),
            },
            inventory_key: text_field(item, "inventory_key")
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .unwrap_or_else(|| INVENTORY_BASE_KEY.to_string()),
        })
    }

    pub fn into_new_item(self, order_id: &str) -> NewOrderItem {
        NewOrderItem {
            order_id: order_id.to_string(),
            product_id: self.product_id,
            sku: self.sku,
            name: self.name,
            quantity: self.quantity,
            unit_price_cents: self.unit_price_cents,
            subtotal_cents: self.subtotal_cents,
            variants: self.variants,
            inventory_key: self.inventory_key,
        }
    }
}

/// A checkout payload after filtering and normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkout {
    pub order: NewOrder,
    pub items: Vec<LineItem>,
}

/// Keep only items with a product reference and a positive quantity.
pub fn filter_line_items(items: Option<&Value>) -> Vec<LineItem> {
    match items {
        Some(Value::Array(raw)) => raw.iter().filter_map(LineItem::from_value).collect(),
        _ => Vec::new(),
    }
}

/// Caller-supplied subtotal wins (rounded, floored at zero); otherwise the
/// kept items' subtotals are summed. Unit price × quantity is never checked.
pub fn order_total(subtotal: Option<&Value>, items: &[LineItem]) -> Cents {
    match subtotal.and_then(Value::as_f64).filter(|n| n.is_finite()) {
        Some(n) => n.round().max(0.0) as Cents,
        None => items
            .iter()
            .fold(0, |acc: Cents, i| acc.saturating_add(i.subtotal_cents)),
    }
}

/// Build the order header and kept lines from a `createOrder` payload.
///
/// Never fails: a non-object payload is an empty checkout.
pub fn parse_checkout(data: &Value) -> Checkout {
    let empty = Map::new();
    let payload = data.as_object().unwrap_or(&empty);
    let customer = payload.get("customer").and_then(Value::as_object);

    let items = filter_line_items(payload.get("items"));
    let total_cents = order_total(payload.get("subtotal_cents"), &items);

    let currency = payload
        .get("currency")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_uppercase)
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    let order = NewOrder {
        customer_email: text_field(payload, "customer_email")
            .or_else(|| customer.and_then(|c| text_field(c, "email"))),
        customer_name: text_field(payload, "customer_name")
            .or_else(|| customer.and_then(|c| text_field(c, "name"))),
        status: OrderStatus::Open,
        total_cents,
        currency,
        note: text_field(payload, "notes"),
        metadata: match payload.get("metadata") {
            Some(v @ Value::Object(_)) => v.clone(),
            _ => json!({}),
        },
    };

    Checkout { order, items }
}

/// Non-empty string (or number rendered as text) field.
fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ============================================================================
// updateOrderStatus
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub order_id: OrderId,
    pub status: OrderStatus,
}

/// Validate `{ id, status }`. Status is matched case-insensitively against
/// the fixed vocabulary.
pub fn parse_status_change(data: &Value) -> Result<StatusChange, ServiceError> {
    let order_id = data.get("id").and_then(id_from_value);
    let raw_status = data.get("status").and_then(status_text);

    let (Some(order_id), Some(raw_status)) = (order_id, raw_status) else {
        return Err(ServiceError::invalid("Missing order id or status."));
    };

    let status = OrderStatus::parse(&raw_status).ok_or_else(|| {
        ServiceError::invalid(format!("Unsupported status \"{}\".", raw_status))
    })?;

    Ok(StatusChange { order_id, status })
}

/// Status as submitted, rendered as text. Empty, `null`, `false` and `0`
/// count as absent.
fn status_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}
