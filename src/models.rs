// models.rs - Order, order item and inventory types

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core_types::{Cents, INVENTORY_BASE_KEY, OrderId, ProductId};

/// Order status - the fixed lifecycle vocabulary of an order.
///
/// No transition graph is enforced: an owner may move an order from any
/// status to any other, including back to `open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Open,
    Confirmed,
    Shipped,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Open,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Case-insensitive parse. Surrounding whitespace is not trimmed.
    pub fn parse(raw: &str) -> Option<Self> {
        let lowered = raw.to_lowercase();
        Self::ALL.into_iter().find(|s| s.as_str() == lowered)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coerce a loosely typed JSON value into a number.
///
/// Accepts JSON numbers and numeric strings (surrounding whitespace allowed).
/// Everything else, including empty strings, yields `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Read an identifier that may arrive as a JSON string or number.
///
/// Strings are trimmed; empty strings and any other JSON type yield `None`.
pub fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerce a JSON value into whole minor units, defaulting to zero.
pub fn coerce_cents(value: Option<&Value>) -> Cents {
    value
        .and_then(coerce_number)
        .map(|n| n.round() as Cents)
        .unwrap_or(0)
}

/// Stock levels of a product, keyed by inventory key.
///
/// Always normalized: every entry is a whole, non-negative count and every
/// key is trimmed, with the empty key folded into [`INVENTORY_BASE_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inventory(BTreeMap<String, u64>);

impl Inventory {
    /// Normalize a raw `inventory` column value.
    ///
    /// Non-object input yields an empty map. Entries whose value is not a
    /// finite non-negative number are dropped; fractional counts are floored.
    pub fn from_value(raw: &Value) -> Self {
        let Value::Object(map) = raw else {
            return Self::default();
        };

        let mut levels = BTreeMap::new();
        for (key, value) in map {
            let Some(count) = coerce_number(value).filter(|n| *n >= 0.0) else {
                continue;
            };
            let key = match key.trim() {
                "" => INVENTORY_BASE_KEY,
                trimmed => trimmed,
            };
            levels.insert(key.to_string(), count.floor() as u64);
        }
        Self(levels)
    }

    pub fn get(&self, key: &str) -> Option<u64> {
        self.0.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decrement a tracked bucket, floored at zero.
    ///
    /// Returns the new level, or `None` when the key is untracked (the map is
    /// left untouched in that case).
    pub fn decrement(&mut self, key: &str, quantity: u64) -> Option<u64> {
        let level = self.0.get_mut(key)?;
        *level = level.saturating_sub(quantity);
        Some(*level)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), Value::from(*v)))
                .collect(),
        )
    }
}

impl<K: Into<String>> FromIterator<(K, u64)> for Inventory {
    fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Order header row as written on checkout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrder {
    pub customer_email: Option<String>,
    pub customer_name: Option<String>,
    pub status: OrderStatus,
    pub total_cents: Cents,
    pub currency: String,
    pub note: Option<String>,
    pub metadata: Value,
}

/// Order line as written on checkout; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub sku: Option<String>,
    pub name: Option<String>,
    pub quantity: u32,
    pub unit_price_cents: Cents,
    pub subtotal_cents: Cents,
    pub variants: Value,
    pub inventory_key: String,
}
