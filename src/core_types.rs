//! Core types used throughout the system
//!
//! Identifiers are kept as strings: the hosted backend hands out UUIDs for
//! orders and users, while product ids are whatever the owner chose when
//! creating the catalogue row (slugs, UUIDs or numbers).

/// Product ID - primary key of the `products` table, compared as text.
pub type ProductId = String;

/// Order ID - primary key of the `orders` table.
pub type OrderId = String;

/// User ID - identity resolved from a bearer token by the auth service.
pub type UserId = String;

/// Amount of money in minor currency units (pence, cents).
pub type Cents = i64;

/// Currency used when an order does not specify one.
pub const DEFAULT_CURRENCY: &str = "GBP";

/// Inventory bucket used by products without variants.
pub const INVENTORY_BASE_KEY: &str = "__base__";
