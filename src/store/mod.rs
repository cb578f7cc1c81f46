//! Catalogue store abstraction
//!
//! The service never talks to a database directly; every read and write goes
//! through [`CatalogueStore`]. Each method is a single statement against the
//! backend, so atomicity never spans two calls.
//!
//! Implementations:
//! - [`RestStore`]: hosted PostgREST-style API (service role key)
//! - [`PgStore`]: direct PostgreSQL connection via sqlx
//! - [`MemoryStore`]: in-process tables for local development and tests

pub mod error;
pub mod memory;
pub mod postgres;
pub mod rest;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use rest::RestStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::core_types::OrderId;
use crate::models::{Inventory, NewOrder, NewOrderItem, OrderStatus};

pub const PRODUCTS_TABLE: &str = "products";
pub const ORDERS_TABLE: &str = "orders";
pub const ORDER_ITEMS_TABLE: &str = "order_items";
pub const OWNER_USERS_TABLE: &str = "owner_users";

#[async_trait]
pub trait CatalogueStore: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Cheap round trip proving the backend is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;

    // ------------------------------------------------------------------
    // products
    // ------------------------------------------------------------------

    /// Insert one product row and return it as stored.
    async fn insert_product(&self, row: Value) -> Result<Value, StoreError>;

    /// Insert or replace a product keyed by `id` and return the stored row.
    async fn upsert_product(&self, row: Value) -> Result<Value, StoreError>;

    /// Delete a product by id. Deleting a missing id is not an error.
    async fn delete_product(&self, id: &str) -> Result<(), StoreError>;

    /// Raw `inventory` column of one product.
    ///
    /// Fails with [`StoreError::NotFound`] when the product does not exist.
    async fn fetch_inventory(&self, product_id: &str) -> Result<Value, StoreError>;

    /// Overwrite the `inventory` column of one product.
    async fn write_inventory(&self, product_id: &str, inventory: &Inventory)
    -> Result<(), StoreError>;

    // ------------------------------------------------------------------
    // orders
    // ------------------------------------------------------------------

    /// Insert an order header and return its generated id.
    async fn insert_order(&self, order: &NewOrder) -> Result<OrderId, StoreError>;

    /// Insert all lines of one order as a single batch statement.
    async fn insert_order_items(&self, items: &[NewOrderItem]) -> Result<(), StoreError>;

    /// All orders with nested `order_items`, newest first.
    async fn list_orders(&self) -> Result<Vec<Value>, StoreError>;

    /// Set the status of one order; `None` when no row has that id.
    async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Option<Value>, StoreError>;

    // ------------------------------------------------------------------
    // owner allowlist
    // ------------------------------------------------------------------

    async fn is_owner(&self, user_id: &str) -> Result<bool, StoreError>;
}
