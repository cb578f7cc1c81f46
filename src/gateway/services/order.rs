//! Order Service - checkout intake, status changes and owner listing
//!
//! Checkout is a fixed sequence of single-statement writes:
//!
//! 1. order header (fatal on failure)
//! 2. order items as one batch (fatal on failure, header stays committed)
//! 3. per-item inventory decrement (advisory: failures are logged and skipped)
//!
//! No step is rolled back when a later one fails.

use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::core_types::OrderId;
use crate::error::ServiceError;
use crate::gateway::types::{
    ApiResponse, LineItem, missing_orders_meta, parse_checkout, parse_status_change,
};
use crate::models::{Inventory, NewOrderItem};
use crate::store::CatalogueStore;

/// What happened to the inventory of one kept line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryEffect {
    /// Tracked bucket decremented to the contained level
    Adjusted(u64),
    /// Product has no bucket for the line's inventory key
    Untracked,
    /// Read or write failed; the line was skipped
    Failed,
}

/// Result of a checkout, for logging and tests. Only `order_id` is returned
/// to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeOutcome {
    pub order_id: OrderId,
    pub items_persisted: usize,
    pub adjusted: usize,
    pub untracked: usize,
    pub failed: usize,
}

impl IntakeOutcome {
    fn record(&mut self, effect: InventoryEffect) {
        match effect {
            InventoryEffect::Adjusted(_) => self.adjusted += 1,
            InventoryEffect::Untracked => self.untracked += 1,
            InventoryEffect::Failed => self.failed += 1,
        }
    }
}

/// Order Service - handles all order-related business logic
pub struct OrderService<'a> {
    store: &'a dyn CatalogueStore,
}

impl<'a> OrderService<'a> {
    pub fn new(store: &'a dyn CatalogueStore) -> Self {
        Self { store }
    }

    /// Anonymous checkout.
    pub async fn create_order(&self, data: &Value) -> Result<IntakeOutcome, ServiceError> {
        let checkout = parse_checkout(data);

        // 1. Header
        let order_id = self.store.insert_order(&checkout.order).await?;
        let mut outcome = IntakeOutcome {
            order_id: order_id.clone(),
            ..IntakeOutcome::default()
        };

        // 2. Items, one batch
        if !checkout.items.is_empty() {
            let rows: Vec<NewOrderItem> = checkout
                .items
                .iter()
                .cloned()
                .map(|item| item.into_new_item(&order_id))
                .collect();
            if let Err(e) = self.store.insert_order_items(&rows).await {
                error!(
                    "[ORDER] Items insert failed for order {} ({} lines); header remains: {}",
                    order_id,
                    rows.len(),
                    e
                );
                return Err(e.into());
            }
            outcome.items_persisted = rows.len();
        }

        // 3. Inventory, best-effort per line
        for item in &checkout.items {
            let effect = self.adjust_inventory(&order_id, item).await;
            outcome.record(effect);
        }

        info!(
            order_id = %outcome.order_id,
            items = outcome.items_persisted,
            adjusted = outcome.adjusted,
            untracked = outcome.untracked,
            failed = outcome.failed,
            total_cents = checkout.order.total_cents,
            "[ORDER] Checkout accepted"
        );
        Ok(outcome)
    }

    async fn adjust_inventory(&self, order_id: &str, item: &LineItem) -> InventoryEffect {
        let raw = match self.store.fetch_inventory(&item.product_id).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    "[INVENTORY] Read failed for product {} (order {}): {}",
                    item.product_id, order_id, e
                );
                return InventoryEffect::Failed;
            }
        };

        let mut inventory = Inventory::from_value(&raw);
        let Some(level) = inventory.decrement(&item.inventory_key, u64::from(item.quantity))
        else {
            return InventoryEffect::Untracked;
        };

        match self.store.write_inventory(&item.product_id, &inventory).await {
            Ok(()) => InventoryEffect::Adjusted(level),
            Err(e) => {
                warn!(
                    "[INVENTORY] Write failed for product {} key {} (order {}): {}",
                    item.product_id, item.inventory_key, order_id, e
                );
                InventoryEffect::Failed
            }
        }
    }

    /// Owner status change; any status may follow any other.
    pub async fn update_status(&self, data: &Value) -> Result<ApiResponse, ServiceError> {
        let change = parse_status_change(data)?;
        let updated = self
            .store
            .update_order_status(&change.order_id, change.status)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Order \"{}\" not found.", change.order_id))
            })?;

        info!("[ORDER] Order {} -> {}", change.order_id, change.status);
        Ok(ApiResponse::with_meta(
            updated,
            json!({ "status": change.status.as_str() }),
        ))
    }

    /// Owner listing. Missing order tables yield an empty list with a
    /// diagnostic instead of an error.
    pub async fn list_orders(&self) -> Result<ApiResponse, ServiceError> {
        match self.store.list_orders().await {
            Ok(orders) => Ok(ApiResponse::data(Value::Array(orders))),
            Err(e) if e.is_missing_table() => {
                warn!("[ORDER] Order tables missing, returning empty list: {}", e);
                Ok(ApiResponse::with_meta(
                    json!([]),
                    missing_orders_meta(&e.to_string()),
                ))
            }
            Err(e) => Err(e.into()),
        }
    }
}
