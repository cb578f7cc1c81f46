//! In-process catalogue tables
//!
//! Used by the `memory` backend for local development and by the test
//! suites. Individual statements can be made to fail so the partial-failure
//! paths of order intake can be exercised without a database.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use super::{CatalogueStore, ORDERS_TABLE, StoreError};
use crate::core_types::OrderId;
use crate::models::{Inventory, NewOrder, NewOrderItem, OrderStatus};

/// Statements that can be forced to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    InsertOrder,
    InsertOrderItems,
    FetchInventory,
    WriteInventory,
    OwnerLookup,
    /// Orders tables behave as if they were never created
    MissingOrderTables,
}

#[derive(Default)]
struct Failures {
    insert_order: AtomicBool,
    insert_order_items: AtomicBool,
    fetch_inventory: AtomicBool,
    write_inventory: AtomicBool,
    owner_lookup: AtomicBool,
    missing_order_tables: AtomicBool,
}

impl Failures {
    fn flag(&self, point: FailPoint) -> &AtomicBool {
        match point {
            FailPoint::InsertOrder => &self.insert_order,
            FailPoint::InsertOrderItems => &self.insert_order_items,
            FailPoint::FetchInventory => &self.fetch_inventory,
            FailPoint::WriteInventory => &self.write_inventory,
            FailPoint::OwnerLookup => &self.owner_lookup,
            FailPoint::MissingOrderTables => &self.missing_order_tables,
        }
    }

    fn check(&self, point: FailPoint) -> Result<(), StoreError> {
        if !self.flag(point).load(Ordering::SeqCst) {
            return Ok(());
        }
        Err(match point {
            FailPoint::MissingOrderTables => StoreError::MissingTable {
                message: format!("relation \"{}\" does not exist", ORDERS_TABLE),
            },
            other => StoreError::Backend {
                status: Some(500),
                code: None,
                message: format!("injected failure: {:?}", other),
            },
        })
    }
}

struct StoredOrder {
    id: OrderId,
    created_at: DateTime<Utc>,
    header: NewOrder,
    items: Vec<NewOrderItem>,
}

impl StoredOrder {
    fn to_json(&self) -> Value {
        let mut row = match serde_json::to_value(&self.header) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        row.insert("id".into(), json!(self.id));
        row.insert("created_at".into(), json!(self.created_at.to_rfc3339()));
        let items: Vec<Value> = self
            .items
            .iter()
            .map(|item| serde_json::to_value(item).unwrap_or(Value::Null))
            .collect();
        row.insert("order_items".into(), Value::Array(items));
        Value::Object(row)
    }
}

#[derive(Default)]
struct Tables {
    products: BTreeMap<String, Map<String, Value>>,
    orders: Vec<StoredOrder>,
    owners: HashSet<String>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failures: Failures,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failure(&self, point: FailPoint, fail: bool) {
        self.failures.flag(point).store(fail, Ordering::SeqCst);
    }

    pub fn add_owner(&self, user_id: impl Into<String>) {
        self.lock().owners.insert(user_id.into());
    }

    /// Insert or replace a product row directly, bypassing failure injection.
    pub fn put_product(&self, row: Value) -> Result<Value, StoreError> {
        let (id, map) = row_with_id(row)?;
        let stored = Value::Object(map.clone());
        self.lock().products.insert(id, map);
        Ok(stored)
    }

    pub fn product(&self, id: &str) -> Option<Value> {
        self.lock().products.get(id).cloned().map(Value::Object)
    }

    pub fn order(&self, id: &str) -> Option<Value> {
        self.lock()
            .orders
            .iter()
            .find(|o| o.id == id)
            .map(StoredOrder::to_json)
    }

    pub fn order_count(&self) -> usize {
        self.lock().orders.len()
    }

    pub fn order_items(&self, order_id: &str) -> Vec<NewOrderItem> {
        self.lock()
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .map(|o| o.items.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        // Poisoning is ignored: every mutation is a single insert or replace.
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Validate a product payload and return its id (generated when absent).
fn row_with_id(row: Value) -> Result<(String, Map<String, Value>), StoreError> {
    let Value::Object(mut map) = row else {
        return Err(StoreError::Backend {
            status: Some(400),
            code: None,
            message: "product row must be a JSON object".to_string(),
        });
    };
    let id = match map.get("id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => {
            let id = Uuid::new_v4().to_string();
            map.insert("id".into(), json!(id));
            id
        }
    };
    map.entry("inventory").or_insert_with(|| json!({}));
    Ok((id, map))
}

#[async_trait]
impl CatalogueStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_product(&self, row: Value) -> Result<Value, StoreError> {
        let (id, map) = row_with_id(row)?;
        let mut tables = self.lock();
        if tables.products.contains_key(&id) {
            return Err(StoreError::Backend {
                status: Some(409),
                code: Some("23505".into()),
                message: "duplicate key value violates unique constraint \"products_pkey\""
                    .to_string(),
            });
        }
        tables.products.insert(id, map.clone());
        Ok(Value::Object(map))
    }

    async fn upsert_product(&self, row: Value) -> Result<Value, StoreError> {
        let (id, map) = row_with_id(row)?;
        let mut tables = self.lock();
        let merged = match tables.products.remove(&id) {
            Some(mut existing) => {
                existing.extend(map);
                existing
            }
            None => map,
        };
        tables.products.insert(id, merged.clone());
        Ok(Value::Object(merged))
    }

    async fn delete_product(&self, id: &str) -> Result<(), StoreError> {
        self.lock().products.remove(id);
        Ok(())
    }

    async fn fetch_inventory(&self, product_id: &str) -> Result<Value, StoreError> {
        self.failures.check(FailPoint::FetchInventory)?;
        self.lock()
            .products
            .get(product_id)
            .map(|row| row.get("inventory").cloned().unwrap_or(Value::Null))
            .ok_or_else(|| StoreError::NotFound(format!("product {}", product_id)))
    }

    async fn write_inventory(
        &self,
        product_id: &str,
        inventory: &Inventory,
    ) -> Result<(), StoreError> {
        self.failures.check(FailPoint::WriteInventory)?;
        if let Some(row) = self.lock().products.get_mut(product_id) {
            row.insert("inventory".into(), inventory.to_value());
        }
        Ok(())
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<OrderId, StoreError> {
        self.failures.check(FailPoint::MissingOrderTables)?;
        self.failures.check(FailPoint::InsertOrder)?;
        let id = Uuid::new_v4().to_string();
        self.lock().orders.push(StoredOrder {
            id: id.clone(),
            created_at: Utc::now(),
            header: order.clone(),
            items: Vec::new(),
        });
        Ok(id)
    }

    async fn insert_order_items(&self, items: &[NewOrderItem]) -> Result<(), StoreError> {
        self.failures.check(FailPoint::MissingOrderTables)?;
        self.failures.check(FailPoint::InsertOrderItems)?;
        let mut tables = self.lock();
        // Validate the whole batch first so it lands all-or-nothing.
        for item in items {
            if !tables.orders.iter().any(|o| o.id == item.order_id) {
                return Err(StoreError::Backend {
                    status: Some(409),
                    code: Some("23503".into()),
                    message: format!(
                        "insert on table \"order_items\" violates foreign key constraint: order {} missing",
                        item.order_id
                    ),
                });
            }
        }
        for item in items {
            if let Some(order) = tables.orders.iter_mut().find(|o| o.id == item.order_id) {
                order.items.push(item.clone());
            }
        }
        Ok(())
    }

    async fn list_orders(&self) -> Result<Vec<Value>, StoreError> {
        self.failures.check(FailPoint::MissingOrderTables)?;
        // Insertion order breaks created_at ties.
        Ok(self
            .lock()
            .orders
            .iter()
            .rev()
            .map(StoredOrder::to_json)
            .collect())
    }

    async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Option<Value>, StoreError> {
        self.failures.check(FailPoint::MissingOrderTables)?;
        let mut tables = self.lock();
        Ok(tables.orders.iter_mut().find(|o| o.id == id).map(|order| {
            order.header.status = status;
            order.to_json()
        }))
    }

    async fn is_owner(&self, user_id: &str) -> Result<bool, StoreError> {
        self.failures.check(FailPoint::OwnerLookup)?;
        Ok(self.lock().owners.contains(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> NewOrder {
        NewOrder {
            customer_email: Some("a@example.com".into()),
            customer_name: None,
            status: OrderStatus::Open,
            total_cents: 1000,
            currency: "GBP".into(),
            note: None,
            metadata: json!({}),
        }
    }

    #[tokio::test]
    async fn test_insert_product_generates_id_and_rejects_duplicates() {
        let store = MemoryStore::new();
        let row = store.insert_product(json!({"name": "Mug"})).await.unwrap();
        let id = row["id"].as_str().unwrap().to_string();
        assert_eq!(row["inventory"], json!({}));

        let dup = store.insert_product(json!({"id": id, "name": "Mug"})).await;
        assert!(matches!(dup, Err(StoreError::Backend { .. })));
    }

    #[tokio::test]
    async fn test_upsert_merges_columns() {
        let store = MemoryStore::new();
        store
            .put_product(json!({"id": "p1", "name": "Mug", "price_cents": 900}))
            .unwrap();
        let row = store
            .upsert_product(json!({"id": "p1", "price_cents": 1200}))
            .await
            .unwrap();
        assert_eq!(row["name"], "Mug");
        assert_eq!(row["price_cents"], 1200);
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let store = MemoryStore::new();
        let first = store.insert_order(&order()).await.unwrap();
        let second = store.insert_order(&order()).await.unwrap();
        let listed = store.list_orders().await.unwrap();
        assert_eq!(listed[0]["id"], json!(second));
        assert_eq!(listed[1]["id"], json!(first));
        assert_eq!(listed[0]["order_items"], json!([]));
    }

    #[tokio::test]
    async fn test_item_batch_for_unknown_order_is_rejected_whole() {
        let store = MemoryStore::new();
        let id = store.insert_order(&order()).await.unwrap();
        let item = |order_id: &str| NewOrderItem {
            order_id: order_id.to_string(),
            product_id: "p1".into(),
            sku: None,
            name: None,
            quantity: 1,
            unit_price_cents: 100,
            subtotal_cents: 100,
            variants: json!({}),
            inventory_key: "__base__".into(),
        };
        let result = store
            .insert_order_items(&[item(&id), item("missing")])
            .await;
        assert!(result.is_err());
        assert!(store.order_items(&id).is_empty());
    }

    #[tokio::test]
    async fn test_missing_tables_failpoint() {
        let store = MemoryStore::new();
        store.set_failure(FailPoint::MissingOrderTables, true);
        let err = store.list_orders().await.unwrap_err();
        assert!(err.is_missing_table());
    }
}
