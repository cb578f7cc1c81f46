//! Product Service - thin pass-through for catalogue mutations
//!
//! Column validity is left to the backing store; only the payload shape is
//! checked here.

use serde_json::Value;
use tracing::info;

use crate::error::ServiceError;
use crate::gateway::types::ApiResponse;
use crate::models::id_from_value;
use crate::store::CatalogueStore;

pub struct ProductService<'a> {
    store: &'a dyn CatalogueStore,
}

impl<'a> ProductService<'a> {
    pub fn new(store: &'a dyn CatalogueStore) -> Self {
        Self { store }
    }

    pub async fn insert(&self, data: Value) -> Result<ApiResponse, ServiceError> {
        let row = require_object(data)?;
        let stored = self.store.insert_product(row).await?;
        info!("[PRODUCT] Inserted {}", row_id(&stored));
        Ok(ApiResponse::data(stored))
    }

    pub async fn upsert(&self, data: Value) -> Result<ApiResponse, ServiceError> {
        let row = require_object(data)?;
        let stored = self.store.upsert_product(row).await?;
        info!("[PRODUCT] Upserted {}", row_id(&stored));
        Ok(ApiResponse::data(stored))
    }

    pub async fn delete(&self, data: &Value) -> Result<ApiResponse, ServiceError> {
        let id = data
            .get("id")
            .and_then(id_from_value)
            .ok_or_else(|| ServiceError::invalid("Missing product id."))?;
        self.store.delete_product(&id).await?;
        info!("[PRODUCT] Deleted {}", id);
        Ok(ApiResponse::success())
    }
}

fn require_object(data: Value) -> Result<Value, ServiceError> {
    match data {
        Value::Object(_) => Ok(data),
        _ => Err(ServiceError::invalid("Product data must be an object.")),
    }
}

fn row_id(row: &Value) -> String {
    row.get("id").and_then(id_from_value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_returns_stored_row() {
        let store = MemoryStore::new();
        let service = ProductService::new(&store);

        let response = service
            .insert(json!({"id": "tee", "name": "Tee", "price_cents": 1500}))
            .await
            .unwrap();
        assert_eq!(response.data.unwrap()["name"], json!("Tee"));
        assert!(store.product("tee").is_some());

        // duplicate key is a backend failure
        let err = service.insert(json!({"id": "tee"})).await.unwrap_err();
        assert!(err.is_server_error());
    }

    #[tokio::test]
    async fn test_upsert_then_delete() {
        let store = MemoryStore::new();
        let service = ProductService::new(&store);

        service.upsert(json!({"id": "mug", "name": "Mug"})).await.unwrap();
        let response = service
            .upsert(json!({"id": "mug", "name": "Big Mug"}))
            .await
            .unwrap();
        assert_eq!(response.data.unwrap()["name"], json!("Big Mug"));

        let response = service.delete(&json!({"id": "mug"})).await.unwrap();
        assert_eq!(response.success, Some(true));
        assert!(store.product("mug").is_none());
    }

    #[tokio::test]
    async fn test_shape_errors() {
        let store = MemoryStore::new();
        let service = ProductService::new(&store);

        assert_eq!(
            service.insert(json!([1, 2])).await.unwrap_err(),
            ServiceError::invalid("Product data must be an object.")
        );
        assert_eq!(
            service.upsert(Value::Null).await.unwrap_err(),
            ServiceError::invalid("Product data must be an object.")
        );
        assert_eq!(
            service.delete(&json!({})).await.unwrap_err(),
            ServiceError::invalid("Missing product id.")
        );
    }
}
