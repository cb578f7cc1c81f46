//! Hosted REST backend
//!
//! Talks to a PostgREST-style API (`{project_url}/rest/v1/{table}`) with the
//! service role key, which bypasses row-level security. Filters use the
//! PostgREST query grammar (`id=eq.<value>`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde_json::{Value, json};
use tracing::debug;

use super::{
    CatalogueStore, ORDER_ITEMS_TABLE, ORDERS_TABLE, OWNER_USERS_TABLE, PRODUCTS_TABLE,
    StoreError,
};
use crate::core_types::OrderId;
use crate::models::{Inventory, NewOrder, NewOrderItem, OrderStatus, id_from_value};

const RETURN_REPRESENTATION: &str = "return=representation";
const RETURN_MINIMAL: &str = "return=minimal";
const UPSERT_PREFER: &str = "resolution=merge-duplicates,return=representation";
const ORDER_WITH_ITEMS: &str = "*,order_items(*)";

pub struct RestStore {
    client: reqwest::Client,
    rest_url: String,
    service_key: String,
}

impl RestStore {
    pub fn new(project_url: &str, service_key: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, project_url, service_key))
    }

    pub fn with_client(client: reqwest::Client, project_url: &str, service_key: &str) -> Self {
        Self {
            client,
            rest_url: format!("{}/rest/v1", project_url.trim_end_matches('/')),
            service_key: service_key.to_string(),
        }
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url, table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, StoreError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        debug!("REST backend returned {}: {}", status, body);
        Err(StoreError::from_postgrest(status.as_u16(), &body))
    }

    async fn rows(&self, builder: RequestBuilder) -> Result<Vec<Value>, StoreError> {
        let response = self.send(builder).await?;
        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| StoreError::Decode(format!("expected a JSON array of rows: {}", e)))
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

fn first_row(rows: Vec<Value>, what: &str) -> Result<Value, StoreError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| StoreError::Decode(format!("{} returned no rows", what)))
}

#[async_trait]
impl CatalogueStore for RestStore {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        let request = self
            .request(Method::GET, PRODUCTS_TABLE)
            .query(&[("select", "id"), ("limit", "1")]);
        self.send(request).await.map(|_| ())
    }

    async fn insert_product(&self, row: Value) -> Result<Value, StoreError> {
        let request = self
            .request(Method::POST, PRODUCTS_TABLE)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&[row]);
        first_row(self.rows(request).await?, "product insert")
    }

    async fn upsert_product(&self, row: Value) -> Result<Value, StoreError> {
        let request = self
            .request(Method::POST, PRODUCTS_TABLE)
            .query(&[("on_conflict", "id")])
            .header("Prefer", UPSERT_PREFER)
            .json(&[row]);
        first_row(self.rows(request).await?, "product upsert")
    }

    async fn delete_product(&self, id: &str) -> Result<(), StoreError> {
        let request = self
            .request(Method::DELETE, PRODUCTS_TABLE)
            .query(&[("id", eq(id))])
            .header("Prefer", RETURN_MINIMAL);
        self.send(request).await.map(|_| ())
    }

    async fn fetch_inventory(&self, product_id: &str) -> Result<Value, StoreError> {
        let request = self
            .request(Method::GET, PRODUCTS_TABLE)
            .query(&[("select", "inventory".to_string()), ("id", eq(product_id))]);
        let mut row = self
            .rows(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(format!("product {}", product_id)))?;
        Ok(row
            .get_mut("inventory")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    async fn write_inventory(
        &self,
        product_id: &str,
        inventory: &Inventory,
    ) -> Result<(), StoreError> {
        let request = self
            .request(Method::PATCH, PRODUCTS_TABLE)
            .query(&[("id", eq(product_id))])
            .header("Prefer", RETURN_MINIMAL)
            .json(&json!({ "inventory": inventory }));
        self.send(request).await.map(|_| ())
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<OrderId, StoreError> {
        let request = self
            .request(Method::POST, ORDERS_TABLE)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&[order]);
        let row = first_row(self.rows(request).await?, "order insert")?;
        row.get("id")
            .and_then(id_from_value)
            .ok_or_else(|| StoreError::Decode("order insert returned a row without id".into()))
    }

    async fn insert_order_items(&self, items: &[NewOrderItem]) -> Result<(), StoreError> {
        let request = self
            .request(Method::POST, ORDER_ITEMS_TABLE)
            .header("Prefer", RETURN_MINIMAL)
            .json(items);
        self.send(request).await.map(|_| ())
    }

    async fn list_orders(&self) -> Result<Vec<Value>, StoreError> {
        let request = self
            .request(Method::GET, ORDERS_TABLE)
            .query(&[("select", ORDER_WITH_ITEMS), ("order", "created_at.desc")]);
        self.rows(request).await
    }

    async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Option<Value>, StoreError> {
        let request = self
            .request(Method::PATCH, ORDERS_TABLE)
            .query(&[("id", eq(id)), ("select", ORDER_WITH_ITEMS.to_string())])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&json!({ "status": status }));
        Ok(self.rows(request).await?.into_iter().next())
    }

    async fn is_owner(&self, user_id: &str) -> Result<bool, StoreError> {
        let request = self
            .request(Method::GET, OWNER_USERS_TABLE)
            .query(&[("select", "user_id".to_string()), ("user_id", eq(user_id))]);
        Ok(!self.rows(request).await?.is_empty())
    }
}
