//! End-to-end tests of the catalogue endpoint against the in-memory backend.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use storefront_gateway::auth::StaticVerifier;
use storefront_gateway::gateway::{FUNCTION_ALIAS_ROUTE, build_router, state::AppState};
use storefront_gateway::store::memory::FailPoint;
use storefront_gateway::store::{CatalogueStore, MemoryStore};

const ROUTE: &str = "/api/catalogue";
const OWNER_TOKEN: &str = "owner-token";
const CUSTOMER_TOKEN: &str = "customer-token";

struct Harness {
    store: Arc<MemoryStore>,
    app: Router,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    store.add_owner("owner-1");
    let verifier = StaticVerifier::default()
        .with_token(OWNER_TOKEN, "owner-1")
        .with_token(CUSTOMER_TOKEN, "customer-1");

    let state = AppState::new(store.clone() as Arc<dyn CatalogueStore>, Arc::new(verifier));
    let app = build_router(Arc::new(state), ROUTE);
    Harness { store, app }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post(body: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(ROUTE)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn call(app: &Router, action: Value, token: Option<&str>) -> (StatusCode, Value) {
    send(app, post(&action.to_string(), token)).await
}

async fn create_order(h: &Harness, data: Value) -> String {
    let (status, body) = call(
        &h.app,
        json!({"action": "createOrder", "data": data}),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "body: {}", body);
    body["data"]["id"].as_str().unwrap().to_string()
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_checkout_is_public_and_filters_items() {
    let h = harness();
    let id = create_order(
        &h,
        json!({
            "customer": {"email": "a@example.com", "name": "Ada"},
            "items": [
                {"product_id": "p1", "quantity": 2, "subtotal_cents": 600},
                {"product_id": "", "quantity": 1, "subtotal_cents": 100},
                {"product_id": "p2", "quantity": 0, "subtotal_cents": 100},
                {"product_id": "p3", "quantity": 1, "subtotal_cents": 400}
            ]
        }),
    )
    .await;

    let items = h.store.order_items(&id);
    let products: Vec<&str> = items.iter().map(|i| i.product_id.as_str()).collect();
    assert_eq!(products, vec!["p1", "p3"]);

    let order = h.store.order(&id).unwrap();
    assert_eq!(order["status"], json!("open"));
    assert_eq!(order["total_cents"], json!(1000));
    assert_eq!(order["currency"], json!("GBP"));
    assert_eq!(order["customer_email"], json!("a@example.com"));
}

#[tokio::test]
async fn test_checkout_supplied_subtotal_wins() {
    let h = harness();
    let id = create_order(
        &h,
        json!({
            "subtotal_cents": 1500,
            "items": [{"product_id": "p1", "quantity": 1, "subtotal_cents": 300}]
        }),
    )
    .await;
    assert_eq!(h.store.order(&id).unwrap()["total_cents"], json!(1500));
}

#[tokio::test]
async fn test_checkout_adjusts_inventory() {
    let h = harness();
    h.store
        .put_product(json!({"id": "tee", "inventory": {"__base__": 5, "size:L": 5, "size:M": 2}}))
        .unwrap();

    create_order(
        &h,
        json!({"items": [
            {"product_id": "tee", "quantity": 2},
            {"product_id": "tee", "quantity": 9, "inventory_key": "size:L"},
            {"product_id": "tee", "quantity": 1, "inventory_key": "size:XL"}
        ]}),
    )
    .await;

    assert_eq!(
        h.store.product("tee").unwrap()["inventory"],
        json!({"__base__": 3, "size:L": 0, "size:M": 2})
    );
}

#[tokio::test]
async fn test_inventory_failure_does_not_change_response() {
    let h = harness();
    h.store
        .put_product(json!({"id": "tee", "inventory": {"__base__": 5}}))
        .unwrap();
    h.store.set_failure(FailPoint::FetchInventory, true);

    let id = create_order(&h, json!({"items": [{"product_id": "tee", "quantity": 2}]})).await;

    assert_eq!(h.store.order_items(&id).len(), 1);
    assert_eq!(
        h.store.product("tee").unwrap()["inventory"],
        json!({"__base__": 5})
    );
}

#[tokio::test]
async fn test_items_failure_reports_error_and_keeps_header() {
    let h = harness();
    h.store.set_failure(FailPoint::InsertOrderItems, true);

    let (status, body) = call(
        &h.app,
        json!({"action": "createOrder", "data": {"items": [{"product_id": "p1", "quantity": 1}]}}),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("injected failure"));
    assert_eq!(h.store.order_count(), 1);
}

// ============================================================================
// Owner gate
// ============================================================================

#[tokio::test]
async fn test_privileged_actions_need_owner() {
    let h = harness();
    for action in ["insert", "upsert", "delete", "listOrders", "updateOrderStatus"] {
        let (status, body) = call(&h.app, json!({"action": action, "data": {}}), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", action);
        assert_eq!(body["error"], json!("Missing Authorization bearer token."));

        let (status, _) = call(&h.app, json!({"action": action}), Some("bogus")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", action);

        let (status, body) =
            call(&h.app, json!({"action": action}), Some(CUSTOMER_TOKEN)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", action);
        assert_eq!(body["error"], json!("Not authorized."));
    }
}

#[tokio::test]
async fn test_owner_lookup_failure_is_unauthorized() {
    let h = harness();
    h.store.set_failure(FailPoint::OwnerLookup, true);
    let (status, _) = call(&h.app, json!({"action": "listOrders"}), Some(OWNER_TOKEN)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_product_mutations() {
    let h = harness();

    let (status, body) = call(
        &h.app,
        json!({"action": "insert", "data": {"id": "mug", "name": "Mug", "price_cents": 900}}),
        Some(OWNER_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], json!("Mug"));

    let (status, body) = call(
        &h.app,
        json!({"action": "upsert", "data": {"id": "mug", "price_cents": 1100}}),
        Some(OWNER_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["price_cents"], json!(1100));

    let (status, body) = call(
        &h.app,
        json!({"action": "delete", "data": {"id": "mug"}}),
        Some(OWNER_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));
    assert!(h.store.product("mug").is_none());
}

// ============================================================================
// Order management
// ============================================================================

#[tokio::test]
async fn test_update_status() {
    let h = harness();
    let id = create_order(&h, json!({})).await;

    let (status, body) = call(
        &h.app,
        json!({"action": "updateOrderStatus", "data": {"id": id, "status": "CONFIRMED"}}),
        Some(OWNER_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], json!("confirmed"));
    assert_eq!(body["meta"]["status"], json!("confirmed"));

    let (status, body) = call(
        &h.app,
        json!({"action": "updateOrderStatus", "data": {"id": id, "status": "archived"}}),
        Some(OWNER_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Unsupported status \"archived\"."));
    assert_eq!(h.store.order(&id).unwrap()["status"], json!("confirmed"));

    let (status, body) = call(
        &h.app,
        json!({"action": "updateOrderStatus", "data": {"id": "missing", "status": "open"}}),
        Some(OWNER_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Order \"missing\" not found."));
}

#[tokio::test]
async fn test_list_orders_newest_first_with_items() {
    let h = harness();
    let first = create_order(&h, json!({"items": [{"product_id": "p1", "quantity": 1}]})).await;
    let second = create_order(&h, json!({})).await;

    let (status, body) = call(&h.app, json!({"action": "listOrders"}), Some(OWNER_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    let orders = body["data"].as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["id"], json!(second));
    assert_eq!(orders[1]["id"], json!(first));
    assert_eq!(orders[1]["order_items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_orders_missing_table() {
    let h = harness();
    h.store.set_failure(FailPoint::MissingOrderTables, true);

    let (status, body) = call(&h.app, json!({"action": "listOrders"}), Some(OWNER_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["meta"]["missingOrdersTable"], json!(true));
    assert!(body["meta"]["message"].is_string());
}

// ============================================================================
// Request shape and HTTP surface
// ============================================================================

#[tokio::test]
async fn test_bad_bodies() {
    let h = harness();

    let (status, body) = send(&h.app, post("{oops", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Request body must be valid JSON."));

    let (status, body) = send(&h.app, post("", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Missing action."));

    let (status, body) = call(&h.app, json!({"action": "truncate"}), Some(OWNER_TOKEN)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Unsupported action \"truncate\"."));
}

#[tokio::test]
async fn test_preflight_and_cors_headers() {
    let h = harness();
    let request = Request::builder()
        .method("OPTIONS")
        .uri(ROUTE)
        .body(Body::empty())
        .unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST,OPTIONS");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "Content-Type, Authorization"
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.is_empty());

    // error responses carry CORS headers too
    let response = h.app.clone().oneshot(post("{oops", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_function_alias_route() {
    let h = harness();
    let request = Request::builder()
        .method("POST")
        .uri(FUNCTION_ALIAS_ROUTE)
        .body(Body::from(json!({"action": "createOrder"}).to_string()))
        .unwrap();
    let (status, body) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["id"].is_string());
}

#[tokio::test]
async fn test_health() {
    let h = harness();
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["timestamp_ms"].as_i64().unwrap() > 0);
}
