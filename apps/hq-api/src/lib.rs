//! # Harbor HQ API
//!
//! HTTP/JSON server for store terminals and the head-office dashboard.
//!
//! ## Routes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           HQ API Routes                                 │
//! │                                                                         │
//! │  Terminals (write)                    Dashboard (read)                  │
//! │  ─────────────────                    ────────────────                  │
//! │  POST /api/orders                     GET /api/reports/daily-sales      │
//! │  POST /api/inventory/check            GET /api/reports/payment-mix      │
//! │  POST /api/sync/upload                GET /api/reports/store-ranking    │
//! │                                       GET /api/dashboard/hq-summary     │
//! │  Terminals (read)                     GET /api/sync/status              │
//! │  ────────────────                                                       │
//! │  GET /api/products                    Ops                               │
//! │  GET /api/products/by-qr/{code}       GET /api/health                   │
//! │                                                                         │
//! │  anything else ──► 404 {"ok":false,"error":"NOT_FOUND"}                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `HTTP_HOST` / `HTTP_PORT` - bind address (default: 0.0.0.0:8080)
//! - `DATABASE_PATH` - SQLite file (default: ./data/harbor.db)
//! - `DB_MAX_CONNECTIONS` - pool size (default: 8)
//! - `DB_CONNECT_TIMEOUT_SECS` - pool acquire timeout (default: 30)
//! - `DOCUMENT_NUMBER_ATTEMPTS` - order/check number retries (default: 5)

pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use harbor_db::Database;

// Re-exports
pub use config::{ConfigError, HqConfig};
pub use error::{ApiError, ApiOk, ApiResult, Envelope};

/// Shared application state.
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Arc<Self> {
        Arc::new(AppState { db })
    }
}

/// Builds the full router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health::health_check))
        // Terminal endpoints
        .route("/api/orders", post(handlers::orders::create_order))
        .route("/api/inventory/check", post(handlers::inventory::submit_check))
        .route("/api/sync/upload", post(handlers::sync::upload))
        .route("/api/products", get(handlers::products::list))
        .route("/api/products/by-qr/{code}", get(handlers::products::by_code))
        // Dashboard endpoints
        .route("/api/reports/daily-sales", get(handlers::reports::daily_sales))
        .route("/api/reports/payment-mix", get(handlers::reports::payment_mix))
        .route("/api/reports/store-ranking", get(handlers::reports::store_ranking))
        .route("/api/dashboard/hq-summary", get(handlers::reports::hq_summary))
        .route("/api/sync/status", get(handlers::sync::status))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound("NOT_FOUND".to_string())
}

// =============================================================================
// Router Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use harbor_core::{Money, NewProduct};
    use harbor_db::DbConfig;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct Seeded {
        app: Router,
        db: Database,
        product_id: i64,
    }

    /// Store 1 with CASH, one product (QR-1, 2.50) and `qty` on hand.
    async fn seeded(qty: f64) -> Seeded {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let catalog = db.catalog();
        let store_id = catalog.insert_store(1, "S001", "Headquarters").await.unwrap();
        catalog.insert_payment_method(1, "CASH", "Cash").await.unwrap();
        let product_id = catalog
            .insert_product(&NewProduct {
                company_id: 1,
                sku: "BEV-0001".to_string(),
                qr_code: Some("QR-1".to_string()),
                barcode: Some("4710000000001".to_string()),
                name: "Oolong Tea 500ml".to_string(),
                price: Money::from_amount(2.5),
                cost: Money::from_amount(1.0),
            })
            .await
            .unwrap();
        db.inventory()
            .initialize(1, store_id, product_id, qty, 5.0)
            .await
            .unwrap();

        Seeded {
            app: router(AppState::new(db.clone())),
            db,
            product_id,
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(app, request).await
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    #[tokio::test]
    async fn test_health() {
        let s = seeded(0.0).await;
        let (status, body) = get_json(&s.app, "/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["data"]["database"], "ok");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let s = seeded(0.0).await;
        let (status, body) = get_json(&s.app, "/api/nope").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"ok": false, "error": "NOT_FOUND"}));
    }

    #[tokio::test]
    async fn test_sell_then_oversell() {
        let s = seeded(5.0).await;
        let order = json!({
            "store_id": 1,
            "cashier_user_id": 0,
            "items": [{"product_id": s.product_id, "qty": 3}],
            "payment": {"method_code": "CASH"}
        });

        let (status, body) = post_json(&s.app, "/api/orders", order.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["data"]["total"], "7.50");
        assert!(body["data"]["order_no"].as_str().unwrap().starts_with("SO"));

        let (_, product) = get_json(&s.app, "/api/products/by-qr/QR-1").await;
        assert_eq!(product["data"]["qty_on_hand"], 2.0);

        let (status, body) = post_json(&s.app, "/api/orders", order).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["error"],
            format!("INSUFFICIENT_STOCK:{}", s.product_id)
        );

        assert_eq!(s.db.orders().count_for_store(1).await.unwrap(), 1);
        assert_eq!(
            s.db.inventory().quantity_on_hand(1, s.product_id).await.unwrap(),
            Some(2.0)
        );
    }

    #[tokio::test]
    async fn test_order_validation() {
        let s = seeded(5.0).await;

        let (status, body) = post_json(&s.app, "/api/orders", json!({"items": []})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "ITEMS_REQUIRED");

        let bad = json!({"items": [{"product_id": s.product_id, "qty": 0}]});
        let (status, body) = post_json(&s.app, "/api/orders", bad).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "INVALID_ITEM");

        let unknown_method = json!({
            "items": [{"product_id": s.product_id, "qty": 1}],
            "payment": {"method_code": "BITCOIN"}
        });
        let (status, body) = post_json(&s.app, "/api/orders", unknown_method).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "PAYMENT_METHOD_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let s = seeded(5.0).await;
        let request = Request::builder()
            .method("POST")
            .uri("/api/orders")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = send(&s.app, request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_inventory_check() {
        let s = seeded(10.0).await;
        let check = json!({
            "items": [{"product_id": s.product_id, "counted_qty": 7}]
        });

        let (status, body) = post_json(&s.app, "/api/inventory/check", check).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["check_no"].as_str().unwrap().starts_with("CHK"));
        assert!(body["data"].get("adjusted_lines").is_none());

        assert_eq!(
            s.db.inventory().quantity_on_hand(1, s.product_id).await.unwrap(),
            Some(7.0)
        );

        let missing = json!({"items": [{"product_id": 999, "counted_qty": 1}]});
        let (status, body) = post_json(&s.app, "/api/inventory/check", missing).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "INVENTORY_NOT_FOUND:999");
    }

    #[tokio::test]
    async fn test_sync_upload_idempotent() {
        let s = seeded(0.0).await;
        let upload = json!({
            "source_store_id": 2,
            "idempotency_key": "b-001",
            "payload": {"orders": [1, 2]}
        });

        let (status, body) = post_json(&s.app, "/api/sync/upload", upload.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "received");

        let (_, body) = post_json(&s.app, "/api/sync/upload", upload).await;
        assert_eq!(body["data"]["status"], "duplicate");
        assert_eq!(body["data"]["idempotency_key"], "b-001");

        let record = s.db.sync_ingest().get("b-001").await.unwrap().unwrap();
        assert_eq!(record.sync_type, "order_batch");
        assert_eq!(record.payload_json, r#"{"orders":[1,2]}"#);

        let (status, body) = post_json(&s.app, "/api/sync/upload", json!({"idempotency_key": "x"})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "source_store_id_and_idempotency_key_required");

        let (status, body) = get_json(&s.app, "/api/sync/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["by_store"][0]["upload_count"], 1);
    }

    #[tokio::test]
    async fn test_product_lookup_miss() {
        let s = seeded(0.0).await;
        let (status, body) = get_json(&s.app, "/api/products/by-qr/NOPE").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "PRODUCT_NOT_FOUND");

        let (status, body) = get_json(&s.app, "/api/products?store_id=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reports_after_sale() {
        let s = seeded(5.0).await;
        let order = json!({"items": [{"product_id": s.product_id, "qty": 2}]});
        let (status, _) = post_json(&s.app, "/api/orders", order).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get_json(&s.app, "/api/reports/daily-sales").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["total_sales"], "5.00");

        let (_, body) = get_json(&s.app, "/api/reports/payment-mix?store_id=0").await;
        assert_eq!(body["data"][0]["method_code"], "CASH");

        let (_, body) = get_json(&s.app, "/api/reports/store-ranking").await;
        assert_eq!(body["data"][0]["order_count"], 1);

        let (_, body) = get_json(&s.app, "/api/dashboard/hq-summary").await;
        assert_eq!(body["data"]["order_count"], 1);
        assert_eq!(body["data"]["total_sales"], "5.00");

        let (status, body) = get_json(&s.app, "/api/reports/daily-sales?from=yesterday").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "INVALID_REQUEST");
    }
}
