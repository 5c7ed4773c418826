//! Integration tests for catalog loading and admin mutations.

use std::sync::Arc;
use std::time::Duration;

use catalog::{CatalogEngine, CatalogFilter, CatalogStatus, NO_MATCHES_MESSAGE, StockLevel};
use chrono::Utc;
use common::{Money, ProductId, ProfileId, UserId};
use domain::models::ProductDraft;
use domain::{Backend, InMemorySessionStorage, Session, SessionStore};
use gateway::{ApiClient, InMemoryTransport, Method, Reply};
use serde_json::json;

struct TestHarness {
    transport: InMemoryTransport,
    session: Arc<SessionStore>,
    engine: CatalogEngine,
}

impl TestHarness {
    fn new() -> Self {
        let transport = InMemoryTransport::new();
        let session = Arc::new(SessionStore::open(Arc::new(InMemorySessionStorage::new())));
        let client = ApiClient::new(Arc::new(transport.clone()), session.clone())
            .with_default_timeout(Duration::from_millis(500));
        let backend = Backend::new(client);
        let engine = CatalogEngine::new(backend.products, session.clone());
        Self {
            transport,
            session,
            engine,
        }
    }

    fn sign_in(&self) {
        self.session
            .establish(Session {
                token: "tok".to_string(),
                user_id: UserId::new(7),
                profile_id: ProfileId::new(9),
                email: "a@b.com".to_string(),
                phone: None,
                expires_at: Utc::now() + chrono::Duration::hours(1),
            })
            .unwrap();
    }

    fn list_products(&self, ids: &[i64]) {
        let products: Vec<_> = ids
            .iter()
            .map(|id| {
                let brand = if id % 2 == 0 { "Even" } else { "Odd" };
                json!({
                    "id": id,
                    "name": format!("Product {id}"),
                    "brand": brand,
                    "category": "Gear",
                    "description": "Sturdy",
                    "price": 10.0
                })
            })
            .collect();
        self.transport
            .on(Method::Get, "/api/products", Reply::ok(json!(products)));
    }

    fn stock(&self, id: i64, reply: Reply) {
        self.transport
            .on(Method::Get, &format!("/api/products/{id}/stock"), reply);
    }
}

fn stock_body(id: i64, available: i64) -> Reply {
    Reply::ok(json!({ "productId": id, "availableQuantity": available }))
}

#[tokio::test(start_paused = true)]
async fn test_partial_stock_failure_keeps_every_product() {
    let h = TestHarness::new();
    h.list_products(&[1, 2, 3, 4]);
    h.stock(1, stock_body(1, 12));
    h.stock(2, Reply::error(500, "inventory down"));
    h.stock(3, stock_body(3, 0).delayed(Duration::from_secs(30)));
    h.stock(4, Reply::network_failure("connection reset"));

    let snapshot = h.engine.load().await.unwrap();

    let stock: Vec<Option<u32>> = snapshot.items.iter().map(|i| i.stock.available()).collect();
    assert_eq!(stock, vec![Some(12), None, None, None]);
    assert_eq!(snapshot.unknown_stock_count(), 3);
    assert_eq!(h.engine.status().await, CatalogStatus::Live);
    assert!(matches!(
        &snapshot.items[1].stock,
        StockLevel::Unknown { reason } if reason == "inventory down"
    ));
}

#[tokio::test]
async fn test_stock_queries_are_issued_per_product() {
    let h = TestHarness::new();
    h.list_products(&[1, 2, 3]);
    for id in 1..=3 {
        h.stock(id, stock_body(id, id * 10));
    }

    h.engine.load().await.unwrap();

    for id in 1..=3 {
        assert_eq!(
            h.transport
                .count(Method::Get, &format!("/api/products/{id}/stock")),
            1
        );
    }
}

#[tokio::test(start_paused = true)]
async fn test_stock_queries_run_concurrently() {
    let h = TestHarness::new();
    h.list_products(&[1, 2, 3]);
    for id in 1..=3 {
        h.stock(id, stock_body(id, 5).delayed(Duration::from_millis(400)));
    }

    let started = tokio::time::Instant::now();
    let snapshot = h.engine.load().await.unwrap();

    assert!(started.elapsed() < Duration::from_millis(800));
    assert_eq!(snapshot.unknown_stock_count(), 0);
}

#[tokio::test]
async fn test_base_list_failure_makes_catalog_unavailable() {
    let h = TestHarness::new();
    h.list_products(&[1]);
    h.stock(1, stock_body(1, 3));
    h.engine.load().await.unwrap();

    h.transport
        .on(Method::Get, "/api/products", Reply::error(503, "catalog down"));
    let err = h.engine.load().await.unwrap_err();

    assert_eq!(err.to_string(), "catalog down");
    assert_eq!(h.engine.status().await, CatalogStatus::Unavailable);
    let view = h.engine.filter(&CatalogFilter::new()).await;
    assert!(view.items.is_empty());
    assert_eq!(view.message, Some("Catalog is unavailable."));
}

#[tokio::test]
async fn test_filter_reports_no_matches() {
    let h = TestHarness::new();
    h.list_products(&[1, 2]);
    h.stock(1, stock_body(1, 1));
    h.stock(2, stock_body(2, 1));
    h.engine.load().await.unwrap();

    let view = h
        .engine
        .filter(&CatalogFilter::new().brand("Even").search("product 2"))
        .await;
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.total, 2);
    assert_eq!(view.message, None);

    let view = h.engine.filter(&CatalogFilter::new().brand("Nobody")).await;
    assert!(view.items.is_empty());
    assert_eq!(view.message, Some(NO_MATCHES_MESSAGE));

    let facets = h.engine.facets().await;
    assert_eq!(facets.brands, vec!["Even", "Odd"]);
    assert_eq!(facets.categories, vec!["Gear"]);
}

fn draft() -> ProductDraft {
    ProductDraft {
        name: "Lamp".to_string(),
        brand: "Glow".to_string(),
        description: "Desk lamp".to_string(),
        price: Money::from_cents(1999),
        category: "Home".to_string(),
        inventory: Some(4),
        inventory_delta: None,
    }
}

#[tokio::test]
async fn test_admin_mutation_requires_session() {
    let h = TestHarness::new();

    let err = h.engine.create_product(&draft()).await.unwrap_err();
    assert!(err.is_auth_required());
    assert!(h.engine.delete_product(ProductId::new(1)).await.is_err());
    assert_eq!(h.transport.request_count(), 0);
}

#[tokio::test]
async fn test_create_product_reloads_catalog() {
    let h = TestHarness::new();
    h.sign_in();
    h.list_products(&[1]);
    h.stock(1, stock_body(1, 4));
    h.transport.on(
        Method::Post,
        "/api/products",
        Reply::json(201, json!({ "id": 1, "name": "Lamp", "price": 19.99 })),
    );

    let created = h.engine.create_product(&draft()).await.unwrap();

    assert_eq!(created.id, ProductId::new(1));
    assert_eq!(h.transport.count(Method::Get, "/api/products"), 1);
    assert_eq!(h.engine.snapshot().await.items.len(), 1);
    let body = h
        .transport
        .last_request(Method::Post, "/api/products")
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(body["price"], 19.99);
    assert_eq!(body["inventory"], 4);
}

#[tokio::test]
async fn test_invalid_draft_is_rejected_locally() {
    let h = TestHarness::new();
    h.sign_in();
    let mut invalid = draft();
    invalid.name = String::new();

    let err = h.engine.update_product(ProductId::new(1), &invalid).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(h.transport.request_count(), 0);
}

#[tokio::test]
async fn test_delete_product_reloads_catalog() {
    let h = TestHarness::new();
    h.sign_in();
    h.list_products(&[]);
    h.transport
        .on(Method::Delete, "/api/products/3", Reply::empty(204));

    h.engine.delete_product(ProductId::new(3)).await.unwrap();

    assert_eq!(h.transport.count(Method::Get, "/api/products"), 1);
    assert!(h.engine.snapshot().await.items.is_empty());
}
