use std::sync::Arc;
use std::time::Duration;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;
use agromart_api::{app, AppState, JobRunner};
use agromart_catalog::{Category, Product};
use agromart_offer::{MonitorConfig, OfferMonitor};
use agromart_store::{DryRunGateway, InMemoryCatalog, InMemoryUserDirectory};

struct Harness {
    app: Router,
    catalog: Arc<InMemoryCatalog>,
    gateway: Arc<DryRunGateway>,
}

async fn harness() -> Harness {
    let catalog = Arc::new(InMemoryCatalog::new());
    let users = Arc::new(InMemoryUserDirectory::new());
    users.add_customer(Uuid::new_v4(), "Lakshmi", "9876543210").await;
    users.add_customer(Uuid::new_v4(), "Imran", "+91 98765 43211").await;
    users.add_customer(Uuid::new_v4(), "Unreachable", "").await;
    let gateway = Arc::new(DryRunGateway::new());

    let monitor = OfferMonitor::new(
        catalog.clone(),
        users,
        gateway.clone(),
        MonitorConfig { send_interval: Duration::ZERO, ..MonitorConfig::default() },
    );
    let runner = Arc::new(JobRunner::new(Arc::new(monitor), None, Duration::from_secs(60)));

    Harness {
        app: app(AppState { runner, db: None }),
        catalog,
        gateway,
    }
}

fn product_with_offer(name: &str, percent: u8, ends_in: ChronoDuration) -> Product {
    let now = Utc::now();
    let mut product = Product::new(Uuid::new_v4(), name, Category::Fruits, 10_000, "kg");
    product
        .configure_offer(percent, now - ChronoDuration::days(1), now + ends_in)
        .unwrap();
    product
}

async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_health_reports_memory_store() {
    let h = harness().await;

    let (status, json) = send(&h.app, Method::GET, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["store"], "memory");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_manual_scan_warns_expiring_offer() {
    let h = harness().await;
    let product = product_with_offer("Strawberries", 20, ChronoDuration::minutes(30));
    let id = product.id;
    h.catalog.insert(product).await;

    let (status, json) = send(&h.app, Method::POST, "/admin/jobs/scan/run").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["products"], 1);
    assert_eq!(json["sent"], 2);
    assert_eq!(json["failed"], 0);
    assert!(h.catalog.get(id).await.unwrap().offer.warning_sent);

    let sent = h.gateway.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|m| m.body.contains("Strawberries") && m.body.contains("20%")));
    assert_eq!(sent[1].to, "+919876543211");

    // Idempotent on repeat
    let (_, json) = send(&h.app, Method::POST, "/admin/jobs/scan/run").await;
    assert_eq!(json["products"], 0);
    assert_eq!(h.gateway.sent().len(), 2);
}

#[tokio::test]
async fn test_manual_sweep_expires_lapsed_offer() {
    let h = harness().await;
    let product = product_with_offer("Papaya", 15, ChronoDuration::hours(-1));
    let id = product.id;
    h.catalog.insert(product).await;

    let (status, json) = send(&h.app, Method::POST, "/admin/jobs/sweep/run").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["expired"], 1);
    let swept = h.catalog.get(id).await.unwrap();
    assert!(swept.offer.expired);
    assert_eq!(swept.offer.discount_percent, 0);
    assert!(h.gateway.sent().is_empty());
}

#[tokio::test]
async fn test_unknown_job_is_404() {
    let h = harness().await;

    let (status, json) = send(&h.app, Method::POST, "/admin/jobs/reindex/run").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Unknown job: reindex");
}

#[tokio::test]
async fn test_job_board_tracks_runs() {
    let h = harness().await;

    let (_, before) = send(&h.app, Method::GET, "/admin/jobs").await;
    assert_eq!(before.as_array().unwrap().len(), 2);
    assert_eq!(before[0]["job"], "scan_and_warn");
    assert_eq!(before[0]["runs"], 0);
    assert!(before[0]["last_outcome"].is_null());

    send(&h.app, Method::POST, "/admin/jobs/sweep/run").await;

    let (status, after) = send(&h.app, Method::GET, "/admin/jobs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after[1]["job"], "sweep_expired");
    assert_eq!(after[1]["runs"], 1);
    assert_eq!(after[1]["running"], false);
    assert_eq!(after[1]["last_outcome"]["status"], "succeeded");
    assert_eq!(after[1]["last_outcome"]["report"]["expired"], 0);
}
