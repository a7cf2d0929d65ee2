//! Integration tests for the public storefront API.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The storefront server running (cargo run -p treggio-storefront)
//!
//! Run with: cargo test -p treggio-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use treggio_integration_tests::{client, storefront_base_url, unique_suffix};

#[tokio::test]
#[ignore = "requires running storefront server and database"]
async fn health_endpoints_respond() {
    let base = storefront_base_url();
    let http = client();

    let resp = http
        .get(format!("{base}/health"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = http
        .get(format!("{base}/health/ready"))
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires running storefront server and database"]
async fn unknown_store_slug_is_404() {
    let base = storefront_base_url();
    let missing = format!("no-such-store-{}", unique_suffix());

    for path in [
        format!("/tienda/{missing}"),
        format!("/usuario/{missing}"),
        format!("/productos/{missing}"),
        format!("/public/user/{missing}/font"),
    ] {
        let resp = client()
            .get(format!("{base}{path}"))
            .send()
            .await
            .expect("request failed");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "path {path}");
    }
}

#[tokio::test]
#[ignore = "requires running storefront server and database"]
async fn purchase_requires_items_and_buyer_fields() {
    let base = storefront_base_url();

    let resp = client()
        .post(format!("{base}/purchases"))
        .json(&json!({
            "user_id": 1,
            "items": [],
            "buyer_name": "Ana",
            "address": "Calle 1",
            "city": "Cali",
            "phone": "300",
        }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("invalid json");
    assert!(body["error"].as_str().unwrap_or_default().contains("items"));
}
