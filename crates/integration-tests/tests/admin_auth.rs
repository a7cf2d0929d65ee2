//! Integration tests for merchant registration and login.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The admin server running (cargo run -p treggio-admin)
//!
//! Run with: cargo test -p treggio-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use treggio_integration_tests::{admin_base_url, client, unique_suffix};

fn registration_body(suffix: &str) -> Value {
    json!({
        "name": "Rosa",
        "surname": "Mendez",
        "phone": "+57 300 000 0000",
        "email": format!("rosa+{suffix}@example.com"),
        "password": "correct-horse-battery",
        "store_name": format!("Flores Rosa {suffix}"),
    })
}

#[tokio::test]
#[ignore = "requires running admin server and database"]
async fn register_creates_account_and_store_url() {
    let base = admin_base_url();
    let suffix = unique_suffix();

    let resp = client()
        .post(format!("{base}/auth/register"))
        .json(&registration_body(&suffix))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("invalid json");
    let store_url = body["store_url"].as_str().expect("missing store_url");
    assert!(store_url.contains("flores-rosa"));
}

#[tokio::test]
#[ignore = "requires running admin server and database"]
async fn register_rejects_duplicate_email() {
    let base = admin_base_url();
    let suffix = unique_suffix();
    let http = client();

    let first = http
        .post(format!("{base}/auth/register"))
        .json(&registration_body(&suffix))
        .send()
        .await
        .expect("request failed");
    assert_eq!(first.status(), StatusCode::CREATED);

    // Same email, different store name.
    let mut body = registration_body(&suffix);
    body["store_name"] = json!(format!("Otra Tienda {suffix}"));
    let second = http
        .post(format!("{base}/auth/register"))
        .json(&body)
        .send()
        .await
        .expect("request failed");

    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "requires running admin server and database"]
async fn login_rejects_unverified_account() {
    let base = admin_base_url();
    let suffix = unique_suffix();
    let http = client();

    let body = registration_body(&suffix);
    http.post(format!("{base}/auth/register"))
        .json(&body)
        .send()
        .await
        .expect("request failed");

    // The account exists but the verification email was never confirmed.
    let resp = http
        .post(format!("{base}/auth/login"))
        .json(&json!({
            "email": body["email"],
            "password": body["password"],
        }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires running admin server and database"]
async fn protected_routes_require_session() {
    let base = admin_base_url();

    for path in ["/admin/products", "/admin/limits", "/admin/purchases"] {
        let resp = client()
            .get(format!("{base}{path}"))
            .send()
            .await
            .expect("request failed");
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "path {path}");
    }
}
