//! Integration tests for the billing webhook endpoint.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The admin server running (cargo run -p treggio-admin)
//!
//! When `MP_WEBHOOK_SECRET` is set on the server, the signed-notification
//! tests also need the same value exported in this process.
//!
//! Run with: cargo test -p treggio-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::json;

use treggio_admin::gateway::signature::compute_signature;
use treggio_integration_tests::{admin_base_url, client};

#[tokio::test]
#[ignore = "requires running admin server and database"]
async fn webhook_rejects_malformed_payload() {
    let base = admin_base_url();

    let resp = client()
        .post(format!("{base}/auth/webhook"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires running admin server with MP_WEBHOOK_SECRET set"]
async fn webhook_rejects_bad_signature() {
    let base = admin_base_url();

    let resp = client()
        .post(format!("{base}/auth/webhook"))
        .header("x-signature", "ts=1700000000,v1=deadbeef")
        .header("x-request-id", "test-request")
        .json(&json!({
            "type": "subscription_preapproval",
            "data": { "id": "pre_does_not_exist" },
        }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires running admin server with MP_WEBHOOK_SECRET set"]
async fn webhook_acknowledges_unhandled_event_types() {
    let base = admin_base_url();
    let secret = std::env::var("MP_WEBHOOK_SECRET").expect("MP_WEBHOOK_SECRET not set");

    let ts = "1700000000";
    let request_id = "test-request";
    let data_id = "payment_123";
    let signature = compute_signature(&secret, data_id, request_id, ts);

    // Payment events are acknowledged without processing.
    let resp = client()
        .post(format!("{base}/auth/webhook"))
        .header("x-signature", format!("ts={ts},v1={signature}"))
        .header("x-request-id", request_id)
        .json(&json!({
            "type": "payment",
            "data": { "id": data_id },
        }))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.expect("invalid json");
    assert_eq!(body["status"], "ignored");
}
