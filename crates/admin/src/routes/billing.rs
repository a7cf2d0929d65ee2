//! Billing route handlers: plans, paid checkout, and the gateway webhook.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use treggio_core::PlanId;

use crate::db::PlanRepository;
use crate::error::AppError;
use crate::gateway::{WebhookNotification, signature};
use crate::middleware::auth::RequireMerchant;
use crate::services::AuthService;
use crate::services::billing::WebhookOutcome;
use crate::state::AppState;

/// Build the public billing router (mounted under `/auth`).
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_plans))
        .route("/checkout", post(checkout))
        .route("/webhook", post(webhook))
        .route("/plan", post(change_plan))
        .route("/payment/success", get(payment_success))
        .route("/payment/failure", get(payment_failure))
        .route("/payment/pending", get(payment_pending))
}

/// Public plan catalog.
#[instrument(skip(state))]
pub async fn list_plans(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let plans = PlanRepository::new(state.pool()).list().await?;
    Ok(Json(json!({ "plans": plans })))
}

/// Paid registration request: registration data plus the chosen plan.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub name: String,
    pub surname: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub store_name: String,
    pub plan_id: i32,
}

/// Stage a paid registration and return the gateway checkout URL.
///
/// No database row is written here; the account is created when the
/// gateway confirms the preapproval via webhook.
#[instrument(skip(state, body), fields(email = %body.email, plan_id = body.plan_id))]
pub async fn checkout(
    State(state): State<AppState>,
    Json(body): Json<CheckoutRequest>,
) -> Result<Json<Value>, AppError> {
    let auth = AuthService::new(state.pool());
    let data = auth
        .validate_registration(
            &body.name,
            &body.surname,
            &body.phone,
            &body.email,
            &body.password,
            &body.store_name,
        )
        .await?;

    let init_point = state
        .billing()
        .begin_paid_registration(data, PlanId::new(body.plan_id))
        .await?;

    Ok(Json(json!({ "init_point": init_point })))
}

/// Gateway webhook endpoint.
///
/// Always answers 200 for events we processed or deliberately ignored so
/// the gateway stops retrying; 400 is reserved for malformed payloads and
/// bad signatures.
#[instrument(skip(state, headers, body))]
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let notification: WebhookNotification = serde_json::from_str(&body)
        .map_err(|e| AppError::BadRequest(format!("malformed webhook payload: {e}")))?;

    // Verify the signature when a webhook secret is configured.
    if let Some(secret) = &state.config().gateway.webhook_secret {
        use secrecy::ExposeSecret;

        let signature_header = headers
            .get("x-signature")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::BadRequest("missing x-signature header".to_string()))?;
        let request_id = headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        signature::verify_webhook_signature(
            secret.expose_secret(),
            signature_header,
            &notification.data.id,
            request_id,
        )
        .map_err(|_| AppError::BadRequest("invalid webhook signature".to_string()))?;
    }

    if notification.event_type != "subscription_preapproval" {
        tracing::debug!(
            event_type = %notification.event_type,
            "Acknowledging unhandled webhook event type"
        );
        return Ok((StatusCode::OK, Json(json!({ "status": "ignored" }))));
    }

    let outcome = state
        .billing()
        .process_preapproval_event(&notification.data.id)
        .await?;

    let status = match &outcome {
        WebhookOutcome::Activated { user_id } => json!({ "status": "activated", "user_id": user_id }),
        WebhookOutcome::PlanChanged { user_id } => {
            json!({ "status": "plan_changed", "user_id": user_id })
        }
        WebhookOutcome::Downgraded { user_id } => {
            json!({ "status": "downgraded", "user_id": user_id })
        }
        WebhookOutcome::AlreadyProcessed => json!({ "status": "already_processed" }),
        WebhookOutcome::StagingMissing => json!({ "status": "staging_missing" }),
        WebhookOutcome::Ignored => json!({ "status": "ignored" }),
    };

    Ok((StatusCode::OK, Json(status)))
}

/// Plan change request for a logged-in merchant.
#[derive(Debug, Deserialize)]
pub struct PlanChangeRequest {
    pub plan_id: i32,
}

/// Switch plans: paid targets return a checkout URL, the free plan applies
/// immediately.
#[instrument(skip(merchant, state, body), fields(user_id = %merchant.id))]
pub async fn change_plan(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Json(body): Json<PlanChangeRequest>,
) -> Result<Json<Value>, AppError> {
    let init_point = state
        .billing()
        .begin_plan_change(merchant.id, PlanId::new(body.plan_id))
        .await?;

    Ok(Json(match init_point {
        Some(url) => json!({ "init_point": url }),
        None => json!({ "changed": true }),
    }))
}

/// Browser return URL after a successful checkout.
pub async fn payment_success() -> Json<Value> {
    Json(json!({ "status": "success" }))
}

/// Browser return URL after a failed checkout.
pub async fn payment_failure() -> Json<Value> {
    Json(json!({ "status": "failure" }))
}

/// Browser return URL while the gateway is still processing.
pub async fn payment_pending() -> Json<Value> {
    Json(json!({ "status": "pending" }))
}
