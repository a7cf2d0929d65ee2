//! Public checkout intake.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use treggio_core::UserId;

use crate::db::CheckoutRepository;
use crate::db::purchases::CheckoutInput;
use crate::db::RepositoryError;
use crate::error::AppError;
use crate::state::AppState;

const MAX_FIELD_LENGTH: usize = 255;

/// Checkout request from the storefront frontend.
#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    /// The store receiving the order.
    pub user_id: i32,
    pub items: Vec<PurchaseItemRequest>,
    pub buyer_name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub payment_method: Option<String>,
    pub comment: Option<String>,
}

/// One requested line item.
#[derive(Debug, Deserialize)]
pub struct PurchaseItemRequest {
    pub product_id: i32,
    pub quantity: i32,
}

fn validate_field(name: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{name} is required")));
    }
    if value.len() > MAX_FIELD_LENGTH {
        return Err(AppError::BadRequest(format!(
            "{name} must be at most {MAX_FIELD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// `POST /purchases` - record an order against a store.
///
/// Line prices and the total are computed from the store's product rows and
/// shipping configuration, not taken from the client.
#[instrument(skip(state, body), fields(store_id = body.user_id, items = body.items.len()))]
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<PurchaseRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    validate_field("buyer_name", &body.buyer_name)?;
    validate_field("address", &body.address)?;
    validate_field("city", &body.city)?;
    validate_field("phone", &body.phone)?;

    if body.items.is_empty() {
        return Err(AppError::BadRequest("items cannot be empty".to_string()));
    }
    if body.items.iter().any(|item| item.quantity < 1) {
        return Err(AppError::BadRequest(
            "item quantities must be at least 1".to_string(),
        ));
    }

    let items: Vec<(i32, i32)> = body
        .items
        .iter()
        .map(|item| (item.product_id, item.quantity))
        .collect();

    let checkout = CheckoutRepository::new(state.pool());
    let receipt = checkout
        .create(&CheckoutInput {
            store_id: UserId::new(body.user_id),
            buyer_name: body.buyer_name.trim(),
            address: body.address.trim(),
            city: body.city.trim(),
            phone: body.phone.trim(),
            payment_method: body.payment_method.as_deref(),
            comment: body.comment.as_deref(),
            items: &items,
        })
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::BadRequest("unknown product in order".to_string())
            }
            other => AppError::Database(other),
        })?;

    tracing::info!(purchase_id = receipt.id, "Purchase recorded");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "purchase recorded", "data": receipt })),
    ))
}
