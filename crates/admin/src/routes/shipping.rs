//! Shipping option route handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::ShippingRepository;
use crate::error::AppError;
use crate::middleware::auth::RequireMerchant;
use crate::state::AppState;

/// Build the shipping router.
pub fn router() -> Router<AppState> {
    Router::new().route("/shipping", get(show).put(update))
}

/// The tenant's shipping configuration (free shipping by default).
#[instrument(skip(merchant, state), fields(user_id = %merchant.id))]
pub async fn show(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let shipping = ShippingRepository::new(state.pool());
    let option = shipping.get_or_default(merchant.id).await?;
    Ok(Json(json!({
        "is_free": option.is_free,
        "shipping_rate": option.rate,
    })))
}

/// Shipping update request.
#[derive(Debug, Deserialize)]
pub struct ShippingRequest {
    pub is_free: bool,
    pub shipping_rate: Option<Decimal>,
}

/// Update the tenant's shipping configuration.
#[instrument(skip(merchant, state, body), fields(user_id = %merchant.id))]
pub async fn update(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Json(body): Json<ShippingRequest>,
) -> Result<Json<Value>, AppError> {
    let rate = body.shipping_rate.unwrap_or(Decimal::ZERO);
    if rate < Decimal::ZERO {
        return Err(AppError::BadRequest(
            "shipping rate cannot be negative".to_string(),
        ));
    }

    let shipping = ShippingRepository::new(state.pool());
    let option = shipping.upsert(merchant.id, body.is_free, rate).await?;
    Ok(Json(json!({
        "is_free": option.is_free,
        "shipping_rate": option.rate,
    })))
}
