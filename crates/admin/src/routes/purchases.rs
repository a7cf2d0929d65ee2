//! Merchant order history route handlers.

use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::PurchaseRepository;
use crate::error::AppError;
use crate::middleware::auth::RequireMerchant;
use crate::state::AppState;

/// Build the purchases router.
pub fn router() -> Router<AppState> {
    Router::new().route("/purchases", get(index))
}

/// The tenant's received orders, newest first, items attached.
#[instrument(skip(merchant, state), fields(user_id = %merchant.id))]
pub async fn index(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let purchases = PurchaseRepository::new(state.pool());
    let items = purchases.list_for_user(merchant.id).await?;
    Ok(Json(json!({ "data": items })))
}
