//! Payment method selection route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use treggio_core::PaymentMethodId;

use crate::db::PaymentMethodRepository;
use crate::error::AppError;
use crate::middleware::auth::RequireMerchant;
use crate::state::AppState;

/// Build the payment methods router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payment-methods", get(index).post(sync))
        .route(
            "/payment-methods/{id}",
            axum::routing::delete(remove),
        )
}

/// Available catalog plus the tenant's selected ids.
#[instrument(skip(merchant, state), fields(user_id = %merchant.id))]
pub async fn index(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let methods = PaymentMethodRepository::new(state.pool());
    let available = methods.list_available().await?;
    let selected = methods.selected_ids(merchant.id).await?;
    Ok(Json(json!({ "available": available, "selected": selected })))
}

/// Selection replacement request.
#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub methods: Vec<i32>,
}

/// Replace the tenant's selected payment methods.
#[instrument(skip(merchant, state, body), fields(user_id = %merchant.id))]
pub async fn sync(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Json(body): Json<SyncRequest>,
) -> Result<Json<Value>, AppError> {
    let ids: Vec<PaymentMethodId> = body.methods.iter().map(|&id| PaymentMethodId::new(id)).collect();

    let methods = PaymentMethodRepository::new(state.pool());
    let selected = methods
        .sync_selection(merchant.id, &ids)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::Conflict(msg) => AppError::BadRequest(msg),
            other => AppError::Database(other),
        })?;

    Ok(Json(json!({
        "message": "payment methods updated",
        "selected": selected,
    })))
}

/// Remove one method from the selection.
#[instrument(skip(merchant, state))]
pub async fn remove(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let methods = PaymentMethodRepository::new(state.pool());
    methods
        .remove_selection(merchant.id, PaymentMethodId::new(id))
        .await
        .map_err(|e| AppError::not_found_or(e, &format!("payment method {id}")))?;
    Ok(Json(json!({ "deleted": true })))
}
