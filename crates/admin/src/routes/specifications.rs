//! Product specification route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use treggio_core::{AttributeId, ProductId, PropertyId, SpecificationId};

use crate::db::SpecificationRepository;
use crate::error::AppError;
use crate::middleware::auth::RequireMerchant;
use crate::state::AppState;

/// Build the specifications router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/specifications", post(create))
        .route("/specifications/{id}", delete(destroy))
        .route("/products/{id}/specifications", get(for_product))
}

/// Specifications of a product.
#[instrument(skip(merchant, state))]
pub async fn for_product(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let specifications = SpecificationRepository::new(state.pool());
    let items = specifications
        .list_for_product(merchant.id, ProductId::new(id))
        .await?;
    Ok(Json(json!({ "specifications": items })))
}

/// Specification creation request.
#[derive(Debug, Deserialize)]
pub struct SpecificationRequest {
    pub product_id: i32,
    pub attribute_id: i32,
    pub property_id: i32,
}

/// Add a specification to a product.
#[instrument(skip(merchant, state, body), fields(user_id = %merchant.id))]
pub async fn create(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Json(body): Json<SpecificationRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let specifications = SpecificationRepository::new(state.pool());
    let specification = specifications
        .create(
            merchant.id,
            ProductId::new(body.product_id),
            AttributeId::new(body.attribute_id),
            PropertyId::new(body.property_id),
        )
        .await
        .map_err(|e| AppError::not_found_or(e, &format!("product {}", body.product_id)))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "specification": specification })),
    ))
}

/// Remove a specification.
#[instrument(skip(merchant, state))]
pub async fn destroy(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let specifications = SpecificationRepository::new(state.pool());
    specifications
        .delete(merchant.id, SpecificationId::new(id))
        .await
        .map_err(|e| AppError::not_found_or(e, &format!("specification {id}")))?;
    Ok(Json(json!({ "deleted": true })))
}
