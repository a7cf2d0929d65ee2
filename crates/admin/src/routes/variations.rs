//! Product variation route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use treggio_core::{AttributeId, ProductId, PropertyId, VariationId};

use crate::db::{AttributeRepository, VariationRepository};
use crate::db::variations::VariationInput;
use crate::error::AppError;
use crate::middleware::auth::RequireMerchant;
use crate::state::AppState;

/// Build the variations router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/variations/config", get(config))
        .route("/variations", post(create))
        .route("/variations/{id}", put(update).delete(destroy))
        .route("/variations/{id}/children", get(children))
        .route("/products/{id}/variations", get(for_product))
}

/// Attributes (with properties) available for variations.
#[instrument(skip(merchant, state))]
pub async fn config(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let attributes = AttributeRepository::new(state.pool());
    let items = attributes.list_active(merchant.id).await?;
    Ok(Json(json!({ "attributes": items })))
}

/// Top-level variations of a product.
#[instrument(skip(merchant, state))]
pub async fn for_product(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let variations = VariationRepository::new(state.pool());
    let items = variations
        .list_for_product(merchant.id, ProductId::new(id))
        .await?;
    Ok(Json(json!({ "variations": items })))
}

/// Nested variations under a parent variation.
#[instrument(skip(merchant, state))]
pub async fn children(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let variations = VariationRepository::new(state.pool());
    let items = variations
        .list_children(merchant.id, VariationId::new(id))
        .await?;
    Ok(Json(json!({ "variations": items })))
}

/// Variation creation request.
#[derive(Debug, Deserialize)]
pub struct VariationRequest {
    pub product_id: i32,
    /// Parent variation for nested variations (e.g. Color -> Size).
    pub parent_id: Option<i32>,
    pub attribute_id: i32,
    pub property_id: i32,
    #[serde(default)]
    pub add_price: Decimal,
    #[serde(default)]
    pub stock: i32,
}

/// Create a variation.
#[instrument(skip(merchant, state, body), fields(user_id = %merchant.id))]
pub async fn create(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Json(body): Json<VariationRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let variations = VariationRepository::new(state.pool());
    let variation = variations
        .create(
            merchant.id,
            VariationInput {
                product_id: ProductId::new(body.product_id),
                parent_id: body.parent_id.map(VariationId::new),
                attribute_id: AttributeId::new(body.attribute_id),
                property_id: PropertyId::new(body.property_id),
                add_price: body.add_price,
                stock: body.stock,
            },
        )
        .await
        .map_err(|e| AppError::not_found_or(e, &format!("product {}", body.product_id)))?;

    Ok((StatusCode::CREATED, Json(json!({ "variation": variation }))))
}

/// Variation update request (price delta and stock only).
#[derive(Debug, Deserialize)]
pub struct VariationUpdateRequest {
    #[serde(default)]
    pub add_price: Decimal,
    #[serde(default)]
    pub stock: i32,
}

/// Update a variation.
#[instrument(skip(merchant, state, body))]
pub async fn update(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<VariationUpdateRequest>,
) -> Result<Json<Value>, AppError> {
    let variations = VariationRepository::new(state.pool());
    let variation = variations
        .update(merchant.id, VariationId::new(id), body.add_price, body.stock)
        .await
        .map_err(|e| AppError::not_found_or(e, &format!("variation {id}")))?;
    Ok(Json(json!({ "variation": variation })))
}

/// Delete a variation and its children.
#[instrument(skip(merchant, state))]
pub async fn destroy(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let variations = VariationRepository::new(state.pool());
    variations
        .delete(merchant.id, VariationId::new(id))
        .await
        .map_err(|e| AppError::not_found_or(e, &format!("variation {id}")))?;
    Ok(Json(json!({ "deleted": true })))
}
