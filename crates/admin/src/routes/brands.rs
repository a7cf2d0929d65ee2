//! Brand management route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use treggio_core::BrandId;

use crate::db::BrandRepository;
use crate::error::AppError;
use crate::middleware::auth::RequireMerchant;
use crate::state::AppState;

/// Build the brands router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/brands", get(index).post(create))
        .route("/brands/{id}", get(show).put(update).delete(destroy))
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct BrandListQuery {
    pub page: Option<i64>,
    pub search: Option<String>,
}

/// Brand create/update request.
#[derive(Debug, Deserialize)]
pub struct BrandRequest {
    pub name: String,
    #[serde(default = "default_state")]
    pub state: bool,
}

const fn default_state() -> bool {
    true
}

/// Paginated name-filtered brand listing.
#[instrument(skip(merchant, state), fields(user_id = %merchant.id))]
pub async fn index(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Query(query): Query<BrandListQuery>,
) -> Result<Json<Value>, AppError> {
    let brands = BrandRepository::new(state.pool());
    let (items, total) = brands
        .list(merchant.id, query.search.as_deref(), query.page.unwrap_or(1))
        .await?;
    Ok(Json(json!({ "total": total, "brands": items })))
}

/// Brand detail.
#[instrument(skip(merchant, state))]
pub async fn show(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let brands = BrandRepository::new(state.pool());
    let brand = brands
        .get(merchant.id, BrandId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("brand {id}")))?;
    Ok(Json(json!({ "brand": brand })))
}

/// Create a brand.
#[instrument(skip(merchant, state, body), fields(user_id = %merchant.id))]
pub async fn create(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Json(body): Json<BrandRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let brands = BrandRepository::new(state.pool());
    if brands.name_taken(merchant.id, &body.name, None).await? {
        return Err(AppError::Conflict(
            "a brand with this name already exists".to_string(),
        ));
    }

    let brand = brands.create(merchant.id, &body.name, body.state).await?;
    Ok((StatusCode::CREATED, Json(json!({ "brand": brand }))))
}

/// Update a brand.
#[instrument(skip(merchant, state, body))]
pub async fn update(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<BrandRequest>,
) -> Result<Json<Value>, AppError> {
    let brand_id = BrandId::new(id);
    let brands = BrandRepository::new(state.pool());

    if brands
        .name_taken(merchant.id, &body.name, Some(brand_id))
        .await?
    {
        return Err(AppError::Conflict(
            "a brand with this name already exists".to_string(),
        ));
    }

    let brand = brands
        .update(merchant.id, brand_id, &body.name, body.state)
        .await
        .map_err(|e| AppError::not_found_or(e, &format!("brand {id}")))?;
    Ok(Json(json!({ "brand": brand })))
}

/// Delete a brand.
#[instrument(skip(merchant, state))]
pub async fn destroy(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let brands = BrandRepository::new(state.pool());
    brands
        .delete(merchant.id, BrandId::new(id))
        .await
        .map_err(|e| AppError::not_found_or(e, &format!("brand {id}")))?;
    Ok(Json(json!({ "deleted": true })))
}
