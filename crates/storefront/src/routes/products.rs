//! Public product route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::CatalogRepository;
use crate::error::AppError;
use crate::state::AppState;

use super::store::store_by_slug;

/// `GET /productos/{slug}` - all published products of a store.
#[instrument(skip(state))]
pub async fn by_store(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, AppError> {
    let store = store_by_slug(&state, &slug).await?;
    let catalog = CatalogRepository::new(state.pool());
    let products = catalog.published_products(store.id).await?;

    let products_json: Vec<Value> = products
        .iter()
        .map(|p| {
            json!({
                "id": p.id,
                "title": p.title,
                "slug": p.slug,
                "price": p.price,
                "image": p.image.as_deref().map(|path| state.config().media_url(path)),
                "description": p.description,
                "stock": p.stock,
            })
        })
        .collect();

    Ok(Json(json!({ "products": products_json })))
}

/// `GET /products/{product_id}` - product detail with gallery images.
#[instrument(skip(state))]
pub async fn detail(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let catalog = CatalogRepository::new(state.pool());
    let product = catalog
        .product_by_id(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_string()))?;

    let images: Vec<Value> = catalog
        .product_images(product.id)
        .await?
        .iter()
        .map(|img| {
            json!({
                "id": img.id,
                "image": state.config().media_url(&img.path),
            })
        })
        .collect();

    Ok(Json(json!({
        "product": {
            "id": product.id,
            "title": product.title,
            "slug": product.slug,
            "price": product.price,
            "image": product.image.as_deref().map(|p| state.config().media_url(p)),
            "description": product.description,
            "tags": product.tags,
            "stock": product.stock,
            "images": images,
        }
    })))
}
