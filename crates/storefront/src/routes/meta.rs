//! Store metadata route handlers: payment methods, shipping, font,
//! announcements, and tracking pixels.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::StoreRepository;
use crate::error::AppError;
use crate::state::AppState;

use super::store::store_by_slug;

/// `GET /user/{slug}/payment-methods` - the store's active payment methods.
#[instrument(skip(state))]
pub async fn payment_methods(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, AppError> {
    let store = store_by_slug(&state, &slug).await?;
    let methods = StoreRepository::new(state.pool())
        .payment_methods(store.id)
        .await?;
    Ok(Json(json!({ "payment_methods": methods })))
}

/// `GET /user/{slug}/shipping-options` - the store's shipping configuration.
#[instrument(skip(state))]
pub async fn shipping(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, AppError> {
    let store = store_by_slug(&state, &slug).await?;
    let shipping = StoreRepository::new(state.pool()).shipping(store.id).await?;
    Ok(Json(json!({
        "is_free": shipping.is_free,
        "shipping_rate": shipping.shipping_rate,
    })))
}

/// `GET /public/user/{slug}/font` - the storefront font with its stylesheet.
#[instrument(skip(state))]
pub async fn font(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, AppError> {
    let store = store_by_slug(&state, &slug).await?;

    Ok(Json(json!({
        "selected_font": store.font.name(),
        "font_family": store.font.family(),
        "font_url": store.font.stylesheet_url(),
    })))
}

/// `GET /avisos/public/{slug}` - the store's latest announcement (or null).
#[instrument(skip(state))]
pub async fn notice(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, AppError> {
    let store = store_by_slug(&state, &slug).await?;
    let notice = StoreRepository::new(state.pool())
        .latest_notice(store.id)
        .await?;
    Ok(Json(json!({ "notice": notice })))
}

/// `GET /tiendas/{slug}/pixel` - active tracking pixels for the store.
#[instrument(skip(state))]
pub async fn pixels(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, AppError> {
    let store = store_by_slug(&state, &slug).await?;
    let pixels = StoreRepository::new(state.pool()).pixels(store.id).await?;
    Ok(Json(json!({ "pixels": pixels })))
}
