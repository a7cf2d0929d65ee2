//! Store page route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::catalog::{PublicCategory, PublicProduct, PublicSlider};
use crate::db::stores::PublicStore;
use crate::db::{CatalogRepository, StoreRepository};
use crate::error::AppError;
use crate::state::AppState;

/// Number of featured categories on the store page.
const FEATURED_CATEGORY_LIMIT: i64 = 5;

/// Look up a store by slug or 404.
pub(crate) async fn store_by_slug(
    state: &AppState,
    slug: &str,
) -> Result<PublicStore, AppError> {
    StoreRepository::new(state.pool())
        .get_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::NotFound("store".to_string()))
}

fn product_json(state: &AppState, product: &PublicProduct) -> Value {
    json!({
        "id": product.id,
        "title": product.title,
        "slug": product.slug,
        "price": product.price,
        "image": product.image.as_deref().map(|p| state.config().media_url(p)),
        "description": product.description,
        "tags": product.tags,
        "stock": product.stock,
    })
}

fn slider_json(state: &AppState, slider: &PublicSlider) -> Value {
    json!({
        "id": slider.id,
        "title": slider.title,
        "subtitle": slider.subtitle,
        "label": slider.label,
        "image": slider.image.as_deref().map(|p| state.config().media_url(p)),
        "link": slider.link,
        "kind": slider.kind,
        "price_original": slider.price_original,
        "price_campaign": slider.price_campaign,
        "color": slider.color,
    })
}

fn category_json(state: &AppState, category: &PublicCategory) -> Value {
    json!({
        "id": category.id,
        "name": category.name,
        "image": category.image.as_deref().map(|p| state.config().media_url(p)),
        "products_count": category.products_count,
    })
}

/// The full store page payload: profile, published products, active sliders,
/// and featured categories.
async fn store_payload(state: &AppState, store: &PublicStore) -> Result<Value, AppError> {
    let catalog = CatalogRepository::new(state.pool());

    let products = catalog.published_products(store.id).await?;
    let sliders = catalog.active_sliders(store.id).await?;
    let categories = catalog
        .featured_categories(store.id, FEATURED_CATEGORY_LIMIT)
        .await?;

    Ok(json!({
        "user": {
            "id": store.id,
            "name": store.name,
            "store_name": store.store_name,
            "slug": store.slug,
            "avatar": store.avatar.as_deref().map(|p| state.config().media_url(p)),
            "description": store.description,
            "mission": store.mission,
            "vision": store.vision,
            "menu_color": store.menu_color,
            "button_color": store.button_color,
            "button_radius": store.button_radius,
        },
        "products": products.iter().map(|p| product_json(state, p)).collect::<Vec<_>>(),
        "sliders": sliders.iter().map(|s| slider_json(state, s)).collect::<Vec<_>>(),
        "categories": categories.iter().map(|c| category_json(state, c)).collect::<Vec<_>>(),
    }))
}

/// `GET /` - on a custom domain this is the store page; on the platform
/// domain it is a minimal API index.
#[instrument(skip(state, current))]
pub async fn home(
    State(state): State<AppState>,
    current: Option<axum::Extension<crate::middleware::CurrentStore>>,
) -> Result<Json<Value>, AppError> {
    let Some(axum::Extension(current)) = current else {
        return Ok(Json(json!({ "service": "treggio-storefront" })));
    };

    let store = store_by_slug(&state, &current.slug).await?;
    let payload = store_payload(&state, &store).await?;
    Ok(Json(payload))
}

/// `GET /tienda/{slug}` - the store page.
#[instrument(skip(state))]
pub async fn store_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, AppError> {
    let store = store_by_slug(&state, &slug).await?;
    let payload = store_payload(&state, &store).await?;
    Ok(Json(payload))
}

/// `GET /usuario/{slug}` - the public store profile.
#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, AppError> {
    let store = store_by_slug(&state, &slug).await?;

    Ok(Json(json!({
        "id": store.id,
        "name": store.name,
        "surname": store.surname,
        "phone": store.phone,
        "avatar": store.avatar.as_deref().map(|p| state.config().media_url(p)),
        "popup": store.popup.as_deref().map(|p| state.config().media_url(p)),
        "facebook": store.facebook,
        "instagram": store.instagram,
        "tiktok": store.tiktok,
        "youtube": store.youtube,
        "address": store.address,
        "description": store.description,
        "store_name": store.store_name,
        "slug": store.slug,
        "menu_color": store.menu_color,
        "button_color": store.button_color,
        "mission": store.mission,
        "vision": store.vision,
        "created_at": store.created_at,
    })))
}

/// `GET /user/{slug}/products` - store page payload, `slug` may also be a
/// numeric store id (legacy clients).
#[instrument(skip(state))]
pub async fn products_by_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Value>, AppError> {
    let stores = StoreRepository::new(state.pool());

    let store = if let Ok(id) = key.parse::<i32>() {
        stores.get_by_id(id).await?
    } else {
        stores.get_by_slug(&key).await?
    }
    .ok_or_else(|| AppError::NotFound("store".to_string()))?;

    let payload = store_payload(&state, &store).await?;
    Ok(Json(payload))
}

/// `GET /tienda/{slug}/categories` - featured categories only.
#[instrument(skip(state))]
pub async fn categories(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, AppError> {
    let store = store_by_slug(&state, &slug).await?;
    let catalog = CatalogRepository::new(state.pool());
    let categories = catalog
        .featured_categories(store.id, FEATURED_CATEGORY_LIMIT)
        .await?;

    Ok(Json(json!({
        "categories": categories.iter().map(|c| category_json(&state, c)).collect::<Vec<_>>(),
    })))
}

/// `GET /tienda/{slug}/sliders` - active sliders only.
#[instrument(skip(state))]
pub async fn sliders(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, AppError> {
    let store = store_by_slug(&state, &slug).await?;
    let catalog = CatalogRepository::new(state.pool());
    let sliders = catalog.active_sliders(store.id).await?;

    Ok(Json(json!({
        "sliders": sliders.iter().map(|s| slider_json(&state, s)).collect::<Vec<_>>(),
    })))
}
