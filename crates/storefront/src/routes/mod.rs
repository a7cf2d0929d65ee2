//! HTTP route handlers for the public storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                               - Store page on custom domains
//! GET  /tienda/{slug}                  - Full store page payload
//! GET  /tienda/{slug}/categories       - Featured categories
//! GET  /tienda/{slug}/sliders          - Active sliders
//! GET  /usuario/{slug}                 - Public store profile
//! GET  /user/{key}/products            - Store page payload by slug or id
//! GET  /productos/{slug}               - Published products of a store
//! GET  /products/{product_id}          - Product detail with images
//! GET  /user/{slug}/payment-methods    - Active payment methods
//! GET  /user/{slug}/shipping-options   - Shipping configuration
//! GET  /public/user/{slug}/font        - Storefront font
//! GET  /avisos/public/{slug}           - Latest announcement
//! GET  /tiendas/{slug}/pixel           - Active tracking pixels
//! POST /purchases                      - Public checkout intake
//! ```

pub mod meta;
pub mod products;
pub mod purchases;
pub mod store;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(store::home))
        .route("/tienda/{slug}", get(store::store_page))
        .route("/tienda/{slug}/categories", get(store::categories))
        .route("/tienda/{slug}/sliders", get(store::sliders))
        .route("/usuario/{slug}", get(store::profile))
        // Accepts either a numeric store id or a slug.
        .route("/user/{slug}/products", get(store::products_by_key))
        .route("/productos/{slug}", get(products::by_store))
        .route("/products/{product_id}", get(products::detail))
        .route("/user/{slug}/payment-methods", get(meta::payment_methods))
        .route("/user/{slug}/shipping-options", get(meta::shipping))
        .route("/public/user/{slug}/font", get(meta::font))
        .route("/avisos/public/{slug}", get(meta::notice))
        .route("/tiendas/{slug}/pixel", get(meta::pixels))
        .route("/purchases", post(purchases::create))
}
