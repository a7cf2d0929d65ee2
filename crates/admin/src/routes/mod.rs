//! HTTP route handlers for the admin API.
//!
//! # Route Structure
//!
//! ```text
//! # Auth (public)
//! POST /auth/register          - Free-plan registration
//! POST /auth/login             - Login (session cookie)
//! POST /auth/logout            - Logout
//! GET  /auth/me                - Current merchant profile
//! POST /auth/verify            - Activate account by emailed code
//! POST /auth/forgot            - Send password reset code
//! POST /auth/reset/check       - Check a reset code
//! POST /auth/reset             - Set a new password
//!
//! # Billing (public + webhook)
//! GET  /auth/plans             - Plan catalog
//! POST /auth/checkout          - Paid registration -> gateway checkout URL
//! POST /auth/webhook           - Gateway webhook (preapproval events)
//! POST /auth/plan              - Plan change for a logged-in merchant
//! GET  /auth/payment/success   - Browser return URLs
//! GET  /auth/payment/failure
//! GET  /auth/payment/pending
//!
//! # Merchant admin (session required)
//! GET    /admin/limits                 - Product usage vs plan limit
//! GET    /admin/profile                - Profile
//! PUT    /admin/profile                - Update profile (multipart)
//! DELETE /admin/profile/popup          - Remove popup image
//! ...    /admin/products               - Catalog CRUD (+ images, config)
//! ...    /admin/categories             - Three-level category CRUD
//! ...    /admin/brands
//! ...    /admin/attributes, /admin/properties
//! ...    /admin/variations, /admin/specifications
//! ...    /admin/sliders
//! ...    /admin/notices
//! ...    /admin/pixels
//! ...    /admin/payment-methods
//! ...    /admin/shipping
//! ...    /admin/fonts
//! ...    /admin/domain                 - Custom domain connect/verify
//! ...    /admin/campaigns              - AI campaign generation/history
//! GET    /admin/purchases              - Received orders
//! ```

pub mod attributes;
pub mod auth;
pub mod billing;
pub mod brands;
pub mod campaigns;
pub mod categories;
pub mod domains;
pub mod fonts;
pub mod notices;
pub mod payment_methods;
pub mod pixels;
pub mod products;
pub mod purchases;
pub mod shipping;
pub mod sliders;
pub mod specifications;
pub mod variations;

use axum::Router;

use crate::config::AdminConfig;
use crate::state::AppState;

/// Create all routes for the admin API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router().merge(billing::auth_router()))
        .nest(
            "/admin",
            Router::new()
                .merge(auth::profile_router())
                .merge(products::router())
                .merge(categories::router())
                .merge(brands::router())
                .merge(attributes::router())
                .merge(variations::router())
                .merge(specifications::router())
                .merge(sliders::router())
                .merge(notices::router())
                .merge(pixels::router())
                .merge(payment_methods::router())
                .merge(shipping::router())
                .merge(fonts::router())
                .merge(domains::router())
                .merge(campaigns::router())
                .merge(purchases::router()),
        )
}

/// Absolute public URL for a stored media path.
///
/// Stored paths are relative to the media root; the storefront binary serves
/// them under `/storage`.
#[must_use]
pub fn media_url(config: &AdminConfig, path: &str) -> String {
    format!(
        "{}/storage/{path}",
        config.storefront_url.trim_end_matches('/')
    )
}

/// `media_url` for optional paths.
#[must_use]
pub fn media_url_opt(config: &AdminConfig, path: Option<&str>) -> Option<String> {
    path.map(|p| media_url(config, p))
}
