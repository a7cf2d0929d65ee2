//! Integration tests for Treggio.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! cargo run -p treggio-cli -- migrate
//! cargo run -p treggio-cli -- seed plans
//!
//! # Start both servers, then:
//! cargo test -p treggio-integration-tests -- --ignored
//! ```
//!
//! Live tests are `#[ignore]`d by default because they need a running
//! `PostgreSQL` instance plus the admin and storefront binaries. Base URLs
//! are configurable via `ADMIN_BASE_URL` and `STOREFRONT_BASE_URL`.

/// Base URL for the admin API (configurable via environment).
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// Base URL for the storefront API (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A cookie-holding HTTP client, required for session-authenticated routes.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique suffix for test data so reruns do not collide.
#[must_use]
pub fn unique_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
