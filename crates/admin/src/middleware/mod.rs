//! Middleware for the admin API.

pub mod auth;
pub mod session;

pub use auth::RequireMerchant;
pub use session::create_session_layer;
