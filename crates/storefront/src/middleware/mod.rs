//! Middleware for the storefront.

pub mod custom_domain;

pub use custom_domain::{CurrentStore, resolve_custom_domain};
