//! Database operations for the admin API.
//!
//! One repository per aggregate, all scoped by the owning tenant's `user_id`.
//! Queries use the runtime `query_as` API with explicit row structs; rows are
//! converted into domain models via `TryFrom` so invalid stored data surfaces
//! as `RepositoryError::DataCorruption` instead of panicking.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p treggio-cli -- migrate
//! ```

pub mod attributes;
pub mod brands;
pub mod campaigns;
pub mod categories;
pub mod domains;
pub mod notices;
pub mod payment_methods;
pub mod pixels;
pub mod plans;
pub mod products;
pub mod purchases;
pub mod shipping;
pub mod sliders;
pub mod specifications;
pub mod users;
pub mod variations;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use attributes::AttributeRepository;
pub use brands::BrandRepository;
pub use campaigns::CampaignRepository;
pub use categories::CategoryRepository;
pub use domains::DomainRepository;
pub use notices::NoticeRepository;
pub use payment_methods::PaymentMethodRepository;
pub use pixels::PixelRepository;
pub use plans::PlanRepository;
pub use products::ProductRepository;
pub use purchases::PurchaseRepository;
pub use shipping::ShippingRepository;
pub use sliders::SliderRepository;
pub use specifications::SpecificationRepository;
pub use users::UserRepository;
pub use variations::VariationRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique-violation database error to `Conflict`, everything else
    /// to `Database`.
    pub(crate) fn from_sqlx(e: sqlx::Error, conflict_msg: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict_msg.to_owned());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Number of rows per admin listing page.
pub const PAGE_SIZE: i64 = 25;

/// Clamp a 1-based page number to a SQL offset.
#[must_use]
pub const fn page_offset(page: i64, page_size: i64) -> i64 {
    let page = if page < 1 { 1 } else { page };
    (page - 1) * page_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1, 25), 0);
        assert_eq!(page_offset(2, 25), 25);
        assert_eq!(page_offset(0, 25), 0);
        assert_eq!(page_offset(-3, 25), 0);
    }
}
