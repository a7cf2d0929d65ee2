//! Per-tenant shipping configuration (singleton row).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use treggio_core::UserId;

use super::RepositoryError;
use crate::models::store::ShippingOption;

#[derive(Debug, sqlx::FromRow)]
struct ShippingRow {
    user_id: i32,
    is_free: bool,
    rate: Decimal,
    updated_at: DateTime<Utc>,
}

impl From<ShippingRow> for ShippingOption {
    fn from(row: ShippingRow) -> Self {
        Self {
            user_id: UserId::new(row.user_id),
            is_free: row.is_free,
            rate: row.rate,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for shipping options.
pub struct ShippingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShippingRepository<'a> {
    /// Create a new shipping repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The tenant's shipping configuration, creating the free-shipping
    /// default row on first read.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_default(&self, user_id: UserId) -> Result<ShippingOption, RepositoryError> {
        let row = sqlx::query_as::<_, ShippingRow>(
            "INSERT INTO user_shipping_options (user_id, is_free, rate)
             VALUES ($1, TRUE, 0)
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
             RETURNING user_id, is_free, rate, updated_at",
        )
        .bind(user_id.as_i32())
        .fetch_one(self.pool)
        .await?;
        Ok(row.into())
    }

    /// Upsert the tenant's shipping configuration.
    ///
    /// Free shipping forces the rate to zero.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        user_id: UserId,
        is_free: bool,
        rate: Decimal,
    ) -> Result<ShippingOption, RepositoryError> {
        let rate = if is_free { Decimal::ZERO } else { rate };

        let row = sqlx::query_as::<_, ShippingRow>(
            "INSERT INTO user_shipping_options (user_id, is_free, rate)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id)
             DO UPDATE SET is_free = EXCLUDED.is_free, rate = EXCLUDED.rate,
                           updated_at = now()
             RETURNING user_id, is_free, rate, updated_at",
        )
        .bind(user_id.as_i32())
        .bind(is_free)
        .bind(rate)
        .fetch_one(self.pool)
        .await?;
        Ok(row.into())
    }
}
