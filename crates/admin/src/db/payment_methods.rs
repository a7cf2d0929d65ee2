//! Payment method catalog and per-tenant selection (M:N with default pivot).

use sqlx::PgPool;

use treggio_core::{PaymentMethodId, UserId};

use super::RepositoryError;
use crate::models::store::PaymentMethod;

#[derive(Debug, sqlx::FromRow)]
struct PaymentMethodRow {
    id: i32,
    name: String,
    is_active: bool,
}

impl From<PaymentMethodRow> for PaymentMethod {
    fn from(row: PaymentMethodRow) -> Self {
        Self {
            id: PaymentMethodId::new(row.id),
            name: row.name,
            is_active: row.is_active,
        }
    }
}

/// Repository for payment method operations.
pub struct PaymentMethodRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentMethodRepository<'a> {
    /// Create a new payment method repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The global catalog of active payment methods.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_available(&self) -> Result<Vec<PaymentMethod>, RepositoryError> {
        let rows = sqlx::query_as::<_, PaymentMethodRow>(
            "SELECT id, name, is_active FROM payment_methods WHERE is_active ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// IDs of the methods a tenant has selected.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn selected_ids(
        &self,
        user_id: UserId,
    ) -> Result<Vec<PaymentMethodId>, RepositoryError> {
        let ids: Vec<i32> = sqlx::query_scalar(
            "SELECT payment_method_id FROM user_payment_methods
             WHERE user_id = $1 ORDER BY payment_method_id",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;
        Ok(ids.into_iter().map(PaymentMethodId::new).collect())
    }

    /// Methods a tenant has selected, resolved against the catalog
    /// (storefront payload).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn selected_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<PaymentMethod>, RepositoryError> {
        let rows = sqlx::query_as::<_, PaymentMethodRow>(
            "SELECT pm.id, pm.name, pm.is_active
             FROM payment_methods pm
             JOIN user_payment_methods upm ON upm.payment_method_id = pm.id
             WHERE upm.user_id = $1 AND pm.is_active
             ORDER BY pm.id",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Replace a tenant's selection with the given set.
    ///
    /// Unknown or inactive method ids are rejected.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if any id is not in the catalog.
    pub async fn sync_selection(
        &self,
        user_id: UserId,
        method_ids: &[PaymentMethodId],
    ) -> Result<Vec<PaymentMethodId>, RepositoryError> {
        let ids: Vec<i32> = method_ids.iter().map(|m| m.as_i32()).collect();

        let known: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM payment_methods WHERE id = ANY($1) AND is_active",
        )
        .bind(&ids)
        .fetch_one(self.pool)
        .await?;
        if known != ids.len() as i64 {
            return Err(RepositoryError::Conflict(
                "unknown payment method id".to_owned(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_payment_methods WHERE user_id = $1")
            .bind(user_id.as_i32())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO user_payment_methods (user_id, payment_method_id)
             SELECT $1, unnest($2::int[])",
        )
        .bind(user_id.as_i32())
        .bind(&ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.selected_ids(user_id).await
    }

    /// Remove one method from a tenant's selection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the method was not selected.
    pub async fn remove_selection(
        &self,
        user_id: UserId,
        method_id: PaymentMethodId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM user_payment_methods
             WHERE user_id = $1 AND payment_method_id = $2",
        )
        .bind(user_id.as_i32())
        .bind(method_id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
