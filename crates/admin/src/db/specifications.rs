//! Product specification repository (tenant-scoped through the product).

use sqlx::PgPool;

use treggio_core::{AttributeId, ProductId, PropertyId, SpecificationId, UserId};

use super::RepositoryError;
use crate::models::catalog::Specification;

#[derive(Debug, sqlx::FromRow)]
struct SpecificationRow {
    id: i32,
    product_id: i32,
    attribute_id: i32,
    property_id: i32,
}

impl From<SpecificationRow> for Specification {
    fn from(row: SpecificationRow) -> Self {
        Self {
            id: SpecificationId::new(row.id),
            product_id: ProductId::new(row.product_id),
            attribute_id: AttributeId::new(row.attribute_id),
            property_id: PropertyId::new(row.property_id),
        }
    }
}

/// Repository for product specifications.
pub struct SpecificationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SpecificationRepository<'a> {
    /// Create a new specification repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Specifications of a product (tenant-checked).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Vec<Specification>, RepositoryError> {
        let rows = sqlx::query_as::<_, SpecificationRow>(
            "SELECT s.id, s.product_id, s.attribute_id, s.property_id
             FROM specifications s
             JOIN products p ON p.id = s.product_id
             WHERE s.product_id = $1 AND p.user_id = $2
             ORDER BY s.id",
        )
        .bind(product_id.as_i32())
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Add a specification to one of the tenant's products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not the tenant's.
    pub async fn create(
        &self,
        user_id: UserId,
        product_id: ProductId,
        attribute_id: AttributeId,
        property_id: PropertyId,
    ) -> Result<Specification, RepositoryError> {
        let owned: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
        )
        .bind(product_id.as_i32())
        .bind(user_id.as_i32())
        .fetch_one(self.pool)
        .await?;
        if owned == 0 {
            return Err(RepositoryError::NotFound);
        }

        let row = sqlx::query_as::<_, SpecificationRow>(
            "INSERT INTO specifications (product_id, attribute_id, property_id)
             VALUES ($1, $2, $3)
             RETURNING id, product_id, attribute_id, property_id",
        )
        .bind(product_id.as_i32())
        .bind(attribute_id.as_i32())
        .bind(property_id.as_i32())
        .fetch_one(self.pool)
        .await?;
        Ok(row.into())
    }

    /// Remove a specification (tenant-checked).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for rows outside the tenant.
    pub async fn delete(
        &self,
        user_id: UserId,
        id: SpecificationId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM specifications s
             USING products p
             WHERE s.id = $1 AND s.product_id = p.id AND p.user_id = $2",
        )
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
