//! Product variation repository (tenant-scoped through the product).

use rust_decimal::Decimal;
use sqlx::PgPool;

use treggio_core::{AttributeId, ProductId, PropertyId, UserId, VariationId};

use super::RepositoryError;
use crate::models::catalog::Variation;

#[derive(Debug, sqlx::FromRow)]
struct VariationRow {
    id: i32,
    product_id: i32,
    parent_id: Option<i32>,
    attribute_id: i32,
    property_id: i32,
    add_price: Decimal,
    stock: i32,
}

impl From<VariationRow> for Variation {
    fn from(row: VariationRow) -> Self {
        Self {
            id: VariationId::new(row.id),
            product_id: ProductId::new(row.product_id),
            parent_id: row.parent_id.map(VariationId::new),
            attribute_id: AttributeId::new(row.attribute_id),
            property_id: PropertyId::new(row.property_id),
            add_price: row.add_price,
            stock: row.stock,
        }
    }
}

const VARIATION_COLUMNS: &str =
    "id, product_id, parent_id, attribute_id, property_id, add_price, stock";

const VARIATION_COLUMNS_QUALIFIED: &str =
    "v.id, v.product_id, v.parent_id, v.attribute_id, v.property_id, v.add_price, v.stock";

/// Fields for creating or updating a variation.
#[derive(Debug, Clone, Copy)]
pub struct VariationInput {
    pub product_id: ProductId,
    pub parent_id: Option<VariationId>,
    pub attribute_id: AttributeId,
    pub property_id: PropertyId,
    pub add_price: Decimal,
    pub stock: i32,
}

/// Repository for product variations.
pub struct VariationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VariationRepository<'a> {
    /// Create a new variation repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Top-level variations of a product (tenant-checked).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Vec<Variation>, RepositoryError> {
        let rows = sqlx::query_as::<_, VariationRow>(&format!(
            "SELECT {VARIATION_COLUMNS_QUALIFIED} FROM variations v
             JOIN products p ON p.id = v.product_id
             WHERE v.product_id = $1 AND p.user_id = $2 AND v.parent_id IS NULL
             ORDER BY v.id"
        ))
        .bind(product_id.as_i32())
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Nested variations under a parent variation (tenant-checked).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_children(
        &self,
        user_id: UserId,
        parent_id: VariationId,
    ) -> Result<Vec<Variation>, RepositoryError> {
        let rows = sqlx::query_as::<_, VariationRow>(&format!(
            "SELECT {VARIATION_COLUMNS_QUALIFIED} FROM variations v
             JOIN products p ON p.id = v.product_id
             WHERE v.parent_id = $1 AND p.user_id = $2
             ORDER BY v.id"
        ))
        .bind(parent_id.as_i32())
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Create a variation under one of the tenant's products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not the tenant's.
    pub async fn create(
        &self,
        user_id: UserId,
        input: VariationInput,
    ) -> Result<Variation, RepositoryError> {
        let owned: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
        )
        .bind(input.product_id.as_i32())
        .bind(user_id.as_i32())
        .fetch_one(self.pool)
        .await?;
        if owned == 0 {
            return Err(RepositoryError::NotFound);
        }

        let row = sqlx::query_as::<_, VariationRow>(&format!(
            "INSERT INTO variations
                 (product_id, parent_id, attribute_id, property_id, add_price, stock)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {VARIATION_COLUMNS}"
        ))
        .bind(input.product_id.as_i32())
        .bind(input.parent_id.map(|id| id.as_i32()))
        .bind(input.attribute_id.as_i32())
        .bind(input.property_id.as_i32())
        .bind(input.add_price)
        .bind(input.stock)
        .fetch_one(self.pool)
        .await?;
        Ok(row.into())
    }

    /// Update a variation's price delta and stock (tenant-checked).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for variations outside the tenant.
    pub async fn update(
        &self,
        user_id: UserId,
        id: VariationId,
        add_price: Decimal,
        stock: i32,
    ) -> Result<Variation, RepositoryError> {
        let row = sqlx::query_as::<_, VariationRow>(&format!(
            "UPDATE variations v SET add_price = $3, stock = $4
             FROM products p
             WHERE v.id = $1 AND v.product_id = p.id AND p.user_id = $2
             RETURNING {VARIATION_COLUMNS_QUALIFIED}"
        ))
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .bind(add_price)
        .bind(stock)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        Ok(row.into())
    }

    /// Delete a variation and its nested children (tenant-checked).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for variations outside the tenant.
    pub async fn delete(&self, user_id: UserId, id: VariationId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM variations v
             USING products p
             WHERE v.product_id = p.id AND p.user_id = $2
               AND (v.id = $1 OR v.parent_id = $1)",
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
