//! Brand repository (tenant-scoped).

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use treggio_core::{BrandId, UserId};

use super::{PAGE_SIZE, RepositoryError, page_offset};
use crate::models::catalog::Brand;

#[derive(Debug, sqlx::FromRow)]
struct BrandRow {
    id: i32,
    user_id: i32,
    name: String,
    state: bool,
    created_at: DateTime<Utc>,
}

impl From<BrandRow> for Brand {
    fn from(row: BrandRow) -> Self {
        Self {
            id: BrandId::new(row.id),
            user_id: UserId::new(row.user_id),
            name: row.name,
            state: row.state,
            created_at: row.created_at,
        }
    }
}

/// Repository for brand operations.
pub struct BrandRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BrandRepository<'a> {
    /// Create a new brand repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Paginated name-filtered listing, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        user_id: UserId,
        search: Option<&str>,
        page: i64,
    ) -> Result<(Vec<Brand>, i64), RepositoryError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM brands
             WHERE user_id = $1 AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')",
        )
        .bind(user_id.as_i32())
        .bind(search)
        .fetch_one(self.pool)
        .await?;

        let rows = sqlx::query_as::<_, BrandRow>(
            "SELECT id, user_id, name, state, created_at FROM brands
             WHERE user_id = $1 AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
             ORDER BY id DESC LIMIT $3 OFFSET $4",
        )
        .bind(user_id.as_i32())
        .bind(search)
        .bind(PAGE_SIZE)
        .bind(page_offset(page, PAGE_SIZE))
        .fetch_all(self.pool)
        .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// All of a tenant's active brands (product form config).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self, user_id: UserId) -> Result<Vec<Brand>, RepositoryError> {
        let rows = sqlx::query_as::<_, BrandRow>(
            "SELECT id, user_id, name, state, created_at FROM brands
             WHERE user_id = $1 AND state ORDER BY name",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a tenant's brand by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        user_id: UserId,
        id: BrandId,
    ) -> Result<Option<Brand>, RepositoryError> {
        let row = sqlx::query_as::<_, BrandRow>(
            "SELECT id, user_id, name, state, created_at FROM brands
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Whether a brand name is already used by this tenant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn name_taken(
        &self,
        user_id: UserId,
        name: &str,
        exclude: Option<BrandId>,
    ) -> Result<bool, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM brands
             WHERE user_id = $1 AND name = $2 AND ($3::int IS NULL OR id <> $3)",
        )
        .bind(user_id.as_i32())
        .bind(name)
        .bind(exclude.map(|id| id.as_i32()))
        .fetch_one(self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Create a brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        user_id: UserId,
        name: &str,
        state: bool,
    ) -> Result<Brand, RepositoryError> {
        let row = sqlx::query_as::<_, BrandRow>(
            "INSERT INTO brands (user_id, name, state) VALUES ($1, $2, $3)
             RETURNING id, user_id, name, state, created_at",
        )
        .bind(user_id.as_i32())
        .bind(name)
        .bind(state)
        .fetch_one(self.pool)
        .await?;
        Ok(row.into())
    }

    /// Update a tenant's brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the brand is not the tenant's.
    pub async fn update(
        &self,
        user_id: UserId,
        id: BrandId,
        name: &str,
        state: bool,
    ) -> Result<Brand, RepositoryError> {
        let row = sqlx::query_as::<_, BrandRow>(
            "UPDATE brands SET name = $3, state = $4
             WHERE id = $1 AND user_id = $2
             RETURNING id, user_id, name, state, created_at",
        )
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .bind(name)
        .bind(state)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        Ok(row.into())
    }

    /// Delete a tenant's brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the brand is not the tenant's.
    pub async fn delete(&self, user_id: UserId, id: BrandId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM brands WHERE id = $1 AND user_id = $2")
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
