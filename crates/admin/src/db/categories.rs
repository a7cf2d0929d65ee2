//! Category repository (three-level hierarchy, tenant-scoped).

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use treggio_core::{CategoryId, UserId};

use super::{PAGE_SIZE, RepositoryError, page_offset};
use crate::models::catalog::Category;

const CATEGORY_COLUMNS: &str = "id, user_id, name, image, state, parent_id, depth, created_at";

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    user_id: i32,
    name: String,
    image: Option<String>,
    state: bool,
    parent_id: Option<i32>,
    depth: i16,
    created_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            user_id: UserId::new(row.user_id),
            name: row.name,
            image: row.image,
            state: row.state,
            parent_id: row.parent_id.map(CategoryId::new),
            depth: row.depth,
            created_at: row.created_at,
        }
    }
}

/// Fields for creating or updating a category.
#[derive(Debug, Clone)]
pub struct CategoryInput<'a> {
    pub name: &'a str,
    pub image: Option<&'a str>,
    pub state: bool,
    pub parent_id: Option<CategoryId>,
    pub depth: i16,
}

/// Repository for category operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
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
    ) -> Result<(Vec<Category>, i64), RepositoryError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM categories
             WHERE user_id = $1 AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')",
        )
        .bind(user_id.as_i32())
        .bind(search)
        .fetch_one(self.pool)
        .await?;

        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories
             WHERE user_id = $1 AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
             ORDER BY id DESC LIMIT $3 OFFSET $4"
        ))
        .bind(user_id.as_i32())
        .bind(search)
        .bind(PAGE_SIZE)
        .bind(page_offset(page, PAGE_SIZE))
        .fetch_all(self.pool)
        .await?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// All of a tenant's categories at a given depth (1 = top level).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_depth(
        &self,
        user_id: UserId,
        depth: i16,
        only_active: bool,
    ) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories
             WHERE user_id = $1 AND depth = $2 AND (NOT $3 OR state)
             ORDER BY name"
        ))
        .bind(user_id.as_i32())
        .bind(depth)
        .bind(only_active)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Whether a category name is already used by this tenant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn name_taken(
        &self,
        user_id: UserId,
        name: &str,
        exclude: Option<CategoryId>,
    ) -> Result<bool, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM categories
             WHERE user_id = $1 AND name = $2 AND ($3::int IS NULL OR id <> $3)",
        )
        .bind(user_id.as_i32())
        .bind(name)
        .bind(exclude.map(|id| id.as_i32()))
        .fetch_one(self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Get a tenant's category by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        user_id: UserId,
        id: CategoryId,
    ) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1 AND user_id = $2"
        ))
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        user_id: UserId,
        input: &CategoryInput<'_>,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "INSERT INTO categories (user_id, name, image, state, parent_id, depth)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(user_id.as_i32())
        .bind(input.name)
        .bind(input.image)
        .bind(input.state)
        .bind(input.parent_id.map(|id| id.as_i32()))
        .bind(input.depth)
        .fetch_one(self.pool)
        .await?;
        Ok(row.into())
    }

    /// Update a tenant's category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category is not the tenant's.
    pub async fn update(
        &self,
        user_id: UserId,
        id: CategoryId,
        input: &CategoryInput<'_>,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "UPDATE categories SET
                 name = $3, image = COALESCE($4, image), state = $5,
                 parent_id = $6, depth = $7
             WHERE id = $1 AND user_id = $2
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .bind(input.name)
        .bind(input.image)
        .bind(input.state)
        .bind(input.parent_id.map(|id| id.as_i32()))
        .bind(input.depth)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        Ok(row.into())
    }

    /// Number of live products referencing a category at any level.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_references(&self, id: CategoryId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products
             WHERE deleted_at IS NULL
               AND (category_first_id = $1 OR category_second_id = $1 OR category_third_id = $1)",
        )
        .bind(id.as_i32())
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Delete a tenant's category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category is not the tenant's.
    pub async fn delete(&self, user_id: UserId, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
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
