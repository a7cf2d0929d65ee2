//! Product repository (tenant-scoped) including gallery images.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use treggio_core::{BrandId, CategoryId, ProductId, ProductImageId, ProductState, Slug, UserId};

use super::{PAGE_SIZE, RepositoryError, page_offset};
use crate::models::catalog::{Product, ProductImage};

const PRODUCT_COLUMNS: &str = "id, user_id, title, slug, sku, price, image, state, description, \
     tags, brand_id, category_first_id, category_second_id, category_third_id, \
     stock, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    user_id: i32,
    title: String,
    slug: String,
    sku: Option<String>,
    price: Decimal,
    image: Option<String>,
    state: String,
    description: Option<String>,
    tags: Option<serde_json::Value>,
    brand_id: Option<i32>,
    category_first_id: Option<i32>,
    category_second_id: Option<i32>,
    category_third_id: Option<i32>,
    stock: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid product slug in database: {e}"))
        })?;
        let state = match row.state.as_str() {
            "draft" => ProductState::Draft,
            "published" => ProductState::Published,
            other => {
                return Err(RepositoryError::DataCorruption(format!(
                    "unknown product state: {other}"
                )));
            }
        };

        Ok(Self {
            id: ProductId::new(row.id),
            user_id: UserId::new(row.user_id),
            title: row.title,
            slug,
            sku: row.sku,
            price: row.price,
            image: row.image,
            state,
            description: row.description,
            tags: row.tags,
            brand_id: row.brand_id.map(BrandId::new),
            category_first_id: row.category_first_id.map(CategoryId::new),
            category_second_id: row.category_second_id.map(CategoryId::new),
            category_third_id: row.category_third_id.map(CategoryId::new),
            stock: row.stock,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductImageRow {
    id: i32,
    product_id: i32,
    path: String,
}

impl From<ProductImageRow> for ProductImage {
    fn from(row: ProductImageRow) -> Self {
        Self {
            id: ProductImageId::new(row.id),
            product_id: ProductId::new(row.product_id),
            path: row.path,
        }
    }
}

/// Catalog search filters for the admin product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category_first_id: Option<CategoryId>,
    pub category_second_id: Option<CategoryId>,
    pub category_third_id: Option<CategoryId>,
    pub brand_id: Option<BrandId>,
}

/// Fields for creating or updating a product.
#[derive(Debug, Clone)]
pub struct ProductInput<'a> {
    pub title: &'a str,
    pub slug: &'a Slug,
    pub sku: Option<&'a str>,
    pub price: Decimal,
    pub image: Option<&'a str>,
    pub state: ProductState,
    pub description: Option<&'a str>,
    pub tags: Option<&'a serde_json::Value>,
    pub brand_id: Option<BrandId>,
    pub category_first_id: Option<CategoryId>,
    pub category_second_id: Option<CategoryId>,
    pub category_third_id: Option<CategoryId>,
    pub stock: i32,
}

/// Repository for product operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Paginated, filtered listing of a tenant's products, newest first.
    ///
    /// Returns the page plus the total row count for the filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        user_id: UserId,
        filter: &ProductFilter,
        page: i64,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        let where_clause = "user_id = $1 AND deleted_at IS NULL
             AND ($2::text IS NULL OR title ILIKE '%' || $2 || '%')
             AND ($3::int IS NULL OR category_first_id = $3)
             AND ($4::int IS NULL OR category_second_id = $4)
             AND ($5::int IS NULL OR category_third_id = $5)
             AND ($6::int IS NULL OR brand_id = $6)";

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM products WHERE {where_clause}"))
                .bind(user_id.as_i32())
                .bind(filter.search.as_deref())
                .bind(filter.category_first_id.map(|id| id.as_i32()))
                .bind(filter.category_second_id.map(|id| id.as_i32()))
                .bind(filter.category_third_id.map(|id| id.as_i32()))
                .bind(filter.brand_id.map(|id| id.as_i32()))
                .fetch_one(self.pool)
                .await?;

        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE {where_clause}
             ORDER BY id DESC LIMIT $7 OFFSET $8"
        ))
        .bind(user_id.as_i32())
        .bind(filter.search.as_deref())
        .bind(filter.category_first_id.map(|id| id.as_i32()))
        .bind(filter.category_second_id.map(|id| id.as_i32()))
        .bind(filter.category_third_id.map(|id| id.as_i32()))
        .bind(filter.brand_id.map(|id| id.as_i32()))
        .bind(PAGE_SIZE)
        .bind(page_offset(page, PAGE_SIZE))
        .fetch_all(self.pool)
        .await?;

        let products = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((products, total))
    }

    /// Number of live products a tenant has (plan limit checks).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_for_user(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE user_id = $1 AND deleted_at IS NULL",
        )
        .bind(user_id.as_i32())
        .fetch_one(self.pool)
        .await?;
        Ok(count)
    }

    /// Whether a product title is already used by this tenant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn title_taken(
        &self,
        user_id: UserId,
        title: &str,
        exclude: Option<ProductId>,
    ) -> Result<bool, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products
             WHERE user_id = $1 AND title = $2 AND deleted_at IS NULL
               AND ($3::int IS NULL OR id <> $3)",
        )
        .bind(user_id.as_i32())
        .bind(title)
        .bind(exclude.map(|id| id.as_i32()))
        .fetch_one(self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Get a tenant's product by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        user_id: UserId,
        id: ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL"
        ))
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;
        row.map(TryInto::try_into).transpose()
    }

    /// Create a product for a tenant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        user_id: UserId,
        input: &ProductInput<'_>,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products
                 (user_id, title, slug, sku, price, image, state, description, tags,
                  brand_id, category_first_id, category_second_id, category_third_id, stock)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(user_id.as_i32())
        .bind(input.title)
        .bind(input.slug.as_str())
        .bind(input.sku)
        .bind(input.price)
        .bind(input.image)
        .bind(state_str(input.state))
        .bind(input.description)
        .bind(input.tags)
        .bind(input.brand_id.map(|id| id.as_i32()))
        .bind(input.category_first_id.map(|id| id.as_i32()))
        .bind(input.category_second_id.map(|id| id.as_i32()))
        .bind(input.category_third_id.map(|id| id.as_i32()))
        .bind(input.stock)
        .fetch_one(self.pool)
        .await?;
        row.try_into()
    }

    /// Update a tenant's product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not the tenant's.
    pub async fn update(
        &self,
        user_id: UserId,
        id: ProductId,
        input: &ProductInput<'_>,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET
                 title = $3, slug = $4, sku = $5, price = $6,
                 image = COALESCE($7, image), state = $8, description = $9, tags = $10,
                 brand_id = $11, category_first_id = $12, category_second_id = $13,
                 category_third_id = $14, stock = $15, updated_at = now()
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .bind(input.title)
        .bind(input.slug.as_str())
        .bind(input.sku)
        .bind(input.price)
        .bind(input.image)
        .bind(state_str(input.state))
        .bind(input.description)
        .bind(input.tags)
        .bind(input.brand_id.map(|id| id.as_i32()))
        .bind(input.category_first_id.map(|id| id.as_i32()))
        .bind(input.category_second_id.map(|id| id.as_i32()))
        .bind(input.category_third_id.map(|id| id.as_i32()))
        .bind(input.stock)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        row.try_into()
    }

    /// Soft-delete a tenant's product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not the tenant's.
    pub async fn soft_delete(&self, user_id: UserId, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE products SET deleted_at = now()
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL",
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

    // =========================================================================
    // Gallery images
    // =========================================================================

    /// List a product's gallery images.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_images(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductImage>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductImageRow>(
            "SELECT id, product_id, path FROM product_images
             WHERE product_id = $1 ORDER BY id",
        )
        .bind(product_id.as_i32())
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Attach a gallery image to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_image(
        &self,
        product_id: ProductId,
        path: &str,
    ) -> Result<ProductImage, RepositoryError> {
        let row = sqlx::query_as::<_, ProductImageRow>(
            "INSERT INTO product_images (product_id, path) VALUES ($1, $2)
             RETURNING id, product_id, path",
        )
        .bind(product_id.as_i32())
        .bind(path)
        .fetch_one(self.pool)
        .await?;
        Ok(row.into())
    }

    /// Remove a gallery image, verifying it belongs to one of the tenant's
    /// products. Returns the removed file path.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for images outside the tenant.
    pub async fn delete_image(
        &self,
        user_id: UserId,
        image_id: ProductImageId,
    ) -> Result<String, RepositoryError> {
        let path: Option<String> = sqlx::query_scalar(
            "DELETE FROM product_images pi
             USING products p
             WHERE pi.id = $1 AND pi.product_id = p.id AND p.user_id = $2
             RETURNING pi.path",
        )
        .bind(image_id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;
        path.ok_or(RepositoryError::NotFound)
    }
}

const fn state_str(state: ProductState) -> &'static str {
    match state {
        ProductState::Draft => "draft",
        ProductState::Published => "published",
    }
}
