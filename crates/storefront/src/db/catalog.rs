//! Published catalog reads: products, sliders, and top-level categories.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use treggio_core::UserId;

use super::RepositoryError;

/// A published product as shown on the storefront.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PublicProduct {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub description: Option<String>,
    pub tags: Option<serde_json::Value>,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
}

/// A product gallery image.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PublicProductImage {
    pub id: i32,
    pub path: String,
}

/// An active slider/banner.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PublicSlider {
    pub id: i32,
    pub title: String,
    pub subtitle: Option<String>,
    pub label: Option<String>,
    pub image: Option<String>,
    pub link: Option<String>,
    pub kind: i16,
    pub price_original: Option<Decimal>,
    pub price_campaign: Option<Decimal>,
    pub color: Option<String>,
}

/// A top-level category with its live product count.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PublicCategory {
    pub id: i32,
    pub name: String,
    pub image: Option<String>,
    pub products_count: i64,
}

const PRODUCT_COLUMNS: &str =
    "id, title, slug, price, image, description, tags, stock, created_at";

/// Repository for published catalog reads.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All published products of a store, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn published_products(
        &self,
        user_id: UserId,
    ) -> Result<Vec<PublicProduct>, RepositoryError> {
        let rows = sqlx::query_as::<_, PublicProduct>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE user_id = $1 AND state = 'published' AND deleted_at IS NULL
             ORDER BY id DESC"
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// One published product by id (any store).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_by_id(
        &self,
        product_id: i32,
    ) -> Result<Option<PublicProduct>, RepositoryError> {
        let row = sqlx::query_as::<_, PublicProduct>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE id = $1 AND state = 'published' AND deleted_at IS NULL"
        ))
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// A published product by slug within one store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_by_slug(
        &self,
        user_id: UserId,
        slug: &str,
    ) -> Result<Option<PublicProduct>, RepositoryError> {
        let row = sqlx::query_as::<_, PublicProduct>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE user_id = $1 AND slug = $2 AND state = 'published' AND deleted_at IS NULL"
        ))
        .bind(user_id.as_i32())
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Gallery images of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn product_images(
        &self,
        product_id: i32,
    ) -> Result<Vec<PublicProductImage>, RepositoryError> {
        let rows = sqlx::query_as::<_, PublicProductImage>(
            "SELECT id, path FROM product_images WHERE product_id = $1 ORDER BY id",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Active sliders of a store, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn active_sliders(
        &self,
        user_id: UserId,
    ) -> Result<Vec<PublicSlider>, RepositoryError> {
        let rows = sqlx::query_as::<_, PublicSlider>(
            "SELECT id, title, subtitle, label, image, link, kind,
                    price_original, price_campaign, color
             FROM sliders WHERE user_id = $1 AND state ORDER BY id DESC",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Up to `limit` random top-level categories with live product counts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn featured_categories(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<PublicCategory>, RepositoryError> {
        let rows = sqlx::query_as::<_, PublicCategory>(
            "SELECT c.id, c.name, c.image,
                    (SELECT COUNT(*) FROM products p
                     WHERE p.category_first_id = c.id AND p.deleted_at IS NULL
                       AND p.state = 'published') AS products_count
             FROM categories c
             WHERE c.user_id = $1 AND c.depth = 1 AND c.state
             ORDER BY random() LIMIT $2",
        )
        .bind(user_id.as_i32())
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
