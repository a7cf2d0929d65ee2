//! Slider repository (tenant-scoped).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use treggio_core::{SliderId, UserId};

use super::{PAGE_SIZE, RepositoryError, page_offset};
use crate::models::store::Slider;

const SLIDER_COLUMNS: &str = "id, user_id, title, subtitle, label, image, link, state, kind, \
     price_original, price_campaign, color, created_at";

#[derive(Debug, sqlx::FromRow)]
struct SliderRow {
    id: i32,
    user_id: i32,
    title: String,
    subtitle: Option<String>,
    label: Option<String>,
    image: Option<String>,
    link: Option<String>,
    state: bool,
    kind: i16,
    price_original: Option<Decimal>,
    price_campaign: Option<Decimal>,
    color: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<SliderRow> for Slider {
    fn from(row: SliderRow) -> Self {
        Self {
            id: SliderId::new(row.id),
            user_id: UserId::new(row.user_id),
            title: row.title,
            subtitle: row.subtitle,
            label: row.label,
            image: row.image,
            link: row.link,
            state: row.state,
            kind: row.kind,
            price_original: row.price_original,
            price_campaign: row.price_campaign,
            color: row.color,
            created_at: row.created_at,
        }
    }
}

/// Fields for creating or updating a slider.
#[derive(Debug, Clone)]
pub struct SliderInput<'a> {
    pub title: &'a str,
    pub subtitle: Option<&'a str>,
    pub label: Option<&'a str>,
    pub image: Option<&'a str>,
    pub link: Option<&'a str>,
    pub state: bool,
    pub kind: i16,
    pub price_original: Option<Decimal>,
    pub price_campaign: Option<Decimal>,
    pub color: Option<&'a str>,
}

/// Repository for slider operations.
pub struct SliderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SliderRepository<'a> {
    /// Create a new slider repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Paginated title-filtered listing, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        user_id: UserId,
        search: Option<&str>,
        page: i64,
    ) -> Result<(Vec<Slider>, i64), RepositoryError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sliders
             WHERE user_id = $1 AND ($2::text IS NULL OR title ILIKE '%' || $2 || '%')",
        )
        .bind(user_id.as_i32())
        .bind(search)
        .fetch_one(self.pool)
        .await?;

        let rows = sqlx::query_as::<_, SliderRow>(&format!(
            "SELECT {SLIDER_COLUMNS} FROM sliders
             WHERE user_id = $1 AND ($2::text IS NULL OR title ILIKE '%' || $2 || '%')
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

    /// Get a tenant's slider by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        user_id: UserId,
        id: SliderId,
    ) -> Result<Option<Slider>, RepositoryError> {
        let row = sqlx::query_as::<_, SliderRow>(&format!(
            "SELECT {SLIDER_COLUMNS} FROM sliders WHERE id = $1 AND user_id = $2"
        ))
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Create a slider.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        user_id: UserId,
        input: &SliderInput<'_>,
    ) -> Result<Slider, RepositoryError> {
        let row = sqlx::query_as::<_, SliderRow>(&format!(
            "INSERT INTO sliders
                 (user_id, title, subtitle, label, image, link, state, kind,
                  price_original, price_campaign, color)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {SLIDER_COLUMNS}"
        ))
        .bind(user_id.as_i32())
        .bind(input.title)
        .bind(input.subtitle)
        .bind(input.label)
        .bind(input.image)
        .bind(input.link)
        .bind(input.state)
        .bind(input.kind)
        .bind(input.price_original)
        .bind(input.price_campaign)
        .bind(input.color)
        .fetch_one(self.pool)
        .await?;
        Ok(row.into())
    }

    /// Update a tenant's slider.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the slider is not the tenant's.
    pub async fn update(
        &self,
        user_id: UserId,
        id: SliderId,
        input: &SliderInput<'_>,
    ) -> Result<Slider, RepositoryError> {
        let row = sqlx::query_as::<_, SliderRow>(&format!(
            "UPDATE sliders SET
                 title = $3, subtitle = $4, label = $5, image = COALESCE($6, image),
                 link = $7, state = $8, kind = $9, price_original = $10,
                 price_campaign = $11, color = $12
             WHERE id = $1 AND user_id = $2
             RETURNING {SLIDER_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .bind(input.title)
        .bind(input.subtitle)
        .bind(input.label)
        .bind(input.image)
        .bind(input.link)
        .bind(input.state)
        .bind(input.kind)
        .bind(input.price_original)
        .bind(input.price_campaign)
        .bind(input.color)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        Ok(row.into())
    }

    /// Delete a tenant's slider, returning its image path for cleanup.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the slider is not the tenant's.
    pub async fn delete(
        &self,
        user_id: UserId,
        id: SliderId,
    ) -> Result<Option<String>, RepositoryError> {
        let row: Option<Option<String>> = sqlx::query_scalar(
            "DELETE FROM sliders WHERE id = $1 AND user_id = $2 RETURNING image",
        )
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map_or(Err(RepositoryError::NotFound), |image| Ok(image))
    }
}
