//! Marketing pixel repository (tenant-scoped, one row per platform).

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use treggio_core::{PixelId, PixelPlatform, UserId};

use super::RepositoryError;
use crate::models::store::Pixel;

const PIXEL_COLUMNS: &str = "id, user_id, platform, pixel_id, is_active, created_at";

#[derive(Debug, sqlx::FromRow)]
struct PixelRow {
    id: i32,
    user_id: i32,
    platform: String,
    pixel_id: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<PixelRow> for Pixel {
    type Error = RepositoryError;

    fn try_from(row: PixelRow) -> Result<Self, Self::Error> {
        let platform = match row.platform.as_str() {
            "meta" => PixelPlatform::Meta,
            "google_ads" => PixelPlatform::GoogleAds,
            "tiktok" => PixelPlatform::Tiktok,
            other => {
                return Err(RepositoryError::DataCorruption(format!(
                    "unknown pixel platform: {other}"
                )));
            }
        };

        Ok(Self {
            id: PixelId::new(row.id),
            user_id: UserId::new(row.user_id),
            platform,
            pixel_id: row.pixel_id,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

/// Repository for tracking pixels.
pub struct PixelRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PixelRepository<'a> {
    /// Create a new pixel repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All of a tenant's pixels.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Pixel>, RepositoryError> {
        let rows = sqlx::query_as::<_, PixelRow>(&format!(
            "SELECT {PIXEL_COLUMNS} FROM user_pixels WHERE user_id = $1 ORDER BY platform"
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Active pixels only (public tracking snippet endpoint).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self, user_id: UserId) -> Result<Vec<Pixel>, RepositoryError> {
        let rows = sqlx::query_as::<_, PixelRow>(&format!(
            "SELECT {PIXEL_COLUMNS} FROM user_pixels
             WHERE user_id = $1 AND is_active ORDER BY platform"
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Insert or replace the tenant's pixel for a platform.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        user_id: UserId,
        platform: PixelPlatform,
        pixel_id: &str,
    ) -> Result<Pixel, RepositoryError> {
        let row = sqlx::query_as::<_, PixelRow>(&format!(
            "INSERT INTO user_pixels (user_id, platform, pixel_id, is_active)
             VALUES ($1, $2, $3, TRUE)
             ON CONFLICT (user_id, platform)
             DO UPDATE SET pixel_id = EXCLUDED.pixel_id, is_active = TRUE
             RETURNING {PIXEL_COLUMNS}"
        ))
        .bind(user_id.as_i32())
        .bind(platform.as_str())
        .bind(pixel_id)
        .fetch_one(self.pool)
        .await?;
        row.try_into()
    }

    /// Delete a tenant's pixel by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the pixel is not the tenant's.
    pub async fn delete(&self, user_id: UserId, id: PixelId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM user_pixels WHERE id = $1 AND user_id = $2")
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
