//! Public store (tenant) lookups.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use treggio_core::{StoreFont, UserId};

use super::RepositoryError;

/// Public-facing store profile. Never exposes credentials or billing state.
#[derive(Debug, Clone, Serialize)]
pub struct PublicStore {
    pub id: UserId,
    pub name: String,
    pub surname: String,
    pub store_name: String,
    pub slug: String,
    pub avatar: Option<String>,
    pub popup: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: String,
    pub mission: Option<String>,
    pub vision: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub tiktok: Option<String>,
    pub youtube: Option<String>,
    pub menu_color: Option<String>,
    pub button_color: Option<String>,
    pub button_radius: Option<String>,
    #[serde(skip)]
    pub font: StoreFont,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct StoreRow {
    id: i32,
    name: String,
    surname: String,
    store_name: String,
    slug: String,
    avatar: Option<String>,
    popup: Option<String>,
    description: Option<String>,
    address: Option<String>,
    phone: String,
    mission: Option<String>,
    vision: Option<String>,
    facebook: Option<String>,
    instagram: Option<String>,
    tiktok: Option<String>,
    youtube: Option<String>,
    menu_color: Option<String>,
    button_color: Option<String>,
    button_radius: Option<String>,
    font: String,
    created_at: DateTime<Utc>,
}

impl From<StoreRow> for PublicStore {
    fn from(row: StoreRow) -> Self {
        Self {
            id: UserId::new(row.id),
            name: row.name,
            surname: row.surname,
            store_name: row.store_name,
            slug: row.slug,
            avatar: row.avatar,
            popup: row.popup,
            description: row.description,
            address: row.address,
            phone: row.phone,
            mission: row.mission,
            vision: row.vision,
            facebook: row.facebook,
            instagram: row.instagram,
            tiktok: row.tiktok,
            youtube: row.youtube,
            menu_color: row.menu_color,
            button_color: row.button_color,
            button_radius: row.button_radius,
            font: StoreFont::from_name(&row.font).unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

/// A tenant's shipping configuration as shown to buyers.
#[derive(Debug, Clone, Serialize)]
pub struct PublicShipping {
    pub is_free: bool,
    pub shipping_rate: Decimal,
}

/// An active payment method offered by a store.
#[derive(Debug, Clone, Serialize)]
pub struct PublicPaymentMethod {
    pub id: i32,
    pub name: String,
}

/// An active tracking pixel.
#[derive(Debug, Clone, Serialize)]
pub struct PublicPixel {
    pub platform: String,
    pub pixel_id: String,
}

/// A storefront announcement.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PublicNotice {
    pub content: String,
    pub styles: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

const STORE_COLUMNS: &str = "id, name, surname, store_name, slug, avatar, popup, description, \
     address, phone, mission, vision, facebook, instagram, tiktok, youtube, \
     menu_color, button_color, button_radius, font, created_at";

/// Repository for public store lookups.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Find a store by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<PublicStore>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM users WHERE slug = $1 AND deleted_at IS NULL"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Find a store by its numeric id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: i32) -> Result<Option<PublicStore>, RepositoryError> {
        let row = sqlx::query_as::<_, StoreRow>(&format!(
            "SELECT {STORE_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Resolve a verified custom domain to its store's slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn slug_for_domain(&self, domain: &str) -> Result<Option<String>, RepositoryError> {
        let slug: Option<String> = sqlx::query_scalar(
            "SELECT u.slug FROM custom_domains cd
             JOIN users u ON u.id = cd.user_id
             WHERE cd.domain = $1 AND cd.is_verified AND u.deleted_at IS NULL",
        )
        .bind(domain)
        .fetch_optional(self.pool)
        .await?;
        Ok(slug)
    }

    /// The store's shipping configuration (defaults to free shipping when
    /// the merchant never configured it).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn shipping(&self, user_id: UserId) -> Result<PublicShipping, RepositoryError> {
        let row: Option<(bool, Decimal)> = sqlx::query_as(
            "SELECT is_free, rate FROM user_shipping_options WHERE user_id = $1",
        )
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        let (is_free, shipping_rate) = row.unwrap_or((true, Decimal::ZERO));
        Ok(PublicShipping {
            is_free,
            shipping_rate,
        })
    }

    /// The store's active payment methods.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn payment_methods(
        &self,
        user_id: UserId,
    ) -> Result<Vec<PublicPaymentMethod>, RepositoryError> {
        let rows: Vec<(i32, String)> = sqlx::query_as(
            "SELECT pm.id, pm.name
             FROM payment_methods pm
             JOIN user_payment_methods upm ON upm.payment_method_id = pm.id
             WHERE upm.user_id = $1 AND pm.is_active
             ORDER BY pm.id",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| PublicPaymentMethod { id, name })
            .collect())
    }

    /// The store's active tracking pixels.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn pixels(&self, user_id: UserId) -> Result<Vec<PublicPixel>, RepositoryError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT platform, pixel_id FROM user_pixels
             WHERE user_id = $1 AND is_active ORDER BY platform",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(platform, pixel_id)| PublicPixel { platform, pixel_id })
            .collect())
    }

    /// The store's latest announcement, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest_notice(
        &self,
        user_id: UserId,
    ) -> Result<Option<PublicNotice>, RepositoryError> {
        let row = sqlx::query_as::<_, PublicNotice>(
            "SELECT content, styles, created_at FROM notices
             WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }
}
