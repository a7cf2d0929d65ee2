//! Merchant account repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use treggio_core::{Email, PlanId, Slug, StoreFont, SubscriptionStatus, UserId};

use super::RepositoryError;
use crate::models::user::{ProfileUpdate, User};

const USER_COLUMNS: &str = "id, name, surname, phone, email, email_verified_at, store_name, slug, \
     avatar, popup, description, address, gender, mission, vision, \
     facebook, instagram, tiktok, youtube, menu_color, button_color, button_radius, \
     font, plan_id, subscription_id, subscription_status, created_at, updated_at";

/// Internal row type for merchant queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    surname: String,
    phone: String,
    email: String,
    email_verified_at: Option<DateTime<Utc>>,
    store_name: String,
    slug: String,
    avatar: Option<String>,
    popup: Option<String>,
    description: Option<String>,
    address: Option<String>,
    gender: Option<String>,
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
    plan_id: i32,
    subscription_id: Option<String>,
    subscription_status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid slug in database: {e}"))
        })?;
        let font = StoreFont::from_name(&row.font).ok_or_else(|| {
            RepositoryError::DataCorruption(format!("unknown store font: {}", row.font))
        })?;
        let subscription_status = SubscriptionStatus::from_gateway(&row.subscription_status)
            .ok_or_else(|| {
                RepositoryError::DataCorruption(format!(
                    "unknown subscription status: {}",
                    row.subscription_status
                ))
            })?;

        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            surname: row.surname,
            phone: row.phone,
            email,
            email_verified_at: row.email_verified_at,
            store_name: row.store_name,
            slug,
            avatar: row.avatar,
            popup: row.popup,
            description: row.description,
            address: row.address,
            gender: row.gender,
            mission: row.mission,
            vision: row.vision,
            facebook: row.facebook,
            instagram: row.instagram,
            tiktok: row.tiktok,
            youtube: row.youtube,
            menu_color: row.menu_color,
            button_color: row.button_color,
            button_radius: row.button_radius,
            font,
            plan_id: PlanId::new(row.plan_id),
            subscription_id: row.subscription_id,
            subscription_status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Fields required to create a merchant account.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub surname: &'a str,
    pub phone: &'a str,
    pub email: &'a Email,
    pub password_hash: &'a str,
    pub store_name: &'a str,
    pub slug: &'a Slug,
    /// Emailed activation code; `None` when the account is born verified
    /// (webhook-confirmed paid registrations).
    pub activation_code: Option<&'a str>,
    pub plan_id: PlanId,
    pub subscription_id: Option<&'a str>,
    pub subscription_status: SubscriptionStatus,
}

/// Repository for merchant account operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a merchant by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a merchant by email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a merchant by store slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(&self, slug: &Slug) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE slug = $1 AND deleted_at IS NULL"
        ))
        .bind(slug.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get the merchant holding a gateway preapproval id, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE subscription_id = $1 AND deleted_at IS NULL"
        ))
        .bind(subscription_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Whether an email is already registered (optionally excluding a user).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn email_taken(
        &self,
        email: &Email,
        exclude: Option<UserId>,
    ) -> Result<bool, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users
             WHERE email = $1 AND deleted_at IS NULL AND ($2::int IS NULL OR id <> $2)",
        )
        .bind(email.as_str())
        .bind(exclude.map(|id| id.as_i32()))
        .fetch_one(self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Whether a store slug is already in use (optionally excluding a user).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn slug_taken(
        &self,
        slug: &Slug,
        exclude: Option<UserId>,
    ) -> Result<bool, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users
             WHERE slug = $1 AND deleted_at IS NULL AND ($2::int IS NULL OR id <> $2)",
        )
        .bind(slug.as_str())
        .bind(exclude.map(|id| id.as_i32()))
        .fetch_one(self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Create a merchant account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or slug is taken.
    pub async fn create(&self, new_user: NewUser<'_>) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users
                 (name, surname, phone, email, password_hash, store_name, slug,
                  activation_code, email_verified_at, font, plan_id,
                  subscription_id, subscription_status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8,
                     CASE WHEN $8::text IS NULL THEN now() END,
                     $9, $10, $11, $12)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(new_user.name)
        .bind(new_user.surname)
        .bind(new_user.phone)
        .bind(new_user.email.as_str())
        .bind(new_user.password_hash)
        .bind(new_user.store_name)
        .bind(new_user.slug.as_str())
        .bind(new_user.activation_code)
        .bind(StoreFont::default().name())
        .bind(new_user.plan_id.as_i32())
        .bind(new_user.subscription_id)
        .bind(status_str(new_user.subscription_status))
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "email or store slug already registered"))?;

        row.try_into()
    }

    /// Get the password hash for a login attempt, together with the account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct CredentialRow {
            password_hash: String,
            #[sqlx(flatten)]
            user: UserRow,
        }

        let row = sqlx::query_as::<_, CredentialRow>(&format!(
            "SELECT password_hash, {USER_COLUMNS} FROM users
             WHERE email = $1 AND deleted_at IS NULL"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };
        let hash = row.password_hash;
        let user: User = row.user.try_into()?;

        Ok(Some((user, hash)))
    }

    /// Replace a merchant's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_password(&self, id: UserId, hash: &str) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(id.as_i32())
            .bind(hash)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Mark the account holding an activation code as verified.
    ///
    /// Returns the user on success, `None` for an unknown code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn verify_by_activation_code(
        &self,
        code: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET email_verified_at = now(), updated_at = now()
             WHERE activation_code = $1 AND deleted_at IS NULL
             RETURNING {USER_COLUMNS}"
        ))
        .bind(code)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Store a password-reset code for the account with this email.
    ///
    /// Returns the user when the email exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_reset_code(
        &self,
        email: &Email,
        code: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET reset_code = $2, updated_at = now()
             WHERE email = $1 AND deleted_at IS NULL
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email.as_str())
        .bind(code)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Look up the account holding a password-reset code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_reset_code(&self, code: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE reset_code = $1 AND deleted_at IS NULL"
        ))
        .bind(code)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Set a new password for the account holding a reset code, clearing the
    /// code. Returns `false` for an unknown code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn reset_password(&self, code: &str, hash: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, reset_code = NULL, updated_at = now()
             WHERE reset_code = $1 AND deleted_at IS NULL",
        )
        .bind(code)
        .bind(hash)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply a profile update; `None` fields are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a new email or slug collides.
    pub async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET
                 name = COALESCE($2, name),
                 surname = COALESCE($3, surname),
                 phone = COALESCE($4, phone),
                 email = COALESCE($5, email),
                 store_name = COALESCE($6, store_name),
                 slug = COALESCE($7, slug),
                 description = COALESCE($8, description),
                 address = COALESCE($9, address),
                 gender = COALESCE($10, gender),
                 mission = COALESCE($11, mission),
                 vision = COALESCE($12, vision),
                 facebook = COALESCE($13, facebook),
                 instagram = COALESCE($14, instagram),
                 tiktok = COALESCE($15, tiktok),
                 youtube = COALESCE($16, youtube),
                 menu_color = COALESCE($17, menu_color),
                 button_color = COALESCE($18, button_color),
                 button_radius = COALESCE($19, button_radius),
                 avatar = COALESCE($20, avatar),
                 popup = COALESCE($21, popup),
                 updated_at = now()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(update.name.as_deref())
        .bind(update.surname.as_deref())
        .bind(update.phone.as_deref())
        .bind(update.email.as_ref().map(Email::as_str))
        .bind(update.store_name.as_deref())
        .bind(update.slug.as_ref().map(Slug::as_str))
        .bind(update.description.as_deref())
        .bind(update.address.as_deref())
        .bind(update.gender.as_deref())
        .bind(update.mission.as_deref())
        .bind(update.vision.as_deref())
        .bind(update.facebook.as_deref())
        .bind(update.instagram.as_deref())
        .bind(update.tiktok.as_deref())
        .bind(update.youtube.as_deref())
        .bind(update.menu_color.as_deref())
        .bind(update.button_color.as_deref())
        .bind(update.button_radius.as_deref())
        .bind(update.avatar.as_deref())
        .bind(update.popup.as_deref())
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "email or store slug already registered"))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Clear the popup image, returning the removed path.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_popup(&self, id: UserId) -> Result<Option<String>, RepositoryError> {
        let old: Option<Option<String>> =
            sqlx::query_scalar("SELECT popup FROM users WHERE id = $1")
                .bind(id.as_i32())
                .fetch_optional(self.pool)
                .await?;

        sqlx::query("UPDATE users SET popup = NULL, updated_at = now() WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(old.flatten())
    }

    /// Change the storefront font.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_font(&self, id: UserId, font: StoreFont) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET font = $2, updated_at = now() WHERE id = $1")
            .bind(id.as_i32())
            .bind(font.name())
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Move a merchant onto a plan, recording the gateway subscription state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_plan(
        &self,
        id: UserId,
        plan_id: PlanId,
        subscription_id: Option<&str>,
        status: SubscriptionStatus,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE users SET plan_id = $2, subscription_id = $3,
                 subscription_status = $4, updated_at = now()
             WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(plan_id.as_i32())
        .bind(subscription_id)
        .bind(status_str(status))
        .execute(self.pool)
        .await?;
        Ok(())
    }
}

const fn status_str(status: SubscriptionStatus) -> &'static str {
    match status {
        SubscriptionStatus::Pending => "pending",
        SubscriptionStatus::Authorized => "authorized",
        SubscriptionStatus::Paused => "paused",
        SubscriptionStatus::Cancelled => "cancelled",
    }
}
