//! Custom domain repository (1:1 with the tenant).

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use treggio_core::{DomainId, UserId};

use super::RepositoryError;
use crate::models::store::CustomDomain;

const DOMAIN_COLUMNS: &str =
    "id, user_id, domain, is_verified, verification_code, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct DomainRow {
    id: i32,
    user_id: i32,
    domain: String,
    is_verified: bool,
    verification_code: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DomainRow> for CustomDomain {
    fn from(row: DomainRow) -> Self {
        Self {
            id: DomainId::new(row.id),
            user_id: UserId::new(row.user_id),
            domain: row.domain,
            is_verified: row.is_verified,
            verification_code: row.verification_code,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for custom domains.
pub struct DomainRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DomainRepository<'a> {
    /// Create a new domain repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The tenant's connected domain, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<CustomDomain>, RepositoryError> {
        let row = sqlx::query_as::<_, DomainRow>(&format!(
            "SELECT {DOMAIN_COLUMNS} FROM custom_domains WHERE user_id = $1"
        ))
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Whether a domain is already connected by any tenant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn domain_taken(
        &self,
        domain: &str,
        exclude_user: Option<UserId>,
    ) -> Result<bool, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM custom_domains
             WHERE domain = $1 AND ($2::int IS NULL OR user_id <> $2)",
        )
        .bind(domain)
        .bind(exclude_user.map(|id| id.as_i32()))
        .fetch_one(self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Connect (or replace) the tenant's domain, resetting verification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the domain belongs to another
    /// tenant.
    pub async fn upsert(
        &self,
        user_id: UserId,
        domain: &str,
        verification_code: &str,
    ) -> Result<CustomDomain, RepositoryError> {
        let row = sqlx::query_as::<_, DomainRow>(&format!(
            "INSERT INTO custom_domains (user_id, domain, verification_code, is_verified)
             VALUES ($1, $2, $3, FALSE)
             ON CONFLICT (user_id)
             DO UPDATE SET domain = EXCLUDED.domain,
                           verification_code = EXCLUDED.verification_code,
                           is_verified = FALSE, updated_at = now()
             RETURNING {DOMAIN_COLUMNS}"
        ))
        .bind(user_id.as_i32())
        .bind(domain)
        .bind(verification_code)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_sqlx(e, "domain already connected to another store"))?;
        Ok(row.into())
    }

    /// Mark the tenant's domain as verified.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the tenant has no domain.
    pub async fn mark_verified(&self, user_id: UserId) -> Result<CustomDomain, RepositoryError> {
        let row = sqlx::query_as::<_, DomainRow>(&format!(
            "UPDATE custom_domains SET is_verified = TRUE, updated_at = now()
             WHERE user_id = $1
             RETURNING {DOMAIN_COLUMNS}"
        ))
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        Ok(row.into())
    }

    /// Disconnect the tenant's domain, returning the removed host name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the tenant has no domain.
    pub async fn delete_for_user(&self, user_id: UserId) -> Result<String, RepositoryError> {
        let domain: Option<String> = sqlx::query_scalar(
            "DELETE FROM custom_domains WHERE user_id = $1 RETURNING domain",
        )
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;
        domain.ok_or(RepositoryError::NotFound)
    }
}
