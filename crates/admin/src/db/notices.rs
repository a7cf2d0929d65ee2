//! Notice ("aviso") repository (tenant-scoped).

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use treggio_core::{NoticeId, UserId};

use super::RepositoryError;
use crate::models::store::Notice;

const NOTICE_COLUMNS: &str = "id, user_id, content, styles, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct NoticeRow {
    id: i32,
    user_id: i32,
    content: String,
    styles: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<NoticeRow> for Notice {
    fn from(row: NoticeRow) -> Self {
        Self {
            id: NoticeId::new(row.id),
            user_id: UserId::new(row.user_id),
            content: row.content,
            styles: row.styles,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for storefront notices.
pub struct NoticeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NoticeRepository<'a> {
    /// Create a new notice repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All of a tenant's notices, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Notice>, RepositoryError> {
        let rows = sqlx::query_as::<_, NoticeRow>(&format!(
            "SELECT {NOTICE_COLUMNS} FROM notices WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// The tenant's most recent notice, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest(&self, user_id: UserId) -> Result<Option<Notice>, RepositoryError> {
        let row = sqlx::query_as::<_, NoticeRow>(&format!(
            "SELECT {NOTICE_COLUMNS} FROM notices
             WHERE user_id = $1 ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Create a notice.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        user_id: UserId,
        content: &str,
        styles: Option<&serde_json::Value>,
    ) -> Result<Notice, RepositoryError> {
        let row = sqlx::query_as::<_, NoticeRow>(&format!(
            "INSERT INTO notices (user_id, content, styles) VALUES ($1, $2, $3)
             RETURNING {NOTICE_COLUMNS}"
        ))
        .bind(user_id.as_i32())
        .bind(content)
        .bind(styles)
        .fetch_one(self.pool)
        .await?;
        Ok(row.into())
    }

    /// Update a tenant's notice.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the notice is not the tenant's.
    pub async fn update(
        &self,
        user_id: UserId,
        id: NoticeId,
        content: &str,
        styles: Option<&serde_json::Value>,
    ) -> Result<Notice, RepositoryError> {
        let row = sqlx::query_as::<_, NoticeRow>(&format!(
            "UPDATE notices SET content = $3, styles = $4, updated_at = now()
             WHERE id = $1 AND user_id = $2
             RETURNING {NOTICE_COLUMNS}"
        ))
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .bind(content)
        .bind(styles)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        Ok(row.into())
    }

    /// Delete a tenant's notice.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the notice is not the tenant's.
    pub async fn delete(&self, user_id: UserId, id: NoticeId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM notices WHERE id = $1 AND user_id = $2")
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
