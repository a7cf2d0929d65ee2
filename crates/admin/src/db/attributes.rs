//! Attribute and property repository (tenant-scoped).

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use treggio_core::{AttributeId, PropertyId, UserId};

use super::{PAGE_SIZE, RepositoryError, page_offset};
use crate::models::catalog::{Attribute, Property};

#[derive(Debug, sqlx::FromRow)]
struct AttributeRow {
    id: i32,
    user_id: i32,
    name: String,
    kind: String,
    state: bool,
    created_at: DateTime<Utc>,
}

impl From<AttributeRow> for Attribute {
    fn from(row: AttributeRow) -> Self {
        Self {
            id: AttributeId::new(row.id),
            user_id: UserId::new(row.user_id),
            name: row.name,
            kind: row.kind,
            state: row.state,
            created_at: row.created_at,
            properties: Vec::new(),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PropertyRow {
    id: i32,
    attribute_id: i32,
    name: String,
    code: Option<String>,
}

impl From<PropertyRow> for Property {
    fn from(row: PropertyRow) -> Self {
        Self {
            id: PropertyId::new(row.id),
            attribute_id: AttributeId::new(row.attribute_id),
            name: row.name,
            code: row.code,
        }
    }
}

/// Repository for attribute/property operations.
pub struct AttributeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AttributeRepository<'a> {
    /// Create a new attribute repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Paginated name-filtered listing with properties attached, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        user_id: UserId,
        search: Option<&str>,
        page: i64,
    ) -> Result<(Vec<Attribute>, i64), RepositoryError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM attributes
             WHERE user_id = $1 AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')",
        )
        .bind(user_id.as_i32())
        .bind(search)
        .fetch_one(self.pool)
        .await?;

        let rows = sqlx::query_as::<_, AttributeRow>(
            "SELECT id, user_id, name, kind, state, created_at FROM attributes
             WHERE user_id = $1 AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
             ORDER BY id DESC LIMIT $3 OFFSET $4",
        )
        .bind(user_id.as_i32())
        .bind(search)
        .bind(PAGE_SIZE)
        .bind(page_offset(page, PAGE_SIZE))
        .fetch_all(self.pool)
        .await?;

        let mut attributes: Vec<Attribute> = rows.into_iter().map(Into::into).collect();
        self.attach_properties(&mut attributes).await?;
        Ok((attributes, total))
    }

    /// All of a tenant's active attributes with properties (variation config).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self, user_id: UserId) -> Result<Vec<Attribute>, RepositoryError> {
        let rows = sqlx::query_as::<_, AttributeRow>(
            "SELECT id, user_id, name, kind, state, created_at FROM attributes
             WHERE user_id = $1 AND state ORDER BY name",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        let mut attributes: Vec<Attribute> = rows.into_iter().map(Into::into).collect();
        self.attach_properties(&mut attributes).await?;
        Ok(attributes)
    }

    async fn attach_properties(
        &self,
        attributes: &mut [Attribute],
    ) -> Result<(), RepositoryError> {
        if attributes.is_empty() {
            return Ok(());
        }

        let ids: Vec<i32> = attributes.iter().map(|a| a.id.as_i32()).collect();
        let rows = sqlx::query_as::<_, PropertyRow>(
            "SELECT id, attribute_id, name, code FROM properties
             WHERE attribute_id = ANY($1) ORDER BY id",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        for row in rows {
            let property: Property = row.into();
            if let Some(attribute) = attributes
                .iter_mut()
                .find(|a| a.id == property.attribute_id)
            {
                attribute.properties.push(property);
            }
        }
        Ok(())
    }

    /// Whether an attribute name is already used by this tenant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn name_taken(
        &self,
        user_id: UserId,
        name: &str,
        exclude: Option<AttributeId>,
    ) -> Result<bool, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM attributes
             WHERE user_id = $1 AND name = $2 AND ($3::int IS NULL OR id <> $3)",
        )
        .bind(user_id.as_i32())
        .bind(name)
        .bind(exclude.map(|id| id.as_i32()))
        .fetch_one(self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Create an attribute.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        user_id: UserId,
        name: &str,
        kind: &str,
        state: bool,
    ) -> Result<Attribute, RepositoryError> {
        let row = sqlx::query_as::<_, AttributeRow>(
            "INSERT INTO attributes (user_id, name, kind, state) VALUES ($1, $2, $3, $4)
             RETURNING id, user_id, name, kind, state, created_at",
        )
        .bind(user_id.as_i32())
        .bind(name)
        .bind(kind)
        .bind(state)
        .fetch_one(self.pool)
        .await?;
        Ok(row.into())
    }

    /// Update a tenant's attribute.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the attribute is not the tenant's.
    pub async fn update(
        &self,
        user_id: UserId,
        id: AttributeId,
        name: &str,
        kind: &str,
        state: bool,
    ) -> Result<Attribute, RepositoryError> {
        let row = sqlx::query_as::<_, AttributeRow>(
            "UPDATE attributes SET name = $3, kind = $4, state = $5
             WHERE id = $1 AND user_id = $2
             RETURNING id, user_id, name, kind, state, created_at",
        )
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .bind(name)
        .bind(kind)
        .bind(state)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let mut attribute: Attribute = row.into();
        self.attach_properties(std::slice::from_mut(&mut attribute))
            .await?;
        Ok(attribute)
    }

    /// Delete a tenant's attribute (properties cascade).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the attribute is not the tenant's.
    pub async fn delete(&self, user_id: UserId, id: AttributeId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM attributes WHERE id = $1 AND user_id = $2")
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
    // Properties
    // =========================================================================

    /// Whether a property name already exists under an attribute.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn property_name_taken(
        &self,
        attribute_id: AttributeId,
        name: &str,
    ) -> Result<bool, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM properties WHERE attribute_id = $1 AND name = $2",
        )
        .bind(attribute_id.as_i32())
        .bind(name)
        .fetch_one(self.pool)
        .await?;
        Ok(count > 0)
    }

    /// Add a property under one of the tenant's attributes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the attribute is not the tenant's.
    pub async fn create_property(
        &self,
        user_id: UserId,
        attribute_id: AttributeId,
        name: &str,
        code: Option<&str>,
    ) -> Result<Property, RepositoryError> {
        let owned: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM attributes WHERE id = $1 AND user_id = $2")
                .bind(attribute_id.as_i32())
                .bind(user_id.as_i32())
                .fetch_one(self.pool)
                .await?;
        if owned == 0 {
            return Err(RepositoryError::NotFound);
        }

        let row = sqlx::query_as::<_, PropertyRow>(
            "INSERT INTO properties (attribute_id, name, code) VALUES ($1, $2, $3)
             RETURNING id, attribute_id, name, code",
        )
        .bind(attribute_id.as_i32())
        .bind(name)
        .bind(code)
        .fetch_one(self.pool)
        .await?;
        Ok(row.into())
    }

    /// Remove a property, verifying tenant ownership through its attribute.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` for properties outside the tenant.
    pub async fn delete_property(
        &self,
        user_id: UserId,
        property_id: PropertyId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM properties p
             USING attributes a
             WHERE p.id = $1 AND p.attribute_id = a.id AND a.user_id = $2",
        )
        .bind(property_id.as_i32())
        .bind(user_id.as_i32())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
