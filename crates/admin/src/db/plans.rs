//! Plan catalog repository.

use rust_decimal::Decimal;
use sqlx::PgPool;

use treggio_core::PlanId;

use super::RepositoryError;
use crate::models::billing::Plan;

#[derive(Debug, sqlx::FromRow)]
struct PlanRow {
    id: i32,
    name: String,
    price: Decimal,
    description: Option<String>,
    gateway_plan_id: Option<String>,
    product_limit: Option<i32>,
    is_free: bool,
}

impl From<PlanRow> for Plan {
    fn from(row: PlanRow) -> Self {
        Self {
            id: PlanId::new(row.id),
            name: row.name,
            price: row.price,
            description: row.description,
            gateway_plan_id: row.gateway_plan_id,
            product_limit: row.product_limit,
            is_free: row.is_free,
        }
    }
}

const PLAN_COLUMNS: &str = "id, name, price, description, gateway_plan_id, product_limit, is_free";

/// Repository for the subscription plan catalog.
pub struct PlanRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PlanRepository<'a> {
    /// Create a new plan repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all plans, cheapest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Plan>, RepositoryError> {
        let rows = sqlx::query_as::<_, PlanRow>(&format!(
            "SELECT {PLAN_COLUMNS} FROM plans ORDER BY price ASC"
        ))
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a plan by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PlanId) -> Result<Option<Plan>, RepositoryError> {
        let row = sqlx::query_as::<_, PlanRow>(&format!(
            "SELECT {PLAN_COLUMNS} FROM plans WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Get the free plan (the landing tier for downgrades).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no free plan is seeded.
    pub async fn get_free(&self) -> Result<Plan, RepositoryError> {
        let row = sqlx::query_as::<_, PlanRow>(&format!(
            "SELECT {PLAN_COLUMNS} FROM plans WHERE is_free ORDER BY id LIMIT 1"
        ))
        .fetch_optional(self.pool)
        .await?;
        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Get the plan associated with a gateway preapproval plan id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_gateway_plan(
        &self,
        gateway_plan_id: &str,
    ) -> Result<Option<Plan>, RepositoryError> {
        let row = sqlx::query_as::<_, PlanRow>(&format!(
            "SELECT {PLAN_COLUMNS} FROM plans WHERE gateway_plan_id = $1"
        ))
        .bind(gateway_plan_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }
}
