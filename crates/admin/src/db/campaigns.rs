//! AI marketing campaign repository (tenant-scoped, versioned).

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use treggio_core::{CampaignId, CampaignStatus, UserId};

use super::{RepositoryError, page_offset};
use crate::models::campaign::{Campaign, CampaignVersion, GeneratedCampaign};

/// Campaign history page size (smaller than catalog pages; payloads are fat).
pub const CAMPAIGN_PAGE_SIZE: i64 = 10;

const CAMPAIGN_COLUMNS: &str = "id, user_id, name, description, target_audience, ad_copy, \
     visual_style, call_to_action, status, generated_at, created_at";

#[derive(Debug, sqlx::FromRow)]
struct CampaignRow {
    id: i32,
    user_id: i32,
    name: String,
    description: String,
    target_audience: serde_json::Value,
    ad_copy: serde_json::Value,
    visual_style: serde_json::Value,
    call_to_action: String,
    status: String,
    generated_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CampaignRow> for Campaign {
    type Error = RepositoryError;

    fn try_from(row: CampaignRow) -> Result<Self, Self::Error> {
        let status = match row.status.as_str() {
            "draft" => CampaignStatus::Draft,
            "published" => CampaignStatus::Published,
            "archived" => CampaignStatus::Archived,
            other => {
                return Err(RepositoryError::DataCorruption(format!(
                    "unknown campaign status: {other}"
                )));
            }
        };

        Ok(Self {
            id: CampaignId::new(row.id),
            user_id: UserId::new(row.user_id),
            name: row.name,
            description: row.description,
            target_audience: row.target_audience,
            ad_copy: row.ad_copy,
            visual_style: row.visual_style,
            call_to_action: row.call_to_action,
            status,
            generated_at: row.generated_at,
            created_at: row.created_at,
            versions: Vec::new(),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct VersionRow {
    id: i32,
    campaign_id: i32,
    version: i32,
    data: serde_json::Value,
    change_description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<VersionRow> for CampaignVersion {
    fn from(row: VersionRow) -> Self {
        Self {
            id: row.id,
            campaign_id: CampaignId::new(row.campaign_id),
            version: row.version,
            data: row.data,
            change_description: row.change_description,
            created_at: row.created_at,
        }
    }
}

/// Repository for AI marketing campaigns.
pub struct CampaignRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CampaignRepository<'a> {
    /// Create a new campaign repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a batch of generated campaigns atomically, each with its
    /// version-1 snapshot. Returns the saved campaigns with versions.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; nothing is
    /// kept on failure.
    pub async fn save_generated(
        &self,
        user_id: UserId,
        generated: &[GeneratedCampaign],
    ) -> Result<Vec<Campaign>, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(generated.len());

        for campaign in generated {
            let row = sqlx::query_as::<_, CampaignRow>(&format!(
                "INSERT INTO marketing_campaigns
                     (user_id, name, description, target_audience, ad_copy,
                      visual_style, call_to_action, status, generated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, 'draft', now())
                 RETURNING {CAMPAIGN_COLUMNS}"
            ))
            .bind(user_id.as_i32())
            .bind(&campaign.name)
            .bind(&campaign.description)
            .bind(&campaign.target_audience)
            .bind(serde_json::json!(campaign.ad_copy))
            .bind(&campaign.visual_style)
            .bind(&campaign.call_to_action)
            .fetch_one(&mut *tx)
            .await?;

            let mut model: Campaign = row.try_into()?;

            let version_row = sqlx::query_as::<_, VersionRow>(
                "INSERT INTO campaign_versions (campaign_id, version, data)
                 VALUES ($1, 1, $2)
                 RETURNING id, campaign_id, version, data, change_description, created_at",
            )
            .bind(model.id.as_i32())
            .bind(campaign.snapshot())
            .fetch_one(&mut *tx)
            .await?;

            model.versions.push(version_row.into());
            saved.push(model);
        }

        tx.commit().await?;
        Ok(saved)
    }

    /// Paginated campaign history, newest generation first, versions attached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        user_id: UserId,
        page: i64,
    ) -> Result<(Vec<Campaign>, i64), RepositoryError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM marketing_campaigns WHERE user_id = $1")
                .bind(user_id.as_i32())
                .fetch_one(self.pool)
                .await?;

        let rows = sqlx::query_as::<_, CampaignRow>(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM marketing_campaigns
             WHERE user_id = $1 ORDER BY generated_at DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(user_id.as_i32())
        .bind(CAMPAIGN_PAGE_SIZE)
        .bind(page_offset(page, CAMPAIGN_PAGE_SIZE))
        .fetch_all(self.pool)
        .await?;

        let mut campaigns = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Campaign>, _>>()?;

        if !campaigns.is_empty() {
            let ids: Vec<i32> = campaigns.iter().map(|c| c.id.as_i32()).collect();
            let version_rows = sqlx::query_as::<_, VersionRow>(
                "SELECT id, campaign_id, version, data, change_description, created_at
                 FROM campaign_versions WHERE campaign_id = ANY($1)
                 ORDER BY campaign_id, version",
            )
            .bind(&ids)
            .fetch_all(self.pool)
            .await?;

            for row in version_rows {
                let version: CampaignVersion = row.into();
                if let Some(campaign) = campaigns.iter_mut().find(|c| c.id == version.campaign_id)
                {
                    campaign.versions.push(version);
                }
            }
        }

        Ok((campaigns, total))
    }

    /// Get a tenant's campaign by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        user_id: UserId,
        id: CampaignId,
    ) -> Result<Option<Campaign>, RepositoryError> {
        let row = sqlx::query_as::<_, CampaignRow>(&format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM marketing_campaigns
             WHERE id = $1 AND user_id = $2"
        ))
        .bind(id.as_i32())
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;
        row.map(TryInto::try_into).transpose()
    }

    /// Append a regenerated snapshot as the campaign's next version.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_version(
        &self,
        campaign_id: CampaignId,
        data: &serde_json::Value,
        change_description: Option<&str>,
    ) -> Result<CampaignVersion, RepositoryError> {
        let row = sqlx::query_as::<_, VersionRow>(
            "INSERT INTO campaign_versions (campaign_id, version, data, change_description)
             SELECT $1, COALESCE(MAX(version), 0) + 1, $2, $3
             FROM campaign_versions WHERE campaign_id = $1
             RETURNING id, campaign_id, version, data, change_description, created_at",
        )
        .bind(campaign_id.as_i32())
        .bind(data)
        .bind(change_description)
        .fetch_one(self.pool)
        .await?;
        Ok(row.into())
    }
}
