//! AI marketing campaign route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use treggio_core::CampaignId;

use crate::db::CampaignRepository;
use crate::error::AppError;
use crate::middleware::auth::RequireMerchant;
use crate::services::MarketingService;
use crate::services::marketing::{GenerationOptions, MarketingError};
use crate::state::AppState;

/// Build the campaigns router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/campaigns", get(history))
        .route("/campaigns/generate", post(generate))
        .route("/campaigns/{id}/regenerate", post(regenerate))
}

const VALID_TONES: &[&str] = &["profesional", "divertido", "emocional"];
const VALID_STYLES: &[&str] = &["moderno", "minimalista", "vibrante"];

/// Generation request options.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    pub tone: Option<String>,
    pub style: Option<String>,
}

impl GenerateRequest {
    fn into_options(self) -> Result<GenerationOptions, AppError> {
        if let Some(tone) = self.tone.as_deref()
            && !VALID_TONES.contains(&tone)
        {
            return Err(AppError::BadRequest(format!("invalid tone: {tone}")));
        }
        if let Some(style) = self.style.as_deref()
            && !VALID_STYLES.contains(&style)
        {
            return Err(AppError::BadRequest(format!("invalid style: {style}")));
        }
        Ok(GenerationOptions {
            tone: self.tone,
            style: self.style,
        })
    }
}

fn map_marketing_error(e: MarketingError) -> AppError {
    match e {
        MarketingError::NoProducts => {
            AppError::BadRequest("no products to generate campaigns for".to_string())
        }
        MarketingError::Ai(err) => AppError::Ai(err),
        MarketingError::BadContent(msg) => {
            tracing::error!(error = %msg, "Campaign content rejected");
            AppError::Internal(msg)
        }
        MarketingError::Repository(crate::db::RepositoryError::NotFound) => {
            AppError::NotFound("campaign".to_string())
        }
        MarketingError::Repository(err) => AppError::Database(err),
    }
}

/// Generate three campaigns from the catalog and persist them.
#[instrument(skip(merchant, state, body), fields(user_id = %merchant.id))]
pub async fn generate(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<Value>, AppError> {
    let options = body.into_options()?;
    let marketing = MarketingService::new(state.pool(), state.deepseek());
    let campaigns = marketing
        .generate(merchant.id, &options)
        .await
        .map_err(map_marketing_error)?;

    Ok(Json(json!({
        "success": true,
        "data": campaigns,
        "message": "campaigns generated",
    })))
}

/// History query parameters.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<i64>,
}

/// Paginated campaign history with versions.
#[instrument(skip(merchant, state), fields(user_id = %merchant.id))]
pub async fn history(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Value>, AppError> {
    let campaigns = CampaignRepository::new(state.pool());
    let (items, total) = campaigns
        .list(merchant.id, query.page.unwrap_or(1))
        .await?;

    Ok(Json(json!({
        "success": true,
        "total": total,
        "data": items,
    })))
}

/// Regenerate one campaign, appending a new version.
#[instrument(skip(merchant, state, body), fields(user_id = %merchant.id))]
pub async fn regenerate(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<Value>, AppError> {
    let options = body.into_options()?;
    let marketing = MarketingService::new(state.pool(), state.deepseek());
    let (content, version) = marketing
        .regenerate(merchant.id, CampaignId::new(id), &options)
        .await
        .map_err(map_marketing_error)?;

    Ok(Json(json!({
        "success": true,
        "data": content,
        "version": version,
    })))
}
