//! Tracking pixel route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use treggio_core::{PixelId, PixelPlatform};

use crate::db::PixelRepository;
use crate::error::AppError;
use crate::middleware::auth::RequireMerchant;
use crate::state::AppState;

const MAX_PIXEL_ID_LENGTH: usize = 50;

/// Build the pixels router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pixels", get(index).post(upsert))
        .route("/pixels/{id}", axum::routing::delete(destroy))
}

/// Pixel upsert request: one pixel per platform.
#[derive(Debug, Deserialize)]
pub struct PixelRequest {
    pub platform: PixelPlatform,
    pub pixel_id: String,
}

/// The tenant's pixels.
#[instrument(skip(merchant, state), fields(user_id = %merchant.id))]
pub async fn index(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let pixels = PixelRepository::new(state.pool());
    let items = pixels.list(merchant.id).await?;
    Ok(Json(json!({ "pixels": items })))
}

/// Insert or replace the pixel for a platform.
#[instrument(skip(merchant, state, body), fields(user_id = %merchant.id))]
pub async fn upsert(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Json(body): Json<PixelRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let pixel_id = body.pixel_id.trim();
    if pixel_id.is_empty() || pixel_id.len() > MAX_PIXEL_ID_LENGTH {
        return Err(AppError::BadRequest(format!(
            "pixel_id must be 1-{MAX_PIXEL_ID_LENGTH} characters"
        )));
    }

    let pixels = PixelRepository::new(state.pool());
    let pixel = pixels.upsert(merchant.id, body.platform, pixel_id).await?;
    Ok((StatusCode::CREATED, Json(json!({ "pixel": pixel }))))
}

/// Delete a pixel.
#[instrument(skip(merchant, state))]
pub async fn destroy(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    let pixels = PixelRepository::new(state.pool());
    pixels
        .delete(merchant.id, PixelId::new(id))
        .await
        .map_err(|e| AppError::not_found_or(e, &format!("pixel {id}")))?;
    Ok(StatusCode::NO_CONTENT)
}
