//! Notice ("aviso") route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use treggio_core::NoticeId;

use crate::db::NoticeRepository;
use crate::error::AppError;
use crate::middleware::auth::RequireMerchant;
use crate::state::AppState;

/// Build the notices router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/notices", get(index).post(create))
        .route("/notices/current", get(current))
        .route("/notices/{id}", get(show).put(update).delete(destroy))
}

/// Notice create/update request.
#[derive(Debug, Deserialize)]
pub struct NoticeRequest {
    pub content: String,
    pub styles: Option<Value>,
}

/// All of the tenant's notices.
#[instrument(skip(merchant, state), fields(user_id = %merchant.id))]
pub async fn index(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let notices = NoticeRepository::new(state.pool());
    let items = notices.list(merchant.id).await?;
    Ok(Json(json!({ "notices": items })))
}

/// The tenant's latest notice (or null, mirroring the storefront payload).
#[instrument(skip(merchant, state))]
pub async fn current(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let notices = NoticeRepository::new(state.pool());
    let notice = notices.latest(merchant.id).await?;
    Ok(Json(json!({ "notice": notice })))
}

/// Create a notice.
#[instrument(skip(merchant, state, body), fields(user_id = %merchant.id))]
pub async fn create(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Json(body): Json<NoticeRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if body.content.trim().is_empty() {
        return Err(AppError::BadRequest("content is required".to_string()));
    }

    let notices = NoticeRepository::new(state.pool());
    let notice = notices
        .create(merchant.id, &body.content, body.styles.as_ref())
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "notice": notice }))))
}

/// Notice detail.
#[instrument(skip(merchant, state))]
pub async fn show(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let notices = NoticeRepository::new(state.pool());
    let notice = notices
        .list(merchant.id)
        .await?
        .into_iter()
        .find(|n| n.id == NoticeId::new(id))
        .ok_or_else(|| AppError::NotFound(format!("notice {id}")))?;
    Ok(Json(json!({ "notice": notice })))
}

/// Update a notice.
#[instrument(skip(merchant, state, body))]
pub async fn update(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<NoticeRequest>,
) -> Result<Json<Value>, AppError> {
    if body.content.trim().is_empty() {
        return Err(AppError::BadRequest("content is required".to_string()));
    }

    let notices = NoticeRepository::new(state.pool());
    let notice = notices
        .update(merchant.id, NoticeId::new(id), &body.content, body.styles.as_ref())
        .await
        .map_err(|e| AppError::not_found_or(e, &format!("notice {id}")))?;
    Ok(Json(json!({ "notice": notice })))
}

/// Delete a notice.
#[instrument(skip(merchant, state))]
pub async fn destroy(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let notices = NoticeRepository::new(state.pool());
    notices
        .delete(merchant.id, NoticeId::new(id))
        .await
        .map_err(|e| AppError::not_found_or(e, &format!("notice {id}")))?;
    Ok(Json(json!({ "deleted": true })))
}
