//! Storefront font route handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use treggio_core::StoreFont;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::middleware::auth::RequireMerchant;
use crate::state::AppState;

/// Build the fonts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/fonts", get(available).post(update))
        .route("/fonts/current", get(current))
}

/// JSON catalog of selectable fonts.
fn font_catalog() -> Value {
    let fonts: Vec<Value> = StoreFont::ALL
        .into_iter()
        .map(|font| {
            json!({
                "name": font.name(),
                "family": font.family(),
                "url": font.stylesheet_url(),
            })
        })
        .collect();
    Value::Array(fonts)
}

/// The font catalog plus the tenant's current pick.
#[instrument(skip(merchant, state))]
pub async fn available(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let users = UserRepository::new(state.pool());
    let user = users
        .get_by_id(merchant.id)
        .await?
        .ok_or_else(|| AppError::NotFound("account".to_string()))?;

    Ok(Json(json!({
        "fonts": font_catalog(),
        "current_font": user.font.name(),
    })))
}

/// Font selection request.
#[derive(Debug, Deserialize)]
pub struct FontRequest {
    pub font: String,
}

/// Change the storefront font (must be in the catalog).
#[instrument(skip(merchant, state, body), fields(user_id = %merchant.id))]
pub async fn update(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Json(body): Json<FontRequest>,
) -> Result<Json<Value>, AppError> {
    let Some(font) = StoreFont::from_name(&body.font) else {
        return Err(AppError::BadRequest(format!(
            "unknown font: {}",
            body.font
        )));
    };

    let users = UserRepository::new(state.pool());
    users.set_font(merchant.id, font).await?;

    Ok(Json(json!({
        "success": true,
        "font_family": font.family(),
    })))
}

/// The tenant's current font.
#[instrument(skip(merchant, state))]
pub async fn current(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let users = UserRepository::new(state.pool());
    let user = users
        .get_by_id(merchant.id)
        .await?
        .ok_or_else(|| AppError::NotFound("account".to_string()))?;

    Ok(Json(json!({
        "font_name": user.font.name(),
        "font_family": user.font.family(),
    })))
}
