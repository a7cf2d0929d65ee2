//! Slider management route handlers.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use treggio_core::SliderId;

use crate::db::SliderRepository;
use crate::db::sliders::SliderInput;
use crate::error::AppError;
use crate::middleware::auth::RequireMerchant;
use crate::models::store::Slider;
use crate::state::AppState;

use super::media_url_opt;

/// Build the sliders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sliders", get(index).post(create))
        .route("/sliders/{id}", get(show).post(update).delete(destroy))
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct SliderListQuery {
    pub page: Option<i64>,
    pub search: Option<String>,
}

fn slider_json(state: &AppState, slider: &Slider) -> Value {
    json!({
        "id": slider.id,
        "title": slider.title,
        "subtitle": slider.subtitle,
        "label": slider.label,
        "image": media_url_opt(state.config(), slider.image.as_deref()),
        "link": slider.link,
        "state": slider.state,
        "kind": slider.kind,
        "price_original": slider.price_original,
        "price_campaign": slider.price_campaign,
        "color": slider.color,
    })
}

/// Paginated title-filtered slider listing.
#[instrument(skip(merchant, state), fields(user_id = %merchant.id))]
pub async fn index(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Query(query): Query<SliderListQuery>,
) -> Result<Json<Value>, AppError> {
    let sliders = SliderRepository::new(state.pool());
    let (items, total) = sliders
        .list(merchant.id, query.search.as_deref(), query.page.unwrap_or(1))
        .await?;

    let sliders_json: Vec<Value> = items.iter().map(|s| slider_json(&state, s)).collect();
    Ok(Json(json!({ "total": total, "sliders": sliders_json })))
}

/// Parsed multipart slider form.
#[derive(Debug, Default)]
struct SliderForm {
    title: Option<String>,
    subtitle: Option<String>,
    label: Option<String>,
    link: Option<String>,
    state: Option<bool>,
    kind: Option<i16>,
    price_original: Option<Decimal>,
    price_campaign: Option<Decimal>,
    color: Option<String>,
    image: Option<(String, Vec<u8>)>,
}

impl SliderForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
        {
            let Some(name) = field.name().map(ToOwned::to_owned) else {
                continue;
            };

            if name == "image" {
                let file_name = field.file_name().unwrap_or("slider.png").to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("invalid upload: {e}")))?;
                form.image = Some((file_name, bytes.to_vec()));
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("invalid field: {e}")))?;
            match name.as_str() {
                "title" => form.title = Some(value),
                "subtitle" => form.subtitle = Some(value),
                "label" => form.label = Some(value),
                "link" => form.link = Some(value),
                "state" => form.state = Some(value == "1" || value == "true"),
                "kind" => {
                    form.kind = Some(value.parse().map_err(|_| {
                        AppError::BadRequest(format!("invalid slider kind: {value}"))
                    })?);
                }
                "price_original" => {
                    form.price_original = value.parse().ok();
                }
                "price_campaign" => {
                    form.price_campaign = value.parse().ok();
                }
                "color" => form.color = Some(value),
                _ => {}
            }
        }

        Ok(form)
    }
}

/// Create a slider.
#[instrument(skip(merchant, state, multipart), fields(user_id = %merchant.id))]
pub async fn create(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let form = SliderForm::from_multipart(multipart).await?;
    let title = form
        .title
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("title is required".to_string()))?;

    let image = match &form.image {
        Some((file_name, bytes)) => Some(state.media().put("sliders", file_name, bytes).await?),
        None => None,
    };

    let sliders = SliderRepository::new(state.pool());
    let slider = sliders
        .create(
            merchant.id,
            &SliderInput {
                title,
                subtitle: form.subtitle.as_deref(),
                label: form.label.as_deref(),
                image: image.as_deref(),
                link: form.link.as_deref(),
                state: form.state.unwrap_or(true),
                kind: form.kind.unwrap_or(1),
                price_original: form.price_original,
                price_campaign: form.price_campaign,
                color: form.color.as_deref(),
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "slider": slider_json(&state, &slider) })),
    ))
}

/// Slider detail.
#[instrument(skip(merchant, state))]
pub async fn show(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let sliders = SliderRepository::new(state.pool());
    let slider = sliders
        .get(merchant.id, SliderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("slider {id}")))?;

    Ok(Json(json!({ "slider": slider_json(&state, &slider) })))
}

/// Update a slider.
#[instrument(skip(merchant, state, multipart))]
pub async fn update(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let slider_id = SliderId::new(id);
    let sliders = SliderRepository::new(state.pool());
    let existing = sliders
        .get(merchant.id, slider_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("slider {id}")))?;

    let form = SliderForm::from_multipart(multipart).await?;

    let new_image = match &form.image {
        Some((file_name, bytes)) => Some(state.media().put("sliders", file_name, bytes).await?),
        None => None,
    };

    let slider = sliders
        .update(
            merchant.id,
            slider_id,
            &SliderInput {
                title: form.title.as_deref().unwrap_or(&existing.title),
                subtitle: form.subtitle.as_deref().or(existing.subtitle.as_deref()),
                label: form.label.as_deref().or(existing.label.as_deref()),
                image: new_image.as_deref(),
                link: form.link.as_deref().or(existing.link.as_deref()),
                state: form.state.unwrap_or(existing.state),
                kind: form.kind.unwrap_or(existing.kind),
                price_original: form.price_original.or(existing.price_original),
                price_campaign: form.price_campaign.or(existing.price_campaign),
                color: form.color.as_deref().or(existing.color.as_deref()),
            },
        )
        .await
        .map_err(|e| AppError::not_found_or(e, &format!("slider {id}")))?;

    if new_image.is_some()
        && let Some(old) = existing.image
    {
        state.media().delete(&old).await.ok();
    }

    Ok(Json(json!({ "slider": slider_json(&state, &slider) })))
}

/// Delete a slider and its image file.
#[instrument(skip(merchant, state))]
pub async fn destroy(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let sliders = SliderRepository::new(state.pool());
    let image = sliders
        .delete(merchant.id, SliderId::new(id))
        .await
        .map_err(|e| AppError::not_found_or(e, &format!("slider {id}")))?;

    if let Some(image) = image {
        state.media().delete(&image).await.ok();
    }
    Ok(Json(json!({ "deleted": true })))
}
