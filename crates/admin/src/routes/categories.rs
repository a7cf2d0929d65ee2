//! Category management route handlers.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use treggio_core::CategoryId;

use crate::db::CategoryRepository;
use crate::db::categories::CategoryInput;
use crate::error::AppError;
use crate::middleware::auth::RequireMerchant;
use crate::models::catalog::Category;
use crate::state::AppState;

use super::media_url_opt;

/// Build the categories router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(index).post(create))
        .route("/categories/config", get(config))
        .route(
            "/categories/{id}",
            get(show).post(update).delete(destroy),
        )
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct CategoryListQuery {
    pub page: Option<i64>,
    pub search: Option<String>,
}

fn category_json(state: &AppState, category: &Category) -> Value {
    json!({
        "id": category.id,
        "name": category.name,
        "image": media_url_opt(state.config(), category.image.as_deref()),
        "state": category.state,
        "parent_id": category.parent_id,
        "depth": category.depth,
        "created_at": category.created_at,
    })
}

/// Paginated name-filtered category listing.
#[instrument(skip(merchant, state), fields(user_id = %merchant.id))]
pub async fn index(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Query(query): Query<CategoryListQuery>,
) -> Result<Json<Value>, AppError> {
    let categories = CategoryRepository::new(state.pool());
    let (items, total) = categories
        .list(merchant.id, query.search.as_deref(), query.page.unwrap_or(1))
        .await?;

    let categories_json: Vec<Value> = items.iter().map(|c| category_json(&state, c)).collect();
    Ok(Json(json!({ "total": total, "categories": categories_json })))
}

/// First and second level categories for the category form.
#[instrument(skip(merchant, state))]
pub async fn config(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let categories = CategoryRepository::new(state.pool());
    let categories_first = categories.list_by_depth(merchant.id, 1, false).await?;
    let categories_second = categories.list_by_depth(merchant.id, 2, false).await?;

    Ok(Json(json!({
        "categories_first": categories_first,
        "categories_second": categories_second,
    })))
}

/// Parsed multipart category form.
#[derive(Debug, Default)]
struct CategoryForm {
    name: Option<String>,
    state: Option<bool>,
    parent_id: Option<CategoryId>,
    image: Option<(String, Vec<u8>)>,
}

impl CategoryForm {
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
                let file_name = field.file_name().unwrap_or("category.png").to_owned();
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
                "name" => form.name = Some(value),
                "state" => form.state = Some(value == "1" || value == "true"),
                "parent_id" if !value.is_empty() && value != "null" => {
                    let id: i32 = value.parse().map_err(|_| {
                        AppError::BadRequest(format!("invalid parent id: {value}"))
                    })?;
                    form.parent_id = Some(CategoryId::new(id));
                }
                _ => {}
            }
        }

        Ok(form)
    }
}

/// Resolve the depth for a new/updated category from its parent.
async fn resolve_depth(
    categories: &CategoryRepository<'_>,
    user_id: treggio_core::UserId,
    parent_id: Option<CategoryId>,
) -> Result<i16, AppError> {
    let Some(parent_id) = parent_id else {
        return Ok(1);
    };

    let parent = categories
        .get(user_id, parent_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("parent category {parent_id}")))?;

    if parent.depth >= 3 {
        return Err(AppError::BadRequest(
            "categories only nest three levels deep".to_string(),
        ));
    }
    Ok(parent.depth + 1)
}

/// Create a category.
#[instrument(skip(merchant, state, multipart), fields(user_id = %merchant.id))]
pub async fn create(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let form = CategoryForm::from_multipart(multipart).await?;
    let name = form
        .name
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("name is required".to_string()))?;

    let categories = CategoryRepository::new(state.pool());
    if categories.name_taken(merchant.id, name, None).await? {
        return Err(AppError::Conflict(
            "a category with this name already exists".to_string(),
        ));
    }

    let depth = resolve_depth(&categories, merchant.id, form.parent_id).await?;

    let image = match &form.image {
        Some((file_name, bytes)) => {
            Some(state.media().put("categories", file_name, bytes).await?)
        }
        None => None,
    };

    let category = categories
        .create(
            merchant.id,
            &CategoryInput {
                name,
                image: image.as_deref(),
                state: form.state.unwrap_or(true),
                parent_id: form.parent_id,
                depth,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "category": category_json(&state, &category) })),
    ))
}

/// Category detail.
#[instrument(skip(merchant, state))]
pub async fn show(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let categories = CategoryRepository::new(state.pool());
    let category = categories
        .get(merchant.id, CategoryId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {id}")))?;

    Ok(Json(json!({ "category": category_json(&state, &category) })))
}

/// Update a category.
#[instrument(skip(merchant, state, multipart))]
pub async fn update(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let category_id = CategoryId::new(id);
    let categories = CategoryRepository::new(state.pool());
    let existing = categories
        .get(merchant.id, category_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {id}")))?;

    let form = CategoryForm::from_multipart(multipart).await?;
    let name = form.name.as_deref().unwrap_or(&existing.name);

    if categories
        .name_taken(merchant.id, name, Some(category_id))
        .await?
    {
        return Err(AppError::Conflict(
            "a category with this name already exists".to_string(),
        ));
    }

    let parent_id = form.parent_id.or(existing.parent_id);
    let depth = resolve_depth(&categories, merchant.id, parent_id).await?;

    let new_image = match &form.image {
        Some((file_name, bytes)) => {
            Some(state.media().put("categories", file_name, bytes).await?)
        }
        None => None,
    };

    let category = categories
        .update(
            merchant.id,
            category_id,
            &CategoryInput {
                name,
                image: new_image.as_deref(),
                state: form.state.unwrap_or(existing.state),
                parent_id,
                depth,
            },
        )
        .await
        .map_err(|e| AppError::not_found_or(e, &format!("category {id}")))?;

    if new_image.is_some()
        && let Some(old) = existing.image
    {
        state.media().delete(&old).await.ok();
    }

    Ok(Json(json!({ "category": category_json(&state, &category) })))
}

/// Delete a category unless products still reference it.
#[instrument(skip(merchant, state))]
pub async fn destroy(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let category_id = CategoryId::new(id);
    let categories = CategoryRepository::new(state.pool());

    let references = categories.product_references(category_id).await?;
    if references > 0 {
        return Err(AppError::Conflict(format!(
            "category is referenced by {references} product(s)"
        )));
    }

    categories
        .delete(merchant.id, category_id)
        .await
        .map_err(|e| AppError::not_found_or(e, &format!("category {id}")))?;

    Ok(Json(json!({ "deleted": true })))
}
