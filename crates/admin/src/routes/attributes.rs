//! Attribute and property route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use treggio_core::{AttributeId, PropertyId};

use crate::db::AttributeRepository;
use crate::error::AppError;
use crate::middleware::auth::RequireMerchant;
use crate::state::AppState;

/// Build the attributes router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/attributes", get(index).post(create))
        .route("/attributes/{id}", put(update).delete(destroy))
        .route("/properties", post(create_property))
        .route("/properties/{id}", delete(destroy_property))
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct AttributeListQuery {
    pub page: Option<i64>,
    pub search: Option<String>,
}

/// Attribute create/update request.
#[derive(Debug, Deserialize)]
pub struct AttributeRequest {
    pub name: String,
    /// Input widget hint: select, radio, color...
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default = "default_state")]
    pub state: bool,
}

fn default_kind() -> String {
    "select".to_string()
}

const fn default_state() -> bool {
    true
}

/// Paginated name-filtered attribute listing with properties.
#[instrument(skip(merchant, state), fields(user_id = %merchant.id))]
pub async fn index(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Query(query): Query<AttributeListQuery>,
) -> Result<Json<Value>, AppError> {
    let attributes = AttributeRepository::new(state.pool());
    let (items, total) = attributes
        .list(merchant.id, query.search.as_deref(), query.page.unwrap_or(1))
        .await?;
    Ok(Json(json!({ "total": total, "attributes": items })))
}

/// Create an attribute.
#[instrument(skip(merchant, state, body), fields(user_id = %merchant.id))]
pub async fn create(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Json(body): Json<AttributeRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let attributes = AttributeRepository::new(state.pool());
    if attributes.name_taken(merchant.id, &body.name, None).await? {
        return Err(AppError::Conflict(
            "an attribute with this name already exists".to_string(),
        ));
    }

    let attribute = attributes
        .create(merchant.id, &body.name, &body.kind, body.state)
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "attribute": attribute }))))
}

/// Update an attribute.
#[instrument(skip(merchant, state, body))]
pub async fn update(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<AttributeRequest>,
) -> Result<Json<Value>, AppError> {
    let attribute_id = AttributeId::new(id);
    let attributes = AttributeRepository::new(state.pool());

    if attributes
        .name_taken(merchant.id, &body.name, Some(attribute_id))
        .await?
    {
        return Err(AppError::Conflict(
            "an attribute with this name already exists".to_string(),
        ));
    }

    let attribute = attributes
        .update(merchant.id, attribute_id, &body.name, &body.kind, body.state)
        .await
        .map_err(|e| AppError::not_found_or(e, &format!("attribute {id}")))?;
    Ok(Json(json!({ "attribute": attribute })))
}

/// Delete an attribute and its properties.
#[instrument(skip(merchant, state))]
pub async fn destroy(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let attributes = AttributeRepository::new(state.pool());
    attributes
        .delete(merchant.id, AttributeId::new(id))
        .await
        .map_err(|e| AppError::not_found_or(e, &format!("attribute {id}")))?;
    Ok(Json(json!({ "deleted": true })))
}

/// Property creation request.
#[derive(Debug, Deserialize)]
pub struct PropertyRequest {
    pub attribute_id: i32,
    pub name: String,
    /// Display code (e.g., a hex color for color attributes).
    pub code: Option<String>,
}

/// Add a property under an attribute.
#[instrument(skip(merchant, state, body), fields(user_id = %merchant.id))]
pub async fn create_property(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Json(body): Json<PropertyRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let attribute_id = AttributeId::new(body.attribute_id);
    let attributes = AttributeRepository::new(state.pool());

    if attributes
        .property_name_taken(attribute_id, &body.name)
        .await?
    {
        return Err(AppError::Conflict(
            "a property with this name already exists".to_string(),
        ));
    }

    let property = attributes
        .create_property(merchant.id, attribute_id, &body.name, body.code.as_deref())
        .await
        .map_err(|e| AppError::not_found_or(e, &format!("attribute {attribute_id}")))?;

    Ok((StatusCode::CREATED, Json(json!({ "property": property }))))
}

/// Remove a property.
#[instrument(skip(merchant, state))]
pub async fn destroy_property(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let attributes = AttributeRepository::new(state.pool());
    attributes
        .delete_property(merchant.id, PropertyId::new(id))
        .await
        .map_err(|e| AppError::not_found_or(e, &format!("property {id}")))?;
    Ok(Json(json!({ "deleted": true })))
}
