//! Product management route handlers.

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use treggio_core::{BrandId, CategoryId, ProductId, ProductImageId, ProductState, Slug, UserId};

use crate::db::products::{ProductFilter, ProductInput};
use crate::db::{
    BrandRepository, CategoryRepository, PlanRepository, ProductRepository, UserRepository,
};
use crate::error::AppError;
use crate::middleware::auth::RequireMerchant;
use crate::models::catalog::Product;
use crate::state::AppState;

use super::{media_url, media_url_opt};

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(index).post(create))
        .route("/products/config", get(config))
        .route("/products/images", post(add_image))
        .route("/products/images/{id}", delete(delete_image))
        .route("/products/{id}", get(show).post(update).delete(destroy))
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub page: Option<i64>,
    pub search: Option<String>,
    pub category_first_id: Option<i32>,
    pub category_second_id: Option<i32>,
    pub category_third_id: Option<i32>,
    pub brand_id: Option<i32>,
}

/// JSON shape for a product in admin responses.
fn product_json(state: &AppState, product: &Product) -> Value {
    json!({
        "id": product.id,
        "title": product.title,
        "slug": product.slug,
        "sku": product.sku,
        "price": product.price,
        "image": media_url_opt(state.config(), product.image.as_deref()),
        "state": product.state,
        "description": product.description,
        "tags": product.tags,
        "brand_id": product.brand_id,
        "category_first_id": product.category_first_id,
        "category_second_id": product.category_second_id,
        "category_third_id": product.category_third_id,
        "stock": product.stock,
        "created_at": product.created_at,
        "updated_at": product.updated_at,
    })
}

/// Paginated, filtered product listing.
#[instrument(skip(merchant, state), fields(user_id = %merchant.id))]
pub async fn index(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<Value>, AppError> {
    let filter = ProductFilter {
        search: query.search,
        category_first_id: query.category_first_id.map(CategoryId::new),
        category_second_id: query.category_second_id.map(CategoryId::new),
        category_third_id: query.category_third_id.map(CategoryId::new),
        brand_id: query.brand_id.map(BrandId::new),
    };

    let products = ProductRepository::new(state.pool());
    let (items, total) = products
        .list(merchant.id, &filter, query.page.unwrap_or(1))
        .await?;

    let products_json: Vec<Value> = items.iter().map(|p| product_json(&state, p)).collect();
    Ok(Json(json!({ "total": total, "products": products_json })))
}

/// Category levels and brands for the product form.
#[instrument(skip(merchant, state))]
pub async fn config(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let categories = CategoryRepository::new(state.pool());
    let brands = BrandRepository::new(state.pool());

    let categories_first = categories.list_by_depth(merchant.id, 1, true).await?;
    let categories_second = categories.list_by_depth(merchant.id, 2, true).await?;
    let categories_third = categories.list_by_depth(merchant.id, 3, true).await?;
    let brands = brands.list_active(merchant.id).await?;

    Ok(Json(json!({
        "categories_first": categories_first,
        "categories_second": categories_second,
        "categories_third": categories_third,
        "brands": brands,
    })))
}

/// Parsed multipart product form.
#[derive(Debug, Default)]
struct ProductForm {
    title: Option<String>,
    sku: Option<String>,
    price: Option<Decimal>,
    state: Option<ProductState>,
    description: Option<String>,
    tags: Option<Value>,
    brand_id: Option<BrandId>,
    category_first_id: Option<CategoryId>,
    category_second_id: Option<CategoryId>,
    category_third_id: Option<CategoryId>,
    stock: Option<i32>,
    cover: Option<(String, Vec<u8>)>,
}

impl ProductForm {
    /// Drain a multipart body into the form. The cover image arrives as the
    /// `portada` field.
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

            if name == "portada" {
                let file_name = field.file_name().unwrap_or("cover.png").to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("invalid upload: {e}")))?;
                form.cover = Some((file_name, bytes.to_vec()));
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("invalid field: {e}")))?;
            form.apply(&name, value)?;
        }

        Ok(form)
    }

    fn apply(&mut self, name: &str, value: String) -> Result<(), AppError> {
        match name {
            "title" => self.title = Some(value),
            "sku" => self.sku = Some(value),
            "price" => {
                self.price = Some(value.parse().map_err(|_| {
                    AppError::BadRequest(format!("invalid price: {value}"))
                })?);
            }
            "state" => {
                self.state = Some(match value.as_str() {
                    "draft" | "1" => ProductState::Draft,
                    "published" | "2" => ProductState::Published,
                    other => {
                        return Err(AppError::BadRequest(format!("invalid state: {other}")));
                    }
                });
            }
            "description" => self.description = Some(value),
            "tags" => {
                // Tags arrive JSON-encoded from the form's multiselect.
                self.tags = Some(
                    serde_json::from_str(&value).unwrap_or(Value::String(value)),
                );
            }
            "brand_id" => self.brand_id = parse_optional_id(&value)?.map(BrandId::new),
            "category_first_id" => {
                self.category_first_id = parse_optional_id(&value)?.map(CategoryId::new);
            }
            "category_second_id" => {
                self.category_second_id = parse_optional_id(&value)?.map(CategoryId::new);
            }
            "category_third_id" => {
                self.category_third_id = parse_optional_id(&value)?.map(CategoryId::new);
            }
            "stock" => {
                self.stock = Some(value.parse().map_err(|_| {
                    AppError::BadRequest(format!("invalid stock: {value}"))
                })?);
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown product field");
            }
        }
        Ok(())
    }
}

fn parse_optional_id(value: &str) -> Result<Option<i32>, AppError> {
    if value.is_empty() || value == "null" {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| AppError::BadRequest(format!("invalid id: {value}")))
}

/// Check the tenant's plan allows another product.
async fn check_plan_limit(state: &AppState, user_id: UserId) -> Result<(), AppError> {
    let users = UserRepository::new(state.pool());
    let plans = PlanRepository::new(state.pool());
    let products = ProductRepository::new(state.pool());

    let user = users
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("account".to_string()))?;
    let plan = plans
        .get(user.plan_id)
        .await?
        .ok_or_else(|| AppError::NotFound("plan".to_string()))?;
    let used = products.count_for_user(user_id).await?;

    if !plan.allows_products(used) {
        return Err(AppError::PlanLimit(format!(
            "{used} of {} products used",
            plan.product_limit.unwrap_or_default()
        )));
    }
    Ok(())
}

/// Create a product from a multipart form.
#[instrument(skip(merchant, state, multipart), fields(user_id = %merchant.id))]
pub async fn create(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), AppError> {
    check_plan_limit(&state, merchant.id).await?;

    let form = ProductForm::from_multipart(multipart).await?;
    let title = form
        .title
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("title is required".to_string()))?;
    let price = form
        .price
        .ok_or_else(|| AppError::BadRequest("price is required".to_string()))?;

    let products = ProductRepository::new(state.pool());
    if products.title_taken(merchant.id, title, None).await? {
        return Err(AppError::Conflict(
            "a product with this title already exists".to_string(),
        ));
    }

    let slug = Slug::from_name(title)
        .map_err(|e| AppError::BadRequest(format!("invalid title: {e}")))?;

    let image = match &form.cover {
        Some((file_name, bytes)) => {
            Some(state.media().put("products", file_name, bytes).await?)
        }
        None => None,
    };

    let product = products
        .create(
            merchant.id,
            &ProductInput {
                title,
                slug: &slug,
                sku: form.sku.as_deref(),
                price,
                image: image.as_deref(),
                state: form.state.unwrap_or_default(),
                description: form.description.as_deref(),
                tags: form.tags.as_ref(),
                brand_id: form.brand_id,
                category_first_id: form.category_first_id,
                category_second_id: form.category_second_id,
                category_third_id: form.category_third_id,
                stock: form.stock.unwrap_or(0),
            },
        )
        .await?;

    tracing::info!(product_id = %product.id, "Product created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "product": product_json(&state, &product) })),
    ))
}

/// Product detail with gallery images.
#[instrument(skip(merchant, state))]
pub async fn show(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let products = ProductRepository::new(state.pool());
    let product = products
        .get(merchant.id, ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let images: Vec<Value> = products
        .list_images(product.id)
        .await?
        .iter()
        .map(|img| {
            json!({
                "id": img.id,
                "image": media_url(state.config(), &img.path),
            })
        })
        .collect();

    let mut body = product_json(&state, &product);
    if let Value::Object(map) = &mut body {
        map.insert("images".to_string(), Value::Array(images));
    }
    Ok(Json(json!({ "product": body })))
}

/// Update a product from a multipart form.
#[instrument(skip(merchant, state, multipart))]
pub async fn update(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let product_id = ProductId::new(id);
    let products = ProductRepository::new(state.pool());
    let existing = products
        .get(merchant.id, product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let form = ProductForm::from_multipart(multipart).await?;
    let title = form.title.as_deref().unwrap_or(&existing.title);

    if products
        .title_taken(merchant.id, title, Some(product_id))
        .await?
    {
        return Err(AppError::Conflict(
            "a product with this title already exists".to_string(),
        ));
    }

    let slug = Slug::from_name(title)
        .map_err(|e| AppError::BadRequest(format!("invalid title: {e}")))?;

    let new_image = match &form.cover {
        Some((file_name, bytes)) => {
            Some(state.media().put("products", file_name, bytes).await?)
        }
        None => None,
    };

    let product = products
        .update(
            merchant.id,
            product_id,
            &ProductInput {
                title,
                slug: &slug,
                sku: form.sku.as_deref().or(existing.sku.as_deref()),
                price: form.price.unwrap_or(existing.price),
                image: new_image.as_deref(),
                state: form.state.unwrap_or(existing.state),
                description: form.description.as_deref().or(existing.description.as_deref()),
                tags: form.tags.as_ref().or(existing.tags.as_ref()),
                brand_id: form.brand_id.or(existing.brand_id),
                category_first_id: form.category_first_id.or(existing.category_first_id),
                category_second_id: form.category_second_id.or(existing.category_second_id),
                category_third_id: form.category_third_id.or(existing.category_third_id),
                stock: form.stock.unwrap_or(existing.stock),
            },
        )
        .await
        .map_err(|e| AppError::not_found_or(e, &format!("product {id}")))?;

    // Replaced cover: drop the old file once the row points at the new one.
    if new_image.is_some()
        && let Some(old) = existing.image
    {
        state.media().delete(&old).await.ok();
    }

    Ok(Json(json!({ "product": product_json(&state, &product) })))
}

/// Soft-delete a product.
#[instrument(skip(merchant, state))]
pub async fn destroy(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let products = ProductRepository::new(state.pool());
    products
        .soft_delete(merchant.id, ProductId::new(id))
        .await
        .map_err(|e| AppError::not_found_or(e, &format!("product {id}")))?;

    tracing::info!(product_id = id, "Product deleted");
    Ok(Json(json!({ "deleted": true })))
}

/// Attach a gallery image (multipart: `product_id` + `imagen_add`).
#[instrument(skip(merchant, state, multipart))]
pub async fn add_image(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let mut product_id: Option<ProductId> = None;
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("product_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("invalid field: {e}")))?;
                let id: i32 = text
                    .parse()
                    .map_err(|_| AppError::BadRequest(format!("invalid product id: {text}")))?;
                product_id = Some(ProductId::new(id));
            }
            Some("imagen_add") => {
                let file_name = field.file_name().unwrap_or("image.png").to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("invalid upload: {e}")))?;
                upload = Some((file_name, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let product_id =
        product_id.ok_or_else(|| AppError::BadRequest("product_id is required".to_string()))?;
    let (file_name, bytes) =
        upload.ok_or_else(|| AppError::BadRequest("imagen_add is required".to_string()))?;

    let products = ProductRepository::new(state.pool());
    // Ownership check before writing anything to disk.
    products
        .get(merchant.id, product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    let path = state.media().put("products", &file_name, &bytes).await?;
    let image = products.add_image(product_id, &path).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "image": {
                "id": image.id,
                "image": media_url(state.config(), &image.path),
            }
        })),
    ))
}

/// Remove a gallery image.
#[instrument(skip(merchant, state))]
pub async fn delete_image(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, AppError> {
    let products = ProductRepository::new(state.pool());
    let path = products
        .delete_image(merchant.id, ProductImageId::new(id))
        .await
        .map_err(|e| AppError::not_found_or(e, &format!("image {id}")))?;

    state.media().delete(&path).await.ok();
    Ok(Json(json!({ "deleted": true })))
}
