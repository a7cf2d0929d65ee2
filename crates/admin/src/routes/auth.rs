//! Authentication and profile route handlers.

use axum::{
    Json, Router,
    extract::{Multipart, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use treggio_core::{Email, Slug};

use crate::db::{PlanRepository, ProductRepository, UserRepository};
use crate::error::AppError;
use crate::middleware::auth::{RequireMerchant, clear_current_merchant, set_current_merchant};
use crate::models::CurrentMerchant;
use crate::models::user::{ProfileUpdate, User};
use crate::services::AuthService;
use crate::state::AppState;

use super::media_url_opt;

/// Build the public auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/verify", post(verify_account))
        .route("/forgot", post(forgot_password))
        .route("/reset/check", post(check_reset_code))
        .route("/reset", post(reset_password))
}

/// Build the session-protected profile router (mounted under `/admin`).
pub fn profile_router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(me).put(update_profile))
        .route("/profile/popup", delete(delete_popup))
        .route("/limits", get(limits))
}

// =============================================================================
// Registration & login
// =============================================================================

/// Free-plan registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub surname: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub store_name: String,
}

/// Registration response: the new account plus its storefront URL.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: User,
    pub store_url: String,
}

/// Register a merchant on the free plan and send the verification email.
#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let auth = AuthService::new(state.pool());
    let data = auth
        .validate_registration(
            &body.name,
            &body.surname,
            &body.phone,
            &body.email,
            &body.password,
            &body.store_name,
        )
        .await?;

    let plans = PlanRepository::new(state.pool());
    let free_plan = plans.get_free().await?;

    let activation_code = Uuid::new_v4().simple().to_string();
    let user = auth.register_free(&data, free_plan.id, &activation_code).await?;

    let verify_url = format!(
        "{}/ingresar?code={activation_code}",
        state.config().storefront_url.trim_end_matches('/')
    );
    if let Err(e) = state
        .email()
        .send_verification(user.email.as_str(), &verify_url)
        .await
    {
        // Account exists; the merchant can request a fresh code later.
        tracing::error!(user_id = %user.id, error = %e, "Verification email failed");
    }

    let store_url = state.config().store_url(user.slug.as_str());
    tracing::info!(user_id = %user.id, slug = %user.slug, "Merchant registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse { user, store_url }),
    ))
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login and start a session.
#[instrument(skip(state, session, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let auth = AuthService::new(state.pool());
    let user = auth.login(&body.email, &body.password).await?;

    let merchant = CurrentMerchant::from(&user);
    set_current_merchant(&session, &merchant)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    crate::error::set_sentry_user(user.id.as_i32(), Some(user.email.as_str()));
    tracing::info!(user_id = %user.id, "Merchant logged in");

    Ok(Json(json!({
        "user": {
            "full_name": user.full_name(),
            "email": user.email,
            "store_name": user.store_name,
            "slug": user.slug,
        }
    })))
}

/// Logout and destroy the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<Value>, AppError> {
    clear_current_merchant(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    crate::error::clear_sentry_user();
    Ok(Json(json!({ "message": "Successfully logged out" })))
}

/// Current merchant profile.
#[instrument(skip(merchant, state))]
pub async fn me(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let users = UserRepository::new(state.pool());
    let user = users
        .get_by_id(merchant.id)
        .await?
        .ok_or_else(|| AppError::NotFound("account".to_string()))?;

    Ok(Json(json!({
        "name": user.name,
        "surname": user.surname,
        "phone": user.phone,
        "email": user.email,
        "description": user.description,
        "address": user.address,
        "gender": user.gender,
        "facebook": user.facebook,
        "instagram": user.instagram,
        "tiktok": user.tiktok,
        "youtube": user.youtube,
        "store_name": user.store_name,
        "slug": user.slug,
        "avatar": media_url_opt(state.config(), user.avatar.as_deref()),
        "popup": media_url_opt(state.config(), user.popup.as_deref()),
        "mission": user.mission,
        "vision": user.vision,
        "menu_color": user.menu_color,
        "button_color": user.button_color,
        "button_radius": user.button_radius,
        "plan_id": user.plan_id,
        "subscription_status": user.subscription_status,
    })))
}

// =============================================================================
// Email verification & password reset
// =============================================================================

/// Account activation request (code from the verification email).
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub code: String,
}

/// Activate an account by its emailed code.
#[instrument(skip(state, body))]
pub async fn verify_account(
    State(state): State<AppState>,
    Json(body): Json<VerifyRequest>,
) -> Result<Json<Value>, AppError> {
    let auth = AuthService::new(state.pool());
    let user = auth.verify_email(&body.code).await?;
    tracing::info!(user_id = %user.id, "Email verified");
    Ok(Json(json!({ "verified": true })))
}

/// Password reset initiation request.
#[derive(Debug, Deserialize)]
pub struct ForgotRequest {
    pub email: String,
}

/// Send a password reset code.
#[instrument(skip(state, body), fields(email = %body.email))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotRequest>,
) -> Result<Json<Value>, AppError> {
    let auth = AuthService::new(state.pool());
    let code = Uuid::new_v4().simple().to_string();
    let user = auth.start_password_reset(&body.email, &code).await?;

    state
        .email()
        .send_password_reset(user.email.as_str(), &code)
        .await?;

    Ok(Json(json!({ "sent": true })))
}

/// Reset-code check request.
#[derive(Debug, Deserialize)]
pub struct ResetCheckRequest {
    pub code: String,
}

/// Check whether a reset code is valid.
#[instrument(skip(state, body))]
pub async fn check_reset_code(
    State(state): State<AppState>,
    Json(body): Json<ResetCheckRequest>,
) -> Result<Json<Value>, AppError> {
    let auth = AuthService::new(state.pool());
    let valid = auth.check_reset_code(&body.code).await?;
    if !valid {
        return Err(AppError::NotFound("reset code".to_string()));
    }
    Ok(Json(json!({ "valid": true })))
}

/// Password reset completion request.
#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub code: String,
    pub new_password: String,
}

/// Complete a password reset.
#[instrument(skip(state, body))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetRequest>,
) -> Result<Json<Value>, AppError> {
    let auth = AuthService::new(state.pool());
    auth.reset_password(&body.code, &body.new_password).await?;
    Ok(Json(json!({ "reset": true })))
}

// =============================================================================
// Profile
// =============================================================================

/// Update the merchant's profile from a multipart form.
///
/// Text fields are applied as-is; `file_imagen` replaces the avatar and
/// `file_popup` the popup image. A new `store_name` re-derives the slug.
/// A `password` field changes the password and nothing else.
#[instrument(skip(merchant, state, multipart))]
pub async fn update_profile(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    session: Session,
    mut multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let users = UserRepository::new(state.pool());
    let mut update = ProfileUpdate::default();
    let mut password: Option<String> = None;
    let mut old_avatar: Option<String> = None;
    let mut old_popup: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };

        match name.as_str() {
            "file_imagen" | "file_popup" => {
                let file_name = field.file_name().unwrap_or("upload.png").to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("invalid upload: {e}")))?;
                let path = state.media().put("users", &file_name, &bytes).await?;

                let current = users
                    .get_by_id(merchant.id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("account".to_string()))?;

                if name == "file_imagen" {
                    old_avatar = current.avatar;
                    update.avatar = Some(path);
                } else {
                    old_popup = current.popup;
                    update.popup = Some(path);
                }
            }
            _ => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("invalid field: {e}")))?;
                apply_profile_field(&mut update, &mut password, &name, value)?;
            }
        }
    }

    // Password changes are exclusive, mirroring the frontend's separate form.
    if let Some(password) = password {
        let auth = AuthService::new(state.pool());
        auth.change_password(merchant.id, &password).await?;
        return Ok(Json(json!({ "updated": true })));
    }

    if let Some(email) = &update.email
        && users.email_taken(email, Some(merchant.id)).await?
    {
        return Err(AppError::Conflict("email already registered".to_string()));
    }
    if let Some(slug) = &update.slug
        && users.slug_taken(slug, Some(merchant.id)).await?
    {
        return Err(AppError::Conflict("store name already in use".to_string()));
    }

    let user = users
        .update_profile(merchant.id, &update)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::Conflict(msg) => AppError::Conflict(msg),
            other => AppError::Database(other),
        })?;

    // Refresh the session copy and drop replaced files only after the commit.
    set_current_merchant(&session, &CurrentMerchant::from(&user))
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    if let Some(old) = old_avatar {
        state.media().delete(&old).await.ok();
    }
    if let Some(old) = old_popup {
        state.media().delete(&old).await.ok();
    }

    Ok(Json(json!({
        "updated": true,
        "store_url": state.config().store_url(user.slug.as_str()),
    })))
}

/// Map one multipart text field onto the profile update.
fn apply_profile_field(
    update: &mut ProfileUpdate,
    password: &mut Option<String>,
    name: &str,
    value: String,
) -> Result<(), AppError> {
    match name {
        "name" => update.name = Some(value),
        "surname" => update.surname = Some(value),
        "phone" => update.phone = Some(value),
        "email" => {
            let email = Email::parse(&value)
                .map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;
            update.email = Some(email);
        }
        "store_name" => {
            let slug = Slug::from_name(&value)
                .map_err(|e| AppError::BadRequest(format!("invalid store name: {e}")))?;
            update.store_name = Some(value);
            update.slug = Some(slug);
        }
        "password" => *password = Some(value),
        "description" => update.description = Some(value),
        "address" => update.address = Some(value),
        "gender" => update.gender = Some(value),
        "mission" => update.mission = Some(value),
        "vision" => update.vision = Some(value),
        "facebook" => update.facebook = Some(value),
        "instagram" => update.instagram = Some(value),
        "tiktok" => update.tiktok = Some(value),
        "youtube" => update.youtube = Some(value),
        "menu_color" => update.menu_color = Some(value),
        "button_color" => update.button_color = Some(value),
        "button_radius" => update.button_radius = Some(value),
        other => {
            tracing::debug!(field = %other, "Ignoring unknown profile field");
        }
    }
    Ok(())
}

/// Remove the popup image.
#[instrument(skip(merchant, state))]
pub async fn delete_popup(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let users = UserRepository::new(state.pool());
    let Some(old_path) = users.clear_popup(merchant.id).await? else {
        return Err(AppError::NotFound("popup image".to_string()));
    };

    state.media().delete(&old_path).await.ok();
    Ok(Json(json!({ "deleted": true })))
}

/// Product usage vs the tenant's plan limit.
#[instrument(skip(merchant, state))]
pub async fn limits(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let users = UserRepository::new(state.pool());
    let plans = PlanRepository::new(state.pool());
    let products = ProductRepository::new(state.pool());

    let user = users
        .get_by_id(merchant.id)
        .await?
        .ok_or_else(|| AppError::NotFound("account".to_string()))?;
    let plan = plans
        .get(user.plan_id)
        .await?
        .ok_or_else(|| AppError::NotFound("plan".to_string()))?;
    let used = products.count_for_user(merchant.id).await?;

    Ok(Json(json!({
        "plan": plan.name,
        "product_limit": plan.product_limit,
        "products_used": used,
        "can_create": plan.allows_products(used),
    })))
}
