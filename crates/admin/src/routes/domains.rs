//! Custom domain route handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::DomainRepository;
use crate::error::AppError;
use crate::middleware::auth::RequireMerchant;
use crate::services::DomainService;
use crate::services::domains::DomainError;
use crate::state::AppState;

/// Build the custom domain router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/domain",
            get(config).post(connect).delete(disconnect),
        )
        .route("/domain/verify", get(verify))
}

/// Current domain configuration for the tenant.
#[instrument(skip(merchant, state))]
pub async fn config(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let domains = DomainRepository::new(state.pool());
    let domain = domains.get_for_user(merchant.id).await?;

    Ok(Json(json!({
        "slug": merchant.slug,
        "custom_domain": domain,
        "main_domain": state.domains().platform_domain(),
    })))
}

/// Domain connection request.
#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub domain: String,
}

/// Connect a domain: store it unverified and return DNS instructions.
#[instrument(skip(merchant, state, body), fields(user_id = %merchant.id))]
pub async fn connect(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
    Json(body): Json<ConnectRequest>,
) -> Result<Json<Value>, AppError> {
    let host = state.domains().normalize(&body.domain).map_err(|e| match e {
        DomainError::PlatformDomain => {
            AppError::BadRequest("cannot use the platform domain".to_string())
        }
        _ => AppError::BadRequest("invalid domain".to_string()),
    })?;

    let domains = DomainRepository::new(state.pool());
    if domains.domain_taken(&host, Some(merchant.id)).await? {
        return Err(AppError::Conflict(
            "domain already connected to another store".to_string(),
        ));
    }

    let verification_code = DomainService::generate_verification_code();
    let domain = domains
        .upsert(merchant.id, &host, &verification_code)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::Conflict(msg) => AppError::Conflict(msg),
            other => AppError::Database(other),
        })?;

    tracing::info!(user_id = %merchant.id, domain = %host, "Custom domain connected");

    Ok(Json(json!({
        "success": true,
        "domain": domain,
        "instructions": state.domains().instructions(&verification_code),
    })))
}

/// Verify the tenant's domain via its DNS records.
#[instrument(skip(merchant, state))]
pub async fn verify(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let domains = DomainRepository::new(state.pool());
    let domain = domains
        .get_for_user(merchant.id)
        .await?
        .ok_or_else(|| AppError::NotFound("no domain configured".to_string()))?;

    let verified = state
        .domains()
        .check_dns(&domain.domain, domain.verification_code.as_deref())
        .await
        .map_err(|e| AppError::Internal(format!("DNS check failed: {e}")))?;

    if !verified {
        return Err(AppError::BadRequest(
            "DNS records not found yet; check your CNAME or TXT configuration".to_string(),
        ));
    }

    let domain = domains.mark_verified(merchant.id).await?;
    tracing::info!(user_id = %merchant.id, domain = %domain.domain, "Custom domain verified");

    Ok(Json(json!({ "success": true, "domain": domain })))
}

/// Disconnect the tenant's domain.
#[instrument(skip(merchant, state))]
pub async fn disconnect(
    RequireMerchant(merchant): RequireMerchant,
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let domains = DomainRepository::new(state.pool());
    let removed = domains
        .delete_for_user(merchant.id)
        .await
        .map_err(|e| AppError::not_found_or(e, "no domain configured"))?;

    tracing::info!(user_id = %merchant.id, domain = %removed, "Custom domain disconnected");
    Ok(Json(json!({ "success": true })))
}
