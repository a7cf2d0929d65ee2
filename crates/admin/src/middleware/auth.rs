//! Authentication extractors for merchant routes.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use crate::models::{CurrentMerchant, session_keys};

/// Extractor that requires a logged-in merchant.
///
/// The API is JSON-only, so a missing session is always a 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireMerchant(merchant): RequireMerchant,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", merchant.name)
/// }
/// ```
pub struct RequireMerchant(pub CurrentMerchant);

/// Rejection returned when no merchant session is present.
pub struct MerchantAuthRejection;

impl IntoResponse for MerchantAuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized" })),
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for RequireMerchant
where
    S: Send + Sync,
{
    type Rejection = MerchantAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(MerchantAuthRejection)?;

        let merchant: CurrentMerchant = session
            .get(session_keys::CURRENT_MERCHANT)
            .await
            .ok()
            .flatten()
            .ok_or(MerchantAuthRejection)?;

        Ok(Self(merchant))
    }
}

/// Extractor that optionally reads the current merchant.
pub struct OptionalMerchant(pub Option<CurrentMerchant>);

impl<S> FromRequestParts<S> for OptionalMerchant
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let merchant = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentMerchant>(session_keys::CURRENT_MERCHANT)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(merchant))
    }
}

/// Helper to store the current merchant in the session after login.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_merchant(
    session: &Session,
    merchant: &CurrentMerchant,
) -> Result<(), tower_sessions::session::Error> {
    session
        .insert(session_keys::CURRENT_MERCHANT, merchant)
        .await
}

/// Helper to clear the current merchant from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_merchant(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentMerchant>(session_keys::CURRENT_MERCHANT)
        .await?;
    Ok(())
}
