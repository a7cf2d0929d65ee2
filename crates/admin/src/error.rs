//! Unified error handling for the admin API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::ai::DeepSeekError;
use crate::db::RepositoryError;
use crate::gateway::GatewayError;
use crate::services::auth::AuthError;
use crate::services::email::EmailError;
use crate::services::media::MediaError;

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Payment gateway operation failed.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// AI campaign generation failed.
    #[error("AI error: {0}")]
    Ai(#[from] DeepSeekError),

    /// Authentication / credential error.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Outbound email failed.
    #[error("Email error: {0}")]
    Email(#[from] EmailError),

    /// Media upload failed.
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission (e.g., another tenant's resource).
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Uniqueness or relational conflict (duplicate name, category in use).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The tenant's plan does not allow the operation.
    #[error("Plan limit reached: {0}")]
    PlanLimit(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::Email(_) | Self::Media(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) | Self::Email(_) | Self::Media(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Gateway(_) | Self::Ai(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Auth(e) => auth_status(e),
            Self::Forbidden(_) | Self::PlanLimit(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) | Self::Media(_) => {
                "Internal server error".to_string()
            }
            Self::Email(_) => "Failed to send email".to_string(),
            Self::Gateway(_) => "Payment gateway error".to_string(),
            Self::Ai(_) => "Campaign generation failed".to_string(),
            Self::Auth(AuthError::PasswordHash | AuthError::Repository(_)) => {
                "Internal server error".to_string()
            }
            Self::Auth(e) => e.to_string(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Map an auth error onto the status its cause deserves.
const fn auth_status(e: &AuthError) -> StatusCode {
    match e {
        AuthError::InvalidCredentials | AuthError::EmailNotVerified => StatusCode::UNAUTHORIZED,
        AuthError::EmailTaken | AuthError::StoreNameTaken => StatusCode::CONFLICT,
        AuthError::InvalidEmail(_)
        | AuthError::InvalidStoreName(_)
        | AuthError::WeakPassword(_) => StatusCode::BAD_REQUEST,
        AuthError::InvalidCode | AuthError::UserNotFound => StatusCode::NOT_FOUND,
        AuthError::PasswordHash | AuthError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl AppError {
    /// Map a repository miss onto a 404 with a resource label.
    pub fn not_found_or(err: RepositoryError, what: &str) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound(what.to_string()),
            other => Self::Database(other),
        }
    }
}

/// Set the Sentry user context from a merchant ID.
pub fn set_sentry_user(user_id: i32, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::PlanLimit("3 of 3 products used".to_string());
        assert_eq!(err.to_string(), "Plan limit reached: 3 of 3 products used");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("x".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("x".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::PlanLimit("x".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Conflict("x".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::BadRequest("x".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("x".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_or_maps_miss() {
        let err = AppError::not_found_or(RepositoryError::NotFound, "brand 9");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_auth_error_status_mapping() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::EmailTaken)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::WeakPassword("short".to_string()))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCode)),
            StatusCode::NOT_FOUND
        );
    }
}
