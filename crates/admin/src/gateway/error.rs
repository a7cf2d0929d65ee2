//! Error types for the payment gateway client.

use thiserror::Error;

/// Errors that can occur when talking to the payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway returned an error payload.
    #[error("gateway error ({status}): {message}")]
    Api {
        /// HTTP status returned by the gateway.
        status: u16,
        /// Error message from the gateway.
        message: String,
    },

    /// Rate limited by the gateway.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication failed (bad access token).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Failed to parse a gateway response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Webhook signature did not match.
    #[error("invalid webhook signature")]
    InvalidSignature,
}

/// Error payload shape returned by the gateway REST API.
#[derive(Debug, serde::Deserialize)]
pub struct ApiErrorResponse {
    /// Human-readable message.
    pub message: Option<String>,
    /// Machine-readable error code.
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::RateLimited(30);
        assert_eq!(err.to_string(), "rate limited, retry after 30 seconds");

        let err = GatewayError::Api {
            status: 404,
            message: "preapproval not found".to_string(),
        };
        assert_eq!(err.to_string(), "gateway error (404): preapproval not found");
    }

    #[test]
    fn test_api_error_deserialization() {
        let json = r#"{"message": "invalid access token", "error": "unauthorized"}"#;
        let parsed: ApiErrorResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(parsed.message.as_deref(), Some("invalid access token"));
        assert_eq!(parsed.error.as_deref(), Some("unauthorized"));
    }
}
