//! Error types for the DeepSeek API client.

use thiserror::Error;

/// Errors that can occur when interacting with the DeepSeek API.
#[derive(Debug, Error)]
pub enum DeepSeekError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// DeepSeek API returned an error.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// Rate limited by the API.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication failed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Failed to parse response.
    #[error("parse error: {0}")]
    Parse(String),

    /// The response contained no usable campaign content.
    #[error("empty completion")]
    EmptyCompletion,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deepseek_error_display() {
        let err = DeepSeekError::RateLimited(60);
        assert_eq!(err.to_string(), "rate limited, retry after 60 seconds");

        let err = DeepSeekError::Api {
            status: 400,
            message: "model not found".to_string(),
        };
        assert_eq!(err.to_string(), "API error (400): model not found");
    }
}
