//! DeepSeek API client for AI campaign generation.

mod error;
mod types;

pub use error::DeepSeekError;
pub use types::{ChatRequest, ChatResponse, Message};

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::DeepSeekConfig;

const DEFAULT_MAX_TOKENS: u32 = 2000;
const DEFAULT_TEMPERATURE: f32 = 0.7;

/// DeepSeek chat completions client.
#[derive(Clone)]
pub struct DeepSeekClient {
    inner: Arc<DeepSeekClientInner>,
}

struct DeepSeekClientInner {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl DeepSeekClient {
    /// Create a new DeepSeek client.
    ///
    /// # Panics
    ///
    /// Panics if the API key contains invalid header characters.
    #[must_use]
    pub fn new(config: &DeepSeekConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = format!("Bearer {}", config.api_key.expose_secret());
        let mut auth_value = HeaderValue::from_str(&bearer).expect("Invalid API key for header");
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(30))
            .connect_timeout(std::time::Duration::from_secs(15))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner: Arc::new(DeepSeekClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                model: config.model.clone(),
            }),
        }
    }

    /// Send a chat request and return the first completion's text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API rejects it, or the
    /// completion is empty.
    #[instrument(skip(self, messages), fields(model = %self.inner.model))]
    pub async fn complete(&self, messages: Vec<Message>) -> Result<String, DeepSeekError> {
        let request = ChatRequest {
            model: self.inner.model.clone(),
            messages,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        };

        let url = format!("{}/chat/completions", self.inner.base_url);
        let response = self.inner.client.post(&url).json(&request).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(DeepSeekError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(DeepSeekError::Unauthorized(truncate(&body, 200)));
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %truncate(&body, 200),
                "DeepSeek API returned non-success status"
            );
            return Err(DeepSeekError::Api {
                status: status.as_u16(),
                message: truncate(&body, 200),
            });
        }

        if body.is_empty() {
            return Err(DeepSeekError::EmptyCompletion);
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&body, 200),
                "Failed to parse DeepSeek response"
            );
            DeepSeekError::Parse(e.to_string())
        })?;

        parsed
            .first_content()
            .map(ToOwned::to_owned)
            .ok_or(DeepSeekError::EmptyCompletion)
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
