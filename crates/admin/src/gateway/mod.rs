//! Payment gateway client (MercadoPago-compatible REST API).
//!
//! Handles recurring-billing preapprovals: creation at checkout, lookup when
//! a webhook arrives, and cancellation on downgrade. Webhook signature
//! verification lives in [`signature`].

mod error;
pub mod signature;
mod types;

pub use error::{ApiErrorResponse, GatewayError};
pub use types::{CreatePreapproval, Preapproval, WebhookNotification};

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::GatewayConfig;

/// Client for the payment gateway REST API.
#[derive(Clone)]
pub struct GatewayClient {
    inner: Arc<GatewayClientInner>,
}

struct GatewayClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    /// Create a new gateway client.
    ///
    /// # Panics
    ///
    /// Panics if the access token contains invalid header characters.
    #[must_use]
    pub fn new(config: &GatewayConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let bearer = format!("Bearer {}", config.access_token.expose_secret());
        let mut auth_value =
            HeaderValue::from_str(&bearer).expect("Invalid access token for header");
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner: Arc::new(GatewayClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
            }),
        }
    }

    /// Fetch a preapproval by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the gateway rejects it.
    #[instrument(skip(self))]
    pub async fn get_preapproval(&self, id: &str) -> Result<Preapproval, GatewayError> {
        let url = format!("{}/preapproval/{id}", self.inner.base_url);
        let response = self.inner.client.get(&url).send().await?;
        Self::handle_response(response).await
    }

    /// Create a preapproval for a plan; the returned `init_point` is the
    /// checkout URL the payer must visit.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the gateway rejects it.
    #[instrument(skip(self, input), fields(external_reference = %input.external_reference))]
    pub async fn create_preapproval(
        &self,
        input: &CreatePreapproval<'_>,
    ) -> Result<Preapproval, GatewayError> {
        let url = format!("{}/preapproval", self.inner.base_url);
        let response = self.inner.client.post(&url).json(input).send().await?;
        Self::handle_response(response).await
    }

    /// Cancel a preapproval (downgrade to the free plan).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the gateway rejects it.
    #[instrument(skip(self))]
    pub async fn cancel_preapproval(&self, id: &str) -> Result<Preapproval, GatewayError> {
        let url = format!("{}/preapproval/{id}", self.inner.base_url);
        let response = self
            .inner
            .client
            .put(&url)
            .json(&serde_json::json!({ "status": "cancelled" }))
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Map a gateway HTTP response into a typed result.
    async fn handle_response(response: reqwest::Response) -> Result<Preapproval, GatewayError> {
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(GatewayError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(GatewayError::Unauthorized(truncate(&body, 200)));
        }

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .ok()
                .and_then(|e| e.message.or(e.error))
                .unwrap_or_else(|| truncate(&body, 200));
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&body, 500),
                "Failed to parse gateway response"
            );
            GatewayError::Parse(e.to_string())
        })
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hello");
    }
}
