//! Host-based tenant resolution for custom domains.
//!
//! Requests arriving on a Host other than the platform domain (or localhost)
//! are mapped to the owning store through a cached lookup of verified custom
//! domains. The resolved store slug is injected as a request extension so
//! slug-path handlers can serve the same payloads for custom-domain traffic.

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::db::StoreRepository;
use crate::state::{AppState, DomainResolution};

/// Request extension carrying the store resolved from a custom domain.
#[derive(Debug, Clone)]
pub struct CurrentStore {
    pub slug: String,
}

/// Axum middleware resolving custom-domain hosts to stores.
///
/// Platform-domain and localhost requests pass through untouched. Unknown
/// custom domains get a 404 pointing back at the platform.
pub async fn resolve_custom_domain(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let host = request
        .headers()
        .get(axum::http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(strip_port)
        .unwrap_or_default()
        .to_lowercase();

    if host.is_empty()
        || host == state.config().platform_domain
        || host == "localhost"
        || host == "127.0.0.1"
    {
        return next.run(request).await;
    }

    let resolution = match state.domain_cache().get(&host).await {
        Some(cached) => cached,
        None => {
            let stores = StoreRepository::new(state.pool());
            let resolution = match stores.slug_for_domain(&host).await {
                Ok(Some(slug)) => DomainResolution::Store { slug },
                Ok(None) => DomainResolution::Unknown,
                Err(e) => {
                    tracing::error!(host = %host, error = %e, "Domain lookup failed");
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                }
            };
            state
                .domain_cache()
                .insert(host.clone(), resolution.clone())
                .await;
            resolution
        }
    };

    match resolution {
        DomainResolution::Store { slug } => {
            tracing::debug!(host = %host, slug = %slug, "Custom domain resolved");
            request.extensions_mut().insert(CurrentStore { slug });
            next.run(request).await
        }
        DomainResolution::Unknown => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "store not found for this domain",
                "platform": format!("https://{}", state.config().platform_domain),
            })),
        )
            .into_response(),
    }
}

/// Drop an explicit port from a Host header value.
fn strip_port(host: &str) -> &str {
    host.rsplit_once(':').map_or(host, |(name, port)| {
        if port.chars().all(|c| c.is_ascii_digit()) {
            name
        } else {
            host
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("tienda.rosa.com:443"), "tienda.rosa.com");
        assert_eq!(strip_port("tienda.rosa.com"), "tienda.rosa.com");
        assert_eq!(strip_port("localhost:3000"), "localhost");
    }
}
