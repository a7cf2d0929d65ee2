//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::ai::DeepSeekClient;
use crate::config::AdminConfig;
use crate::gateway::GatewayClient;
use crate::services::billing::BillingService;
use crate::services::domains::DomainService;
use crate::services::email::EmailService;
use crate::services::media::MediaStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; every clone shares the pool, the HTTP
/// clients, and the billing staging cache.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    gateway: GatewayClient,
    deepseek: DeepSeekClient,
    email: EmailService,
    billing: BillingService,
    domains: DomainService,
    media: MediaStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP transport cannot be configured.
    pub fn new(
        config: AdminConfig,
        pool: PgPool,
    ) -> Result<Self, lettre::transport::smtp::Error> {
        let gateway = GatewayClient::new(&config.gateway);
        let deepseek = DeepSeekClient::new(&config.deepseek);
        let email = EmailService::new(&config.email)?;
        let billing = BillingService::new(
            pool.clone(),
            gateway.clone(),
            email.clone(),
            config.storefront_url.clone(),
            config.base_url.clone(),
        );
        let domains = DomainService::new(config.platform_domain.clone());
        let media = MediaStore::new(config.media_root.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                gateway,
                deepseek,
                email,
                billing,
                domains,
                media,
            }),
        })
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the payment gateway client.
    #[must_use]
    pub fn gateway(&self) -> &GatewayClient {
        &self.inner.gateway
    }

    /// Get a reference to the DeepSeek client.
    #[must_use]
    pub fn deepseek(&self) -> &DeepSeekClient {
        &self.inner.deepseek
    }

    /// Get a reference to the email service.
    #[must_use]
    pub fn email(&self) -> &EmailService {
        &self.inner.email
    }

    /// Get a reference to the billing service.
    #[must_use]
    pub fn billing(&self) -> &BillingService {
        &self.inner.billing
    }

    /// Get a reference to the custom-domain service.
    #[must_use]
    pub fn domains(&self) -> &DomainService {
        &self.inner.domains
    }

    /// Get a reference to the media store.
    #[must_use]
    pub fn media(&self) -> &MediaStore {
        &self.inner.media
    }
}
