//! Subscription billing: checkout staging and webhook reconciliation.
//!
//! Paid registrations write nothing to the database up front. The validated
//! payload is staged in an in-memory cache keyed by the external reference we
//! hand to the gateway, and the account is only created when the gateway's
//! `authorized` webhook arrives. Plan changes for existing tenants are staged
//! the same way.
//!
//! Webhook processing is idempotent over gateway retries: an `authorized`
//! event whose preapproval id is already attached to a user only refreshes
//! the stored status.

use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use uuid::Uuid;

use treggio_core::{PlanId, SubscriptionStatus, UserId};

use crate::db::users::NewUser;
use crate::db::{PlanRepository, UserRepository};
use crate::error::AppError;
use crate::gateway::{CreatePreapproval, GatewayClient, Preapproval};
use crate::models::billing::PendingRegistration;
use crate::services::auth::RegistrationData;
use crate::services::email::EmailService;

/// Staged entries expire if the gateway never confirms.
const STAGING_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const STAGING_CAPACITY: u64 = 10_000;

/// What is waiting on a gateway confirmation.
#[derive(Debug, Clone)]
pub enum StagedCheckout {
    /// A brand-new merchant registration.
    Registration {
        registration: PendingRegistration,
    },
    /// An existing tenant switching plans.
    PlanChange { user_id: UserId, plan_id: PlanId },
}

/// Result of processing one preapproval event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// A staged registration was turned into an active account.
    Activated { user_id: UserId },
    /// An existing tenant's plan change was applied.
    PlanChanged { user_id: UserId },
    /// The event repeated something already applied; status refreshed.
    AlreadyProcessed,
    /// The tenant was downgraded to the free plan.
    Downgraded { user_id: UserId },
    /// Authorized event with no staged data and no matching user.
    StagingMissing,
    /// Event acknowledged but intentionally not acted upon.
    Ignored,
}

/// Subscription billing service.
#[derive(Clone)]
pub struct BillingService {
    pool: PgPool,
    gateway: GatewayClient,
    email: EmailService,
    staged: Cache<String, StagedCheckout>,
    storefront_url: String,
    base_url: String,
}

impl BillingService {
    /// Create a new billing service.
    #[must_use]
    pub fn new(
        pool: PgPool,
        gateway: GatewayClient,
        email: EmailService,
        storefront_url: String,
        base_url: String,
    ) -> Self {
        let staged = Cache::builder()
            .max_capacity(STAGING_CAPACITY)
            .time_to_live(STAGING_TTL)
            .build();

        Self {
            pool,
            gateway,
            email,
            staged,
            storefront_url,
            base_url,
        }
    }

    /// Stage a paid registration and open a gateway checkout.
    ///
    /// Returns the checkout URL the payer must visit.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` when the plan has no gateway plan id,
    /// or a gateway error when preapproval creation fails.
    pub async fn begin_paid_registration(
        &self,
        data: RegistrationData,
        plan_id: PlanId,
    ) -> Result<String, AppError> {
        let plans = PlanRepository::new(&self.pool);
        let plan = plans
            .get(plan_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("plan {plan_id}")))?;

        let gateway_plan_id = plan
            .gateway_plan_id
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("plan is not purchasable".to_string()))?;

        let external_reference = Uuid::new_v4().to_string();
        let registration = PendingRegistration {
            name: data.name,
            surname: data.surname,
            phone: data.phone,
            email: data.email,
            password_hash: data.password_hash,
            store_name: data.store_name,
            slug: data.slug,
            plan_id,
        };

        let payer_email = registration.email.as_str().to_string();
        self.staged
            .insert(
                external_reference.clone(),
                StagedCheckout::Registration { registration },
            )
            .await;

        let back_url = format!("{}/auth/payment/success", self.base_url);
        let preapproval = self
            .gateway
            .create_preapproval(&CreatePreapproval {
                reason: &format!("Treggio - plan {}", plan.name),
                external_reference: &external_reference,
                payer_email: &payer_email,
                preapproval_plan_id: gateway_plan_id,
                back_url: &back_url,
            })
            .await?;

        tracing::info!(
            external_reference = %external_reference,
            preapproval_id = %preapproval.id,
            "Paid registration staged"
        );

        preapproval
            .init_point
            .ok_or_else(|| AppError::Internal("gateway returned no checkout URL".to_string()))
    }

    /// Stage a plan change for an existing tenant.
    ///
    /// Paid target plans return a checkout URL; switching to the free plan
    /// cancels the current preapproval immediately and returns `None`.
    ///
    /// # Errors
    ///
    /// Returns gateway or repository errors.
    pub async fn begin_plan_change(
        &self,
        user_id: UserId,
        plan_id: PlanId,
    ) -> Result<Option<String>, AppError> {
        let users = UserRepository::new(&self.pool);
        let plans = PlanRepository::new(&self.pool);

        let user = users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("account".to_string()))?;
        let plan = plans
            .get(plan_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("plan {plan_id}")))?;

        if plan.is_free {
            if let Some(subscription_id) = user.subscription_id.as_deref() {
                self.gateway.cancel_preapproval(subscription_id).await?;
            }
            users
                .set_plan(user_id, plan.id, None, SubscriptionStatus::Cancelled)
                .await?;
            tracing::info!(user_id = %user_id, "Tenant moved to free plan");
            return Ok(None);
        }

        let gateway_plan_id = plan
            .gateway_plan_id
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("plan is not purchasable".to_string()))?;

        let external_reference = Uuid::new_v4().to_string();
        self.staged
            .insert(
                external_reference.clone(),
                StagedCheckout::PlanChange {
                    user_id,
                    plan_id: plan.id,
                },
            )
            .await;

        let back_url = format!("{}/auth/payment/success", self.base_url);
        let preapproval = self
            .gateway
            .create_preapproval(&CreatePreapproval {
                reason: &format!("Treggio - plan {}", plan.name),
                external_reference: &external_reference,
                payer_email: user.email.as_str(),
                preapproval_plan_id: gateway_plan_id,
                back_url: &back_url,
            })
            .await?;

        preapproval
            .init_point
            .map(Some)
            .ok_or_else(|| AppError::Internal("gateway returned no checkout URL".to_string()))
    }

    /// Process one `subscription_preapproval` event: fetch the preapproval
    /// from the gateway and reconcile our state with its status.
    ///
    /// # Errors
    ///
    /// Returns gateway errors (so the caller can 502) and repository errors.
    /// Unknown statuses and missing staging are NOT errors - the gateway
    /// retries on non-2xx and there is nothing a retry would fix.
    pub async fn process_preapproval_event(
        &self,
        preapproval_id: &str,
    ) -> Result<WebhookOutcome, AppError> {
        let preapproval = self.gateway.get_preapproval(preapproval_id).await?;

        let Some(status) = SubscriptionStatus::from_gateway(&preapproval.status) else {
            tracing::warn!(
                preapproval_id = %preapproval.id,
                status = %preapproval.status,
                "Ignoring preapproval event with unknown status"
            );
            return Ok(WebhookOutcome::Ignored);
        };

        match status {
            SubscriptionStatus::Authorized => self.apply_authorized(&preapproval).await,
            SubscriptionStatus::Paused | SubscriptionStatus::Cancelled => {
                self.apply_downgrade(&preapproval, status).await
            }
            SubscriptionStatus::Pending => {
                tracing::debug!(preapproval_id = %preapproval.id, "Preapproval still pending");
                Ok(WebhookOutcome::Ignored)
            }
        }
    }

    /// Handle an `authorized` preapproval: replayed events refresh status,
    /// staged registrations become accounts, staged plan changes are applied.
    async fn apply_authorized(
        &self,
        preapproval: &Preapproval,
    ) -> Result<WebhookOutcome, AppError> {
        let users = UserRepository::new(&self.pool);

        // Replay: this preapproval already belongs to a user.
        if let Some(existing) = users.get_by_subscription(&preapproval.id).await? {
            if existing.subscription_status != SubscriptionStatus::Authorized {
                users
                    .set_plan(
                        existing.id,
                        existing.plan_id,
                        Some(&preapproval.id),
                        SubscriptionStatus::Authorized,
                    )
                    .await?;
            }
            return Ok(WebhookOutcome::AlreadyProcessed);
        }

        let Some(reference) = preapproval.external_reference.as_deref() else {
            tracing::warn!(
                preapproval_id = %preapproval.id,
                "Authorized preapproval without external reference"
            );
            return Ok(WebhookOutcome::StagingMissing);
        };

        let Some(staged) = self.staged.get(reference).await else {
            tracing::warn!(
                preapproval_id = %preapproval.id,
                external_reference = %reference,
                "Authorized preapproval with no staged checkout (expired or replayed)"
            );
            return Ok(WebhookOutcome::StagingMissing);
        };

        let outcome = match staged {
            StagedCheckout::Registration { registration } => {
                self.activate_registration(&registration, &preapproval.id)
                    .await?
            }
            StagedCheckout::PlanChange { user_id, plan_id } => {
                users
                    .set_plan(
                        user_id,
                        plan_id,
                        Some(&preapproval.id),
                        SubscriptionStatus::Authorized,
                    )
                    .await?;
                tracing::info!(user_id = %user_id, plan_id = %plan_id, "Plan change applied");
                WebhookOutcome::PlanChanged { user_id }
            }
        };

        self.staged.invalidate(reference).await;
        Ok(outcome)
    }

    /// Create the account for a staged registration.
    async fn activate_registration(
        &self,
        registration: &PendingRegistration,
        preapproval_id: &str,
    ) -> Result<WebhookOutcome, AppError> {
        let users = UserRepository::new(&self.pool);
        let plans = PlanRepository::new(&self.pool);

        let user = users
            .create(NewUser {
                name: &registration.name,
                surname: &registration.surname,
                phone: &registration.phone,
                email: &registration.email,
                password_hash: &registration.password_hash,
                store_name: &registration.store_name,
                slug: &registration.slug,
                // Gateway-confirmed accounts are born verified.
                activation_code: None,
                plan_id: registration.plan_id,
                subscription_id: Some(preapproval_id),
                subscription_status: SubscriptionStatus::Authorized,
            })
            .await?;

        let plan_name = plans
            .get(registration.plan_id)
            .await?
            .map_or_else(|| "Treggio".to_string(), |p| p.name);

        let store_url = format!(
            "{}/{}",
            self.storefront_url.trim_end_matches('/'),
            user.slug
        );
        if let Err(e) = self
            .email
            .send_subscription_active(user.email.as_str(), &user.name, &plan_name, &store_url)
            .await
        {
            // The account is live; a lost email must not fail the webhook.
            tracing::error!(user_id = %user.id, error = %e, "Subscription email failed");
        }

        tracing::info!(user_id = %user.id, "Paid registration activated");
        Ok(WebhookOutcome::Activated { user_id: user.id })
    }

    /// Handle `paused`/`cancelled`: drop the tenant to the free plan.
    async fn apply_downgrade(
        &self,
        preapproval: &Preapproval,
        status: SubscriptionStatus,
    ) -> Result<WebhookOutcome, AppError> {
        let users = UserRepository::new(&self.pool);
        let plans = PlanRepository::new(&self.pool);

        let Some(user) = users.get_by_subscription(&preapproval.id).await? else {
            tracing::debug!(
                preapproval_id = %preapproval.id,
                "Downgrade event for unknown preapproval"
            );
            return Ok(WebhookOutcome::Ignored);
        };

        if user.subscription_status == status {
            return Ok(WebhookOutcome::AlreadyProcessed);
        }

        let free = plans.get_free().await?;
        users.set_plan(user.id, free.id, None, status).await?;

        tracing::info!(
            user_id = %user.id,
            status = ?status,
            "Tenant downgraded to free plan"
        );
        Ok(WebhookOutcome::Downgraded { user_id: user.id })
    }

    /// Look up a staged checkout by reference (payment-pending status checks).
    pub async fn staged_checkout(&self, reference: &str) -> Option<StagedCheckout> {
        self.staged.get(reference).await
    }
}
