//! Merchant (tenant) account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use treggio_core::{Email, PlanId, Slug, StoreFont, SubscriptionStatus, UserId};

/// A merchant account. One row per tenant; the slug addresses the storefront.
///
/// The password hash is intentionally not part of this struct - it is only
/// surfaced by the dedicated credential queries in the user repository.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub surname: String,
    pub phone: String,
    pub email: Email,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub store_name: String,
    pub slug: Slug,
    pub avatar: Option<String>,
    /// Promotional popup image shown on the storefront.
    pub popup: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub mission: Option<String>,
    pub vision: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub tiktok: Option<String>,
    pub youtube: Option<String>,
    pub menu_color: Option<String>,
    pub button_color: Option<String>,
    pub button_radius: Option<String>,
    pub font: StoreFont,
    pub plan_id: PlanId,
    /// Gateway preapproval id when the tenant is on a paid plan.
    pub subscription_id: Option<String>,
    pub subscription_status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the account has completed email verification.
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        self.email_verified_at.is_some()
    }

    /// Display name used in transactional email.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

/// Profile fields a merchant can edit in one request.
///
/// `None` means "leave unchanged"; the update query coalesces per column.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Email>,
    pub store_name: Option<String>,
    pub slug: Option<Slug>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub mission: Option<String>,
    pub vision: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
    pub tiktok: Option<String>,
    pub youtube: Option<String>,
    pub menu_color: Option<String>,
    pub button_color: Option<String>,
    pub button_radius: Option<String>,
    pub avatar: Option<String>,
    pub popup: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        let user = sample_user();
        assert_eq!(user.full_name(), "Rosa Mendez");
    }

    #[test]
    fn test_is_verified() {
        let mut user = sample_user();
        assert!(!user.is_verified());
        user.email_verified_at = Some(Utc::now());
        assert!(user.is_verified());
    }

    fn sample_user() -> User {
        User {
            id: UserId::new(1),
            name: "Rosa".to_string(),
            surname: "Mendez".to_string(),
            phone: "+57 300 000 0000".to_string(),
            email: Email::parse("rosa@example.com").unwrap(),
            email_verified_at: None,
            store_name: "Flores Rosa".to_string(),
            slug: Slug::parse("flores-rosa").unwrap(),
            avatar: None,
            popup: None,
            description: None,
            address: None,
            gender: None,
            mission: None,
            vision: None,
            facebook: None,
            instagram: None,
            tiktok: None,
            youtube: None,
            menu_color: None,
            button_color: None,
            button_radius: None,
            font: StoreFont::Roboto,
            plan_id: PlanId::new(1),
            subscription_id: None,
            subscription_status: SubscriptionStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
