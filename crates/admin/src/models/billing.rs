//! Plans, purchases, and staged registrations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use treggio_core::{Email, PlanId, ProductId, PurchaseId, Slug, UserId};

/// A subscription tier.
///
/// `product_limit = None` means unlimited; the free plan has a small limit.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
    /// Preapproval plan id on the payment gateway; `None` for the free plan.
    pub gateway_plan_id: Option<String>,
    pub product_limit: Option<i32>,
    pub is_free: bool,
}

impl Plan {
    /// Whether a tenant on this plan may create one more product.
    #[must_use]
    pub fn allows_products(&self, current_count: i64) -> bool {
        self.product_limit
            .is_none_or(|limit| current_count < i64::from(limit))
    }
}

/// An order received by a store (public checkout intake).
#[derive(Debug, Clone, Serialize)]
pub struct Purchase {
    pub id: PurchaseId,
    /// The store owner who received the order.
    pub user_id: UserId,
    pub total: Decimal,
    pub buyer_name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub payment_method: Option<String>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<PurchaseItem>,
}

/// A line item in a purchase; unit price is snapshotted from the product.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseItem {
    pub id: i32,
    pub purchase_id: PurchaseId,
    pub product_id: ProductId,
    pub product_title: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// Registration data staged while the gateway confirms a paid subscription.
///
/// Nothing is written to the database until the `authorized` webhook arrives;
/// the payload (with the password already hashed) waits in the staging cache
/// keyed by the external reference we handed to the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRegistration {
    pub name: String,
    pub surname: String,
    pub phone: String,
    pub email: Email,
    /// Argon2 hash; the plaintext never enters the staging cache.
    pub password_hash: String,
    pub store_name: String,
    pub slug: Slug,
    pub plan_id: PlanId,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_limit_checks() {
        let mut plan = Plan {
            id: PlanId::new(1),
            name: "Gratis".to_string(),
            price: Decimal::ZERO,
            description: None,
            gateway_plan_id: None,
            product_limit: Some(3),
            is_free: true,
        };

        assert!(plan.allows_products(0));
        assert!(plan.allows_products(2));
        assert!(!plan.allows_products(3));
        assert!(!plan.allows_products(10));

        plan.product_limit = None;
        assert!(plan.allows_products(10_000));
    }
}
