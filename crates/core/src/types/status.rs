//! Status enums for various entities.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a catalog product.
///
/// Draft products are visible only in the merchant admin; published products
/// appear on the public storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum ProductState {
    #[default]
    Draft,
    Published,
}

/// Recurring-billing preapproval status reported by the payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum SubscriptionStatus {
    #[default]
    Pending,
    Authorized,
    Paused,
    Cancelled,
}

impl SubscriptionStatus {
    /// Parse the gateway's status string. Unknown values map to `None` so
    /// callers can decide whether to acknowledge or reject the event.
    #[must_use]
    pub fn from_gateway(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "authorized" => Some(Self::Authorized),
            "paused" => Some(Self::Paused),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

/// Marketing tracking pixel platforms merchants can configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum PixelPlatform {
    Meta,
    GoogleAds,
    Tiktok,
}

impl PixelPlatform {
    /// Stable identifier used in API payloads and the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Meta => "meta",
            Self::GoogleAds => "google_ads",
            Self::Tiktok => "tiktok",
        }
    }
}

/// AI marketing campaign lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum CampaignStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_status_from_gateway() {
        assert_eq!(
            SubscriptionStatus::from_gateway("authorized"),
            Some(SubscriptionStatus::Authorized)
        );
        assert_eq!(
            SubscriptionStatus::from_gateway("cancelled"),
            Some(SubscriptionStatus::Cancelled)
        );
        assert_eq!(SubscriptionStatus::from_gateway("garbage"), None);
    }

    #[test]
    fn test_pixel_platform_serde() {
        let json = serde_json::to_string(&PixelPlatform::GoogleAds).expect("serialize");
        assert_eq!(json, "\"google_ads\"");
        let parsed: PixelPlatform = serde_json::from_str("\"meta\"").expect("deserialize");
        assert_eq!(parsed, PixelPlatform::Meta);
    }

    #[test]
    fn test_product_state_default() {
        assert_eq!(ProductState::default(), ProductState::Draft);
    }
}
