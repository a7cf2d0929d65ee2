//! Store appearance and configuration models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use treggio_core::{DomainId, NoticeId, PaymentMethodId, PixelId, PixelPlatform, SliderId, UserId};

/// A homepage slider/banner.
#[derive(Debug, Clone, Serialize)]
pub struct Slider {
    pub id: SliderId,
    pub user_id: UserId,
    pub title: String,
    pub subtitle: Option<String>,
    pub label: Option<String>,
    /// Image path under the media root.
    pub image: Option<String>,
    pub link: Option<String>,
    pub state: bool,
    /// 1 = plain banner, 2 = campaign banner with pricing.
    pub kind: i16,
    pub price_original: Option<Decimal>,
    pub price_campaign: Option<Decimal>,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A storefront announcement bar ("aviso").
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub id: NoticeId,
    pub user_id: UserId,
    /// Rich text (HTML or Markdown) rendered by the storefront.
    pub content: String,
    /// Free-form style overrides chosen in the editor.
    pub styles: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A marketing tracking pixel. One per platform per tenant.
#[derive(Debug, Clone, Serialize)]
pub struct Pixel {
    pub id: PixelId,
    pub user_id: UserId,
    pub platform: PixelPlatform,
    pub pixel_id: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// An entry in the global payment method catalog.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub name: String,
    pub is_active: bool,
}

/// A tenant's shipping configuration (singleton per tenant).
#[derive(Debug, Clone, Serialize)]
pub struct ShippingOption {
    pub user_id: UserId,
    pub is_free: bool,
    pub rate: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// A custom domain connected to a store (1:1 with the tenant).
#[derive(Debug, Clone, Serialize)]
pub struct CustomDomain {
    pub id: DomainId,
    pub user_id: UserId,
    pub domain: String,
    pub is_verified: bool,
    /// TXT record value proving ownership; cleared once verified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
