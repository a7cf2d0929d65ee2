//! Domain models for the admin API.
//!
//! Row-backed structs live here; the `db` module owns the queries that
//! produce them. Everything tenant-owned carries its `UserId`.

pub mod billing;
pub mod campaign;
pub mod catalog;
pub mod session;
pub mod store;
pub mod user;

pub use billing::{PendingRegistration, Plan, Purchase, PurchaseItem};
pub use campaign::{Campaign, CampaignVersion, GeneratedCampaign};
pub use catalog::{
    Attribute, Brand, Category, Product, ProductImage, Property, Specification, Variation,
};
pub use session::{CurrentMerchant, session_keys};
pub use store::{CustomDomain, Notice, PaymentMethod, Pixel, ShippingOption, Slider};
pub use user::User;
