//! Business logic services for the admin API.

pub mod auth;
pub mod billing;
pub mod domains;
pub mod email;
pub mod marketing;
pub mod media;

pub use auth::AuthService;
pub use billing::BillingService;
pub use domains::DomainService;
pub use email::EmailService;
pub use marketing::MarketingService;
pub use media::MediaStore;
