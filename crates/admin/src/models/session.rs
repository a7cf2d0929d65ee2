//! Session types for merchant authentication.

use serde::{Deserialize, Serialize};

use treggio_core::UserId;

use super::user::User;

/// Session state for a logged-in merchant.
///
/// Kept deliberately small; anything else is re-read from the database so
/// profile edits take effect without re-login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentMerchant {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub store_name: String,
    pub slug: String,
}

impl From<&User> for CurrentMerchant {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.as_str().to_string(),
            name: user.full_name(),
            store_name: user.store_name.clone(),
            slug: user.slug.as_str().to_string(),
        }
    }
}

/// Well-known session keys.
pub mod session_keys {
    /// The logged-in merchant.
    pub const CURRENT_MERCHANT: &str = "current_merchant";
}
