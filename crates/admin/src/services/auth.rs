//! Merchant authentication service.
//!
//! Password hashing uses Argon2id; login rejects unverified accounts.
//! Email verification and password reset both use single-use random codes
//! delivered by email.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use thiserror::Error;

use treggio_core::{Email, PlanId, Slug, SubscriptionStatus};

use crate::db::users::NewUser;
use crate::db::{RepositoryError, UserRepository};
use crate::models::user::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The email address is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] treggio_core::EmailError),

    /// The store name cannot be turned into a slug.
    #[error("invalid store name: {0}")]
    InvalidStoreName(#[from] treggio_core::SlugError),

    /// Password does not meet requirements.
    #[error("{0}")]
    WeakPassword(String),

    /// Wrong email or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but the email is not verified yet.
    #[error("email not verified")]
    EmailNotVerified,

    /// The email is already registered.
    #[error("email already registered")]
    EmailTaken,

    /// The store name (slug) is already in use.
    #[error("store name already in use")]
    StoreNameTaken,

    /// Verification or reset code does not match any account.
    #[error("invalid code")]
    InvalidCode,

    /// The account does not exist.
    #[error("account not found")]
    UserNotFound,

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Database error.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Validated registration input, ready to be written (or staged).
#[derive(Debug, Clone)]
pub struct RegistrationData {
    pub name: String,
    pub surname: String,
    pub phone: String,
    pub email: Email,
    pub password_hash: String,
    pub store_name: String,
    pub slug: Slug,
}

/// Merchant authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Validate registration input and check uniqueness, without writing.
    ///
    /// Used both by free-plan registration (which creates the row right away)
    /// and paid-plan checkout (which stages the result until the gateway
    /// confirms).
    ///
    /// # Errors
    ///
    /// Returns a validation error, or `EmailTaken`/`StoreNameTaken` on
    /// uniqueness conflicts.
    pub async fn validate_registration(
        &self,
        name: &str,
        surname: &str,
        phone: &str,
        email: &str,
        password: &str,
        store_name: &str,
    ) -> Result<RegistrationData, AuthError> {
        let email = Email::parse(email)?;
        let slug = Slug::from_name(store_name)?;
        validate_password(password)?;

        if self.users.email_taken(&email, None).await? {
            return Err(AuthError::EmailTaken);
        }
        if self.users.slug_taken(&slug, None).await? {
            return Err(AuthError::StoreNameTaken);
        }

        Ok(RegistrationData {
            name: name.trim().to_string(),
            surname: surname.trim().to_string(),
            phone: phone.trim().to_string(),
            email,
            password_hash: hash_password(password)?,
            store_name: store_name.trim().to_string(),
            slug,
        })
    }

    /// Create a free-plan account with an activation code.
    ///
    /// # Errors
    ///
    /// Returns `EmailTaken`/`StoreNameTaken` on races with other signups.
    pub async fn register_free(
        &self,
        data: &RegistrationData,
        plan_id: PlanId,
        activation_code: &str,
    ) -> Result<User, AuthError> {
        let user = self
            .users
            .create(NewUser {
                name: &data.name,
                surname: &data.surname,
                phone: &data.phone,
                email: &data.email,
                password_hash: &data.password_hash,
                store_name: &data.store_name,
                slug: &data.slug,
                activation_code: Some(activation_code),
                plan_id,
                subscription_id: None,
                subscription_status: SubscriptionStatus::Pending,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` for a wrong email or password, and
    /// `EmailNotVerified` when the account has not been activated.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if !user.is_verified() {
            return Err(AuthError::EmailNotVerified);
        }

        Ok(user)
    }

    /// Activate the account holding an emailed verification code.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCode` for unknown codes.
    pub async fn verify_email(&self, code: &str) -> Result<User, AuthError> {
        self.users
            .verify_by_activation_code(code)
            .await?
            .ok_or(AuthError::InvalidCode)
    }

    /// Store a password-reset code for an account, returning it for mailing.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` for unknown emails.
    pub async fn start_password_reset(&self, email: &str, code: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        self.users
            .set_reset_code(&email, code)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Whether a reset code is valid (frontend pre-check).
    ///
    /// # Errors
    ///
    /// Returns `Repository` on database failure.
    pub async fn check_reset_code(&self, code: &str) -> Result<bool, AuthError> {
        Ok(self.users.get_by_reset_code(code).await?.is_some())
    }

    /// Complete a password reset: set the new password and clear the code.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCode` for unknown codes.
    pub async fn reset_password(&self, code: &str, new_password: &str) -> Result<(), AuthError> {
        validate_password(new_password)?;
        let hash = hash_password(new_password)?;
        if !self.users.reset_password(code, &hash).await? {
            return Err(AuthError::InvalidCode);
        }
        Ok(())
    }

    /// Change a logged-in merchant's password.
    ///
    /// # Errors
    ///
    /// Returns `WeakPassword` or a repository error.
    pub async fn change_password(
        &self,
        user_id: treggio_core::UserId,
        new_password: &str,
    ) -> Result<(), AuthError> {
        validate_password(new_password)?;
        let hash = hash_password(new_password)?;
        self.users.set_password(user_id, &hash).await?;
        Ok(())
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
pub(crate) fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("long-enough").is_ok());
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong password!", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
