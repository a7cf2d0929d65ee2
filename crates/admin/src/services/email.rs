//! Email service for account verification, password resets, and billing
//! notifications.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

/// HTML template for the account verification email.
#[derive(Template)]
#[template(path = "email/verification.html")]
struct VerificationEmailHtml<'a> {
    verify_url: &'a str,
}

/// Plain text template for the account verification email.
#[derive(Template)]
#[template(path = "email/verification.txt")]
struct VerificationEmailText<'a> {
    verify_url: &'a str,
}

/// HTML template for the password reset email.
#[derive(Template)]
#[template(path = "email/password_reset.html")]
struct PasswordResetEmailHtml<'a> {
    code: &'a str,
}

/// Plain text template for the password reset email.
#[derive(Template)]
#[template(path = "email/password_reset.txt")]
struct PasswordResetEmailText<'a> {
    code: &'a str,
}

/// HTML template for the subscription-activated email.
#[derive(Template)]
#[template(path = "email/subscription_active.html")]
struct SubscriptionActiveEmailHtml<'a> {
    name: &'a str,
    plan_name: &'a str,
    store_url: &'a str,
}

/// Plain text template for the subscription-activated email.
#[derive(Template)]
#[template(path = "email/subscription_active.txt")]
struct SubscriptionActiveEmailText<'a> {
    name: &'a str,
    plan_name: &'a str,
    store_url: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send the account verification email with an activation link.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send or a template fails to render.
    pub async fn send_verification(&self, to: &str, verify_url: &str) -> Result<(), EmailError> {
        let html = VerificationEmailHtml { verify_url }.render()?;
        let text = VerificationEmailText { verify_url }.render()?;

        self.send_multipart_email(to, "Verifica tu cuenta de Treggio", &text, &html)
            .await
    }

    /// Send a password reset code.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send or a template fails to render.
    pub async fn send_password_reset(&self, to: &str, code: &str) -> Result<(), EmailError> {
        let html = PasswordResetEmailHtml { code }.render()?;
        let text = PasswordResetEmailText { code }.render()?;

        self.send_multipart_email(to, "Recupera tu contraseña de Treggio", &text, &html)
            .await
    }

    /// Tell a merchant their paid subscription is active and the store is live.
    ///
    /// # Errors
    ///
    /// Returns error if the email fails to send or a template fails to render.
    pub async fn send_subscription_active(
        &self,
        to: &str,
        name: &str,
        plan_name: &str,
        store_url: &str,
    ) -> Result<(), EmailError> {
        let html = SubscriptionActiveEmailHtml {
            name,
            plan_name,
            store_url,
        }
        .render()?;
        let text = SubscriptionActiveEmailText {
            name,
            plan_name,
            store_url,
        }
        .render()?;

        self.send_multipart_email(to, "Tu suscripción a Treggio está activa", &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;
        tracing::info!(to = %to, subject = %subject, "Email sent");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_templates_render() {
        let html = VerificationEmailHtml {
            verify_url: "https://app.treggio.co/ingresar?code=abc123",
        }
        .render()
        .unwrap();
        assert!(html.contains("https://app.treggio.co/ingresar?code=abc123"));

        let text = VerificationEmailText {
            verify_url: "https://app.treggio.co/ingresar?code=abc123",
        }
        .render()
        .unwrap();
        assert!(text.contains("ingresar?code=abc123"));
    }

    #[test]
    fn test_password_reset_templates_render() {
        let html = PasswordResetEmailHtml { code: "55aa77" }.render().unwrap();
        assert!(html.contains("55aa77"));

        let text = PasswordResetEmailText { code: "55aa77" }.render().unwrap();
        assert!(text.contains("55aa77"));
    }

    #[test]
    fn test_subscription_active_templates_render() {
        let html = SubscriptionActiveEmailHtml {
            name: "Rosa",
            plan_name: "Emprendedor",
            store_url: "https://app.treggio.co/flores-rosa",
        }
        .render()
        .unwrap();
        assert!(html.contains("Rosa"));
        assert!(html.contains("Emprendedor"));
        assert!(html.contains("flores-rosa"));
    }
}
