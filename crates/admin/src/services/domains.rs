//! Custom domain connection and DNS verification.
//!
//! A merchant proves domain ownership either with a CNAME record pointing at
//! the platform domain or a TXT record containing the verification code we
//! generated at connect time.

use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::proto::rr::RecordType;
use rand::Rng;
use rand::distr::Alphanumeric;
use thiserror::Error;
use url::Url;

/// Length of the TXT verification code.
const VERIFICATION_CODE_LENGTH: usize = 32;

/// Errors from domain handling.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The submitted value is not a URL with a host.
    #[error("invalid domain")]
    InvalidDomain,

    /// The platform's own domain cannot be connected.
    #[error("cannot use the platform domain")]
    PlatformDomain,

    /// The system resolver could not be initialized.
    #[error("resolver error: {0}")]
    Resolver(String),
}

/// DNS instructions returned to the merchant after connecting a domain.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DnsInstructions {
    pub cname: String,
    pub txt: String,
}

/// Custom-domain service.
#[derive(Clone)]
pub struct DomainService {
    platform_domain: String,
}

impl DomainService {
    /// Create a new domain service.
    #[must_use]
    pub fn new(platform_domain: impl Into<String>) -> Self {
        Self {
            platform_domain: platform_domain.into(),
        }
    }

    /// The platform apex domain custom domains must CNAME to.
    #[must_use]
    pub fn platform_domain(&self) -> &str {
        &self.platform_domain
    }

    /// Extract and validate the host from a submitted domain URL.
    ///
    /// Accepts either a full URL (`https://tienda.example.com`) or a bare
    /// host name.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDomain` for unparseable input and `PlatformDomain`
    /// when the merchant submits our own domain.
    pub fn normalize(&self, input: &str) -> Result<String, DomainError> {
        let input = input.trim();
        let host = if input.contains("://") {
            Url::parse(input)
                .ok()
                .and_then(|u| u.host_str().map(str::to_lowercase))
                .ok_or(DomainError::InvalidDomain)?
        } else {
            let candidate = input.to_lowercase();
            if candidate.is_empty() || candidate.contains('/') || !candidate.contains('.') {
                return Err(DomainError::InvalidDomain);
            }
            candidate
        };

        if host == self.platform_domain {
            return Err(DomainError::PlatformDomain);
        }

        Ok(host)
    }

    /// Generate a fresh TXT verification code.
    #[must_use]
    pub fn generate_verification_code() -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(VERIFICATION_CODE_LENGTH)
            .map(char::from)
            .collect()
    }

    /// Instructions shown to the merchant for their DNS provider.
    #[must_use]
    pub fn instructions(&self, verification_code: &str) -> DnsInstructions {
        DnsInstructions {
            cname: format!("Crea un registro CNAME apuntando a {}", self.platform_domain),
            txt: format!("O agrega un registro TXT con el valor: {verification_code}"),
        }
    }

    /// Check the domain's DNS records: a CNAME to the platform domain or a
    /// TXT record carrying the verification code both pass.
    ///
    /// DNS failures (NXDOMAIN, timeouts) count as "not verified", not as
    /// errors - the merchant simply retries after propagation.
    ///
    /// # Errors
    ///
    /// Returns `Resolver` only when the system resolver cannot be built.
    pub async fn check_dns(
        &self,
        domain: &str,
        verification_code: Option<&str>,
    ) -> Result<bool, DomainError> {
        let resolver = TokioAsyncResolver::tokio_from_system_conf()
            .map_err(|e| DomainError::Resolver(e.to_string()))?;

        let cname_ok = match resolver.lookup(domain, RecordType::CNAME).await {
            Ok(lookup) => lookup.iter().any(|record| {
                record.as_cname().is_some_and(|target| {
                    target
                        .0
                        .to_utf8()
                        .trim_end_matches('.')
                        .eq_ignore_ascii_case(&self.platform_domain)
                })
            }),
            Err(_) => false,
        };
        if cname_ok {
            return Ok(true);
        }

        let Some(code) = verification_code else {
            return Ok(false);
        };

        let txt_ok = match resolver.txt_lookup(domain).await {
            Ok(lookup) => lookup.iter().any(|txt| {
                txt.iter()
                    .any(|part| String::from_utf8_lossy(part.as_ref()).trim() == code)
            }),
            Err(_) => false,
        };

        Ok(txt_ok)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service() -> DomainService {
        DomainService::new("app.treggio.co")
    }

    #[test]
    fn test_normalize_full_url() {
        assert_eq!(
            service().normalize("https://tienda.rosa.com/path").unwrap(),
            "tienda.rosa.com"
        );
    }

    #[test]
    fn test_normalize_bare_host() {
        assert_eq!(service().normalize("Tienda.Rosa.COM").unwrap(), "tienda.rosa.com");
    }

    #[test]
    fn test_normalize_rejects_platform_domain() {
        assert!(matches!(
            service().normalize("https://app.treggio.co"),
            Err(DomainError::PlatformDomain)
        ));
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(service().normalize("").is_err());
        assert!(service().normalize("no-dots").is_err());
        assert!(service().normalize("a/b").is_err());
    }

    #[test]
    fn test_verification_code_shape() {
        let code = DomainService::generate_verification_code();
        assert_eq!(code.len(), VERIFICATION_CODE_LENGTH);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(code, DomainService::generate_verification_code());
    }

    #[test]
    fn test_instructions_mention_both_records() {
        let instructions = service().instructions("abc123");
        assert!(instructions.cname.contains("app.treggio.co"));
        assert!(instructions.txt.contains("abc123"));
    }
}
