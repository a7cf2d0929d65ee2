//! Webhook signature verification.
//!
//! The gateway signs notifications with an `x-signature` header of the form
//! `ts=<unix seconds>,v1=<hex hmac>`. The HMAC-SHA256 manifest is
//! `id:{data.id};request-id:{x-request-id};ts:{ts};` keyed with the
//! account's webhook secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::error::GatewayError;

type HmacSha256 = Hmac<Sha256>;

/// Parsed `x-signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub ts: String,
    pub v1: String,
}

/// Parse an `x-signature` header value.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidSignature`] when either part is missing.
pub fn parse_signature_header(value: &str) -> Result<SignatureHeader, GatewayError> {
    let mut ts = None;
    let mut v1 = None;

    for part in value.split(',') {
        let Some((key, val)) = part.split_once('=') else {
            continue;
        };
        match key.trim() {
            "ts" => ts = Some(val.trim().to_string()),
            "v1" => v1 = Some(val.trim().to_string()),
            _ => {}
        }
    }

    match (ts, v1) {
        (Some(ts), Some(v1)) => Ok(SignatureHeader { ts, v1 }),
        _ => Err(GatewayError::InvalidSignature),
    }
}

/// Compute the expected HMAC for a notification.
#[must_use]
pub fn compute_signature(secret: &str, data_id: &str, request_id: &str, ts: &str) -> String {
    let manifest = format!("id:{data_id};request-id:{request_id};ts:{ts};");
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(manifest.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify an inbound webhook signature.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidSignature`] on header parse failure or
/// HMAC mismatch.
pub fn verify_webhook_signature(
    secret: &str,
    header_value: &str,
    data_id: &str,
    request_id: &str,
) -> Result<(), GatewayError> {
    let header = parse_signature_header(header_value)?;

    // Constant-time comparison via the hmac crate
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(format!("id:{data_id};request-id:{request_id};ts:{};", header.ts).as_bytes());
    let provided = hex::decode(&header.v1).map_err(|_| GatewayError::InvalidSignature)?;
    mac.verify_slice(&provided)
        .map_err(|_| GatewayError::InvalidSignature)

}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SECRET: &str = "8f3b1c9d2e4a5f60";

    #[test]
    fn test_parse_signature_header() {
        let header = parse_signature_header("ts=1700000000,v1=abcdef").unwrap();
        assert_eq!(header.ts, "1700000000");
        assert_eq!(header.v1, "abcdef");
    }

    #[test]
    fn test_parse_signature_header_with_spaces() {
        let header = parse_signature_header("ts=1700000000, v1=abcdef").unwrap();
        assert_eq!(header.v1, "abcdef");
    }

    #[test]
    fn test_parse_signature_header_missing_parts() {
        assert!(parse_signature_header("ts=1700000000").is_err());
        assert!(parse_signature_header("garbage").is_err());
    }

    #[test]
    fn test_valid_signature_roundtrip() {
        let sig = compute_signature(SECRET, "pre_123", "req-9", "1700000000");
        let header = format!("ts=1700000000,v1={sig}");
        assert!(verify_webhook_signature(SECRET, &header, "pre_123", "req-9").is_ok());
    }

    #[test]
    fn test_tampered_data_id_rejected() {
        let sig = compute_signature(SECRET, "pre_123", "req-9", "1700000000");
        let header = format!("ts=1700000000,v1={sig}");
        assert!(matches!(
            verify_webhook_signature(SECRET, &header, "pre_999", "req-9"),
            Err(GatewayError::InvalidSignature)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let sig = compute_signature("other-secret-value", "pre_123", "req-9", "1700000000");
        let header = format!("ts=1700000000,v1={sig}");
        assert!(verify_webhook_signature(SECRET, &header, "pre_123", "req-9").is_err());
    }

    #[test]
    fn test_non_hex_signature_rejected() {
        assert!(verify_webhook_signature(SECRET, "ts=1,v1=zzzz", "a", "b").is_err());
    }
}
