//! Request and response types for the payment gateway API.

use serde::{Deserialize, Serialize};

/// A recurring-billing preapproval as returned by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct Preapproval {
    /// Gateway-assigned preapproval id.
    pub id: String,
    /// Raw status string (`pending`, `authorized`, `paused`, `cancelled`).
    pub status: String,
    /// Our correlation key, echoed back from creation.
    pub external_reference: Option<String>,
    /// Preapproval plan the payer subscribed to.
    pub preapproval_plan_id: Option<String>,
    /// Payer email, when the gateway discloses it.
    pub payer_email: Option<String>,
    /// Checkout URL the payer is redirected to for authorization.
    pub init_point: Option<String>,
}

/// Payload for creating a preapproval.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePreapproval<'a> {
    /// Human-readable subscription description shown at checkout.
    pub reason: &'a str,
    /// Correlation key we use to find the staged registration later.
    pub external_reference: &'a str,
    pub payer_email: &'a str,
    pub preapproval_plan_id: &'a str,
    /// URL the payer returns to after checkout.
    pub back_url: &'a str,
}

/// Inbound webhook notification body.
///
/// The gateway posts `{"type": "...", "data": {"id": "..."}}`; everything
/// else in the payload is ignorable metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookNotification {
    /// Event type, e.g. `subscription_preapproval` or `payment`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event subject.
    pub data: WebhookData,
}

/// The subject of a webhook notification.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookData {
    /// Id of the preapproval (or payment) the event refers to.
    pub id: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_notification_deserializes() {
        let json = r#"{"type": "subscription_preapproval", "data": {"id": "2c93808477"}}"#;
        let parsed: WebhookNotification = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.event_type, "subscription_preapproval");
        assert_eq!(parsed.data.id, "2c93808477");
    }

    #[test]
    fn test_webhook_notification_tolerates_extra_fields() {
        let json = r#"{
            "id": 12345,
            "live_mode": true,
            "type": "payment",
            "date_created": "2025-06-01T10:00:00Z",
            "data": {"id": "999"}
        }"#;
        let parsed: WebhookNotification = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.event_type, "payment");
        assert_eq!(parsed.data.id, "999");
    }

    #[test]
    fn test_preapproval_deserializes_minimal() {
        let json = r#"{"id": "pre_1", "status": "authorized"}"#;
        let parsed: Preapproval = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.id, "pre_1");
        assert_eq!(parsed.status, "authorized");
        assert!(parsed.external_reference.is_none());
        assert!(parsed.init_point.is_none());
    }
}
