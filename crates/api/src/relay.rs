//! Outbound message relay.
//!
//! A `send` whose recipient is an HTTP(S) URL is forwarded as a JSON POST
//! with a hard wall-clock deadline. Relay failure never fails the send: the
//! message is already persisted, and the outcome rides in the response's
//! `relayStatus` field.

use std::time::Duration;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use glyphnet_knowledge::models::Message;

/// Relay outcome reported in the send response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayStatus {
    /// Recipient was not a URL; nothing to relay
    Local,
    Delivered,
    Failed,
}

pub fn is_relay_recipient(recipient: &str) -> bool {
    recipient.starts_with("http://") || recipient.starts_with("https://")
}

/// POST the message to the external recipient. Non-2xx and timeout both
/// count as failure.
pub async fn relay_message(
    client: &reqwest::Client,
    msg: &Message,
    deadline_ms: u64,
) -> RelayStatus {
    let encrypted_payload = if msg.encrypted { msg.data.as_ref() } else { None };
    let body = json!({
        "glyph": msg.glyph,
        "data": msg.data,
        "encryptedPayload": encrypted_payload,
        "timestamp": msg.timestamp,
        "messageHash": msg.message_hash,
        "attestationTxHash": msg.attestation_tx_hash,
    });

    let result = client
        .post(&msg.recipient)
        .timeout(Duration::from_millis(deadline_ms))
        .json(&body)
        .send()
        .await;

    match result {
        Ok(response) if response.status().is_success() => {
            debug!(url = %msg.recipient, "relay delivered");
            RelayStatus::Delivered
        }
        Ok(response) => {
            warn!(url = %msg.recipient, status = %response.status(), "relay refused");
            RelayStatus::Failed
        }
        Err(e) => {
            warn!(url = %msg.recipient, "relay failed: {}", e);
            RelayStatus::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphnet_knowledge::hash::message_hash;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn message_to(recipient: &str) -> Message {
        Message {
            id: "m1".to_string(),
            glyph: "X01".to_string(),
            sender: "alice".to_string(),
            recipient: recipient.to_string(),
            data: Some(serde_json::json!({"amount": "5"})),
            timestamp: 1_700_000_000_000,
            message_hash: message_hash("X01", None, recipient, 1_700_000_000_000),
            attestation_tx_hash: None,
            encrypted: false,
        }
    }

    #[test]
    fn test_relay_recipient_detection() {
        assert!(is_relay_recipient("https://example.com/inbox"));
        assert!(is_relay_recipient("http://localhost:9000/hook"));
        assert!(!is_relay_recipient("agora"));
        assert!(!is_relay_recipient("agent:abc"));
    }

    #[tokio::test]
    async fn test_relay_delivers_on_2xx() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/inbox"))
            .and(body_partial_json(serde_json::json!({"glyph": "X01"})))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let msg = message_to(&format!("{}/inbox", server.uri()));
        let status = relay_message(&client, &msg, 10_000).await;
        assert_eq!(status, RelayStatus::Delivered);
    }

    #[tokio::test]
    async fn test_relay_fails_on_5xx() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let msg = message_to(&format!("{}/inbox", server.uri()));
        assert_eq!(relay_message(&client, &msg, 10_000).await, RelayStatus::Failed);
    }

    #[tokio::test]
    async fn test_relay_fails_on_deadline() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let msg = message_to(&format!("{}/inbox", server.uri()));
        assert_eq!(relay_message(&client, &msg, 50).await, RelayStatus::Failed);
    }
}
