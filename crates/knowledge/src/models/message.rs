//! Message log records

use serde::{Deserialize, Serialize};

/// Recipient sentinel for the public broadcast channel.
pub const AGORA: &str = "agora";

/// A single persisted message. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub glyph: String,
    /// Agent name or address
    pub sender: String,
    /// Agent address, the `agora` sentinel, or an external URL
    pub recipient: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Arrival time, epoch milliseconds
    pub timestamp: i64,
    /// SHA-256 over the canonical JSON of glyph + data + recipient + timestamp
    pub message_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attestation_tx_hash: Option<String>,
    #[serde(default)]
    pub encrypted: bool,
}

impl Message {
    pub fn is_agora(&self) -> bool {
        self.recipient == AGORA
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agora_sentinel() {
        let mut msg = Message {
            id: "m1".to_string(),
            glyph: "Q01".to_string(),
            sender: "alice".to_string(),
            recipient: AGORA.to_string(),
            data: None,
            timestamp: 0,
            message_hash: String::new(),
            attestation_tx_hash: None,
            encrypted: false,
        };
        assert!(msg.is_agora());
        msg.recipient = "agent:abc".to_string();
        assert!(!msg.is_agora());
    }
}
