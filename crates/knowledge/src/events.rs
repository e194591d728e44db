//! Broadcast event shapes.
//!
//! Both the message pipeline and governance publish through the same
//! channel; subscribers currently receive every event.

use serde::{Deserialize, Serialize};

use crate::models::AgentTier;

/// Body shared by all governance events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceEvent {
    pub proposal_id: String,
    pub agent: String,
    pub agent_tier: AgentTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
    pub timestamp: i64,
    /// Set on accept: the newly minted glyph ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glyph_id: Option<String>,
}

/// Everything that fans out to stream subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Message {
        glyph: String,
        sender: String,
        recipient: String,
        timestamp: i64,
    },
    GovernancePropose(GovernanceEvent),
    GovernanceEndorse(GovernanceEvent),
    GovernanceReject(GovernanceEvent),
    GovernanceComment(GovernanceEvent),
    GovernanceAmend(GovernanceEvent),
    GovernanceAccept(GovernanceEvent),
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Message { .. } => "message",
            Event::GovernancePropose(_) => "governance_propose",
            Event::GovernanceEndorse(_) => "governance_endorse",
            Event::GovernanceReject(_) => "governance_reject",
            Event::GovernanceComment(_) => "governance_comment",
            Event::GovernanceAmend(_) => "governance_amend",
            Event::GovernanceAccept(_) => "governance_accept",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_tag_matches_kind() {
        let ev = Event::GovernanceAccept(GovernanceEvent {
            proposal_id: "PB01".to_string(),
            agent: "agent:a".to_string(),
            agent_tier: AgentTier::OnChain,
            weight: Some(3),
            timestamp: 42,
            glyph_id: Some("B01".to_string()),
        });
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], ev.kind());
        assert_eq!(json["proposalId"], "PB01");
        assert_eq!(json["glyphId"], "B01");
    }

    #[test]
    fn test_message_event_shape() {
        let ev = Event::Message {
            glyph: "Q01".to_string(),
            sender: "alice".to_string(),
            recipient: "agora".to_string(),
            timestamp: 7,
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(json["recipient"], "agora");
    }
}
