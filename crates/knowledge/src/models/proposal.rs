//! Governance records: proposals, votes, comments, audit log

use serde::{Deserialize, Serialize};

use glyphnet_vocab::Domain;

use super::agent::AgentTier;

/// What a proposal would add to the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalKind {
    #[serde(rename = "compound")]
    Compound,
    #[serde(rename = "base_glyph")]
    BaseGlyph,
}

impl ProposalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalKind::Compound => "compound",
            ProposalKind::BaseGlyph => "base_glyph",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "compound" => Some(ProposalKind::Compound),
            "base_glyph" => Some(ProposalKind::BaseGlyph),
            _ => None,
        }
    }

    /// Proposal IDs carry a kind-specific prefix.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            ProposalKind::Compound => "PC",
            ProposalKind::BaseGlyph => "PB",
        }
    }
}

/// Lifecycle status. `pending` is the only non-terminal state; every other
/// status is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
    Expired,
    Superseded,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Accepted => "accepted",
            ProposalStatus::Rejected => "rejected",
            ProposalStatus::Expired => "expired",
            ProposalStatus::Superseded => "superseded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ProposalStatus::Pending),
            "accepted" => Some(ProposalStatus::Accepted),
            "rejected" => Some(ProposalStatus::Rejected),
            "expired" => Some(ProposalStatus::Expired),
            "superseded" => Some(ProposalStatus::Superseded),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProposalStatus::Pending)
    }
}

/// Kind-specific proposal payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProposalPayload {
    Compound {
        components: Vec<String>,
    },
    BaseGlyph {
        domain: Domain,
        keywords: Vec<String>,
        meaning: String,
        /// Optional 16x16 monochrome bitmap, row-major
        #[serde(skip_serializing_if = "Option::is_none")]
        bitmap: Option<Vec<u8>>,
    },
}

/// A recorded vote. The tier and weight are frozen at vote time; later tier
/// changes never re-weight past votes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub proposal_id: String,
    pub agent_address: String,
    pub action: VoteAction,
    pub weight: i64,
    pub tier: AgentTier,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteAction {
    Endorse,
    Reject,
}

impl VoteAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteAction::Endorse => "endorse",
            VoteAction::Reject => "reject",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "endorse" => Some(VoteAction::Endorse),
            "reject" => Some(VoteAction::Reject),
            _ => None,
        }
    }
}

/// A proposal with its votes loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ProposalKind,
    pub status: ProposalStatus,
    pub name: String,
    pub description: String,
    pub proposer: String,
    pub created_at: i64,
    pub expires_at: i64,
    pub min_vote_at: i64,
    pub endorsers: Vec<Vote>,
    pub rejectors: Vec<Vote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supersedes: Option<String>,
    pub payload: ProposalPayload,
}

impl Proposal {
    pub fn endorsement_weight(&self) -> i64 {
        self.endorsers.iter().map(|v| v.weight).sum()
    }

    pub fn rejection_weight(&self) -> i64 {
        self.rejectors.iter().map(|v| v.weight).sum()
    }

    pub fn has_voted(&self, agent_address: &str) -> bool {
        self.endorsers
            .iter()
            .chain(self.rejectors.iter())
            .any(|v| v.agent_address == agent_address)
    }
}

/// A discussion comment. Threading is single-level: a reply's parent must
/// itself be a top-level comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub proposal_id: String,
    pub author: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub created_at: i64,
}

/// Audit log actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogAction {
    Propose,
    Endorse,
    Reject,
    Comment,
    Amend,
    Accept,
    Supersede,
    Expire,
}

impl LogAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogAction::Propose => "propose",
            LogAction::Endorse => "endorse",
            LogAction::Reject => "reject",
            LogAction::Comment => "comment",
            LogAction::Amend => "amend",
            LogAction::Accept => "accept",
            LogAction::Supersede => "supersede",
            LogAction::Expire => "expire",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "propose" => Some(LogAction::Propose),
            "endorse" => Some(LogAction::Endorse),
            "reject" => Some(LogAction::Reject),
            "comment" => Some(LogAction::Comment),
            "amend" => Some(LogAction::Amend),
            "accept" => Some(LogAction::Accept),
            "supersede" => Some(LogAction::Supersede),
            "expire" => Some(LogAction::Expire),
            _ => None,
        }
    }
}

/// Append-only audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GovernanceLogEntry {
    pub id: i64,
    pub proposal_id: String,
    pub action: LogAction,
    pub agent: String,
    pub agent_tier: AgentTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(addr: &str, action: VoteAction, weight: i64) -> Vote {
        Vote {
            proposal_id: "PC01".to_string(),
            agent_address: addr.to_string(),
            action,
            weight,
            tier: AgentTier::Unverified,
            timestamp: 0,
        }
    }

    fn proposal_with(endorsers: Vec<Vote>, rejectors: Vec<Vote>) -> Proposal {
        Proposal {
            id: "PC01".to_string(),
            kind: ProposalKind::Compound,
            status: ProposalStatus::Pending,
            name: "stake-then-swap".to_string(),
            description: String::new(),
            proposer: "agent:a".to_string(),
            created_at: 0,
            expires_at: 1,
            min_vote_at: 0,
            endorsers,
            rejectors,
            superseded_by: None,
            supersedes: None,
            payload: ProposalPayload::Compound {
                components: vec!["X05".to_string(), "X01".to_string()],
            },
        }
    }

    #[test]
    fn test_weight_tallies() {
        let p = proposal_with(
            vec![
                vote("a", VoteAction::Endorse, 1),
                vote("b", VoteAction::Endorse, 3),
            ],
            vec![vote("c", VoteAction::Reject, 2)],
        );
        assert_eq!(p.endorsement_weight(), 4);
        assert_eq!(p.rejection_weight(), 2);
    }

    #[test]
    fn test_has_voted_covers_both_sides() {
        let p = proposal_with(
            vec![vote("a", VoteAction::Endorse, 1)],
            vec![vote("b", VoteAction::Reject, 1)],
        );
        assert!(p.has_voted("a"));
        assert!(p.has_voted("b"));
        assert!(!p.has_voted("c"));
    }

    #[test]
    fn test_status_terminality() {
        assert!(!ProposalStatus::Pending.is_terminal());
        for s in [
            ProposalStatus::Accepted,
            ProposalStatus::Rejected,
            ProposalStatus::Expired,
            ProposalStatus::Superseded,
        ] {
            assert!(s.is_terminal());
        }
    }

    #[test]
    fn test_kind_prefixes_differ() {
        assert_ne!(
            ProposalKind::Compound.id_prefix(),
            ProposalKind::BaseGlyph.id_prefix()
        );
    }

    #[test]
    fn test_proposal_serializes_type_field() {
        let p = proposal_with(vec![], vec![]);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["type"], "compound");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["minVoteAt"], 0);
    }

    #[test]
    fn test_payload_round_trip() {
        let payload = ProposalPayload::BaseGlyph {
            domain: Domain::Agent,
            keywords: vec!["replan".to_string()],
            meaning: "revise the plan".to_string(),
            bitmap: None,
        };
        let json = serde_json::to_string(&payload).unwrap();
        let back: ProposalPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(payload, back);
    }
}
