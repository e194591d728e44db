//! Agent identity records

use serde::{Deserialize, Serialize};

/// Trust tier of an agent. Tiers only ever increase, and the tier in force
/// at vote time decides that vote's weight for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgentTier {
    #[serde(rename = "unverified")]
    Unverified,
    #[serde(rename = "wallet-linked")]
    WalletLinked,
    #[serde(rename = "on-chain")]
    OnChain,
}

impl AgentTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentTier::Unverified => "unverified",
            AgentTier::WalletLinked => "wallet-linked",
            AgentTier::OnChain => "on-chain",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unverified" => Some(AgentTier::Unverified),
            "wallet-linked" => Some(AgentTier::WalletLinked),
            "on-chain" => Some(AgentTier::OnChain),
            _ => None,
        }
    }

    /// Vote weight granted by this tier.
    pub fn weight(&self) -> i64 {
        match self {
            AgentTier::Unverified => 1,
            AgentTier::WalletLinked => 2,
            AgentTier::OnChain => 3,
        }
    }
}

/// A registered agent. Never deleted; `last_seen` is touched on every
/// message the agent originates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub address: String,
    pub name: String,
    pub tier: AgentTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    pub protocols: Vec<String>,
    pub registered_at: i64,
    pub last_seen: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering_is_monotonic() {
        assert!(AgentTier::Unverified < AgentTier::WalletLinked);
        assert!(AgentTier::WalletLinked < AgentTier::OnChain);
    }

    #[test]
    fn test_tier_weights() {
        assert_eq!(AgentTier::Unverified.weight(), 1);
        assert_eq!(AgentTier::WalletLinked.weight(), 2);
        assert_eq!(AgentTier::OnChain.weight(), 3);
    }

    #[test]
    fn test_tier_wire_form() {
        assert_eq!(AgentTier::parse("wallet-linked"), Some(AgentTier::WalletLinked));
        assert_eq!(AgentTier::parse("admin"), None);
        let json = serde_json::to_string(&AgentTier::OnChain).unwrap();
        assert_eq!(json, "\"on-chain\"");
    }
}
