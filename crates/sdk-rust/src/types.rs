//! Wire types mirrored from the server

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct EncodeRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeResponse {
    pub glyph: String,
    pub meaning: String,
    pub pose: String,
    pub symbol: String,
    pub domain: String,
    pub data: Option<Value>,
    pub recipient: Option<String>,
    pub timestamp: i64,
    pub message_hash: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendRequest {
    pub glyph: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub recipient: String,
    pub sender: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub encrypted: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub success: bool,
    pub message_hash: String,
    pub glyph_id: String,
    pub recipient: String,
    pub timestamp: i64,
    pub relay_status: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub protocols: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub address: String,
    pub name: String,
    pub tier: String,
    pub wallet_address: Option<String>,
    pub service_url: Option<String>,
    pub protocols: Vec<String>,
    pub registered_at: i64,
    pub last_seen: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProposeCompoundRequest {
    pub name: String,
    pub description: String,
    pub components: Vec<String>,
    pub proposer: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub proposal_id: String,
    pub agent: String,
}

/// A proposal as returned by the governance endpoints. Payload fields stay
/// loose JSON; callers match on `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub name: String,
    pub description: String,
    pub proposer: String,
    pub created_at: i64,
    pub expires_at: i64,
    pub min_vote_at: i64,
    pub endorsers: Vec<Value>,
    pub rejectors: Vec<Value>,
    pub payload: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProposalList {
    pub proposals: Vec<Proposal>,
}
