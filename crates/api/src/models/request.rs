//! API request models

use serde::Deserialize;
use serde_json::Value;

use glyphnet_vocab::Domain;

/// Body of `POST /encode`
#[derive(Debug, Deserialize)]
pub struct EncodeRequest {
    /// Natural-language fragment to resolve against the keyword tables
    pub text: String,
    pub data: Option<Value>,
    pub recipient: Option<String>,
}

/// Body of `POST /decode`
#[derive(Debug, Deserialize)]
pub struct DecodeRequest {
    pub glyph: String,
}

/// Body of `POST /decode/batch`
#[derive(Debug, Deserialize)]
pub struct DecodeBatchRequest {
    pub glyphs: Vec<String>,
}

/// Body of `POST /send`
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub glyph: String,
    pub data: Option<Value>,
    /// Agent address, the `agora` sentinel, or an external URL
    pub recipient: String,
    /// Agent name or address
    pub sender: String,
    #[serde(default)]
    pub encrypted: bool,
    #[serde(rename = "attestationTxHash")]
    pub attestation_tx_hash: Option<String>,
}

/// Body of `POST /knowledge/propose`
#[derive(Debug, Deserialize)]
pub struct ProposeCompoundRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// At least two installed glyph IDs, order preserved
    pub components: Vec<String>,
    pub proposer: String,
}

/// Body of `POST /knowledge/propose/base-glyph`
#[derive(Debug, Deserialize)]
pub struct ProposeBaseRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub domain: Domain,
    pub keywords: Vec<String>,
    pub meaning: String,
    /// Optional 16x16 monochrome bitmap, row-major
    pub bitmap: Option<Vec<u8>>,
    pub proposer: String,
}

/// Body of `POST /knowledge/endorse` and `/knowledge/reject`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub proposal_id: String,
    /// Agent name or address
    pub agent: String,
}

/// Body of `POST /governance/proposals/:id/amend`. Kind-specific fields
/// must match the proposal being amended.
#[derive(Debug, Deserialize)]
pub struct AmendRequest {
    pub agent: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub reason: Option<String>,
    pub components: Option<Vec<String>>,
    pub domain: Option<Domain>,
    pub keywords: Option<Vec<String>>,
    pub meaning: Option<String>,
    pub bitmap: Option<Vec<u8>>,
}

/// Body of `POST /governance/proposals/:id/comment`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub author: String,
    pub body: String,
    pub parent_id: Option<String>,
}

/// Pagination and filters shared by the list views. Out-of-range limits
/// are clamped server-side, never rejected.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub since: Option<i64>,
    pub glyph: Option<String>,
    pub sender: Option<String>,
    pub recipient: Option<String>,
}

/// Query of `GET /knowledge/proposals`
#[derive(Debug, Default, Deserialize)]
pub struct ProposalsQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query of `GET /knowledge/sequences`
#[derive(Debug, Default, Deserialize)]
pub struct SequencesQuery {
    pub promotable: Option<bool>,
}

/// Query of `GET /knowledge/query`
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
