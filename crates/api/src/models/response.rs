//! API response models

use serde::Serialize;
use serde_json::Value;

use glyphnet_vocab::{CommunityGlyph, CompoundGlyph, Domain, GlyphDefinition, ResolvedGlyph};

use crate::relay::RelayStatus;

/// Body of a successful `POST /encode`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodeResponse {
    pub glyph: String,
    pub meaning: String,
    pub pose: String,
    pub symbol: String,
    pub domain: Domain,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    pub timestamp: i64,
    pub message_hash: String,
}

/// Body of a successful `POST /send`. Relay and broadcast problems are
/// non-fatal status fields here, never HTTP errors.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub success: bool,
    pub message_hash: String,
    pub glyph_id: String,
    pub recipient: String,
    pub timestamp: i64,
    pub relay_status: RelayStatus,
}

/// One entry of `POST /decode/batch`
#[derive(Debug, Serialize)]
pub struct DecodeBatchItem {
    pub glyph: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<Value>,
}

/// Body of `GET /glyphs`
#[derive(Debug, Serialize)]
pub struct GlyphCatalog {
    pub builtin: Vec<GlyphDefinition>,
    pub community: Vec<CommunityGlyph>,
    pub compounds: Vec<CompoundGlyph>,
}

/// A resolved glyph in wire form: base definitions serialize as-is,
/// compounds carry their component list.
pub fn resolved_to_json(resolved: &ResolvedGlyph<'_>) -> Value {
    match resolved {
        ResolvedGlyph::Base(def) => serde_json::json!(def),
        ResolvedGlyph::Community(glyph) => serde_json::json!(glyph),
        ResolvedGlyph::Compound(compound) => {
            let mut value = serde_json::json!(compound);
            value["kind"] = serde_json::json!("compound");
            value
        }
    }
}
