//! Glyph definition types shared across the vocabulary tiers

use serde::{Deserialize, Serialize};

/// Semantic domain a base glyph belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Conversational primitives (query, respond, acknowledge)
    Foundation,
    /// Trading and token operations
    Crypto,
    /// Task delegation between agents
    Agent,
    /// Liveness and availability signals
    State,
    /// Invoicing and settlement
    Payment,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Foundation => "foundation",
            Domain::Crypto => "crypto",
            Domain::Agent => "agent",
            Domain::State => "state",
            Domain::Payment => "payment",
        }
    }

    /// Parse from the lowercase wire/storage form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "foundation" => Some(Domain::Foundation),
            "crypto" => Some(Domain::Crypto),
            "agent" => Some(Domain::Agent),
            "state" => Some(Domain::State),
            "payment" => Some(Domain::Payment),
            _ => None,
        }
    }
}

/// A base glyph definition: one semantic primitive with its keyword set.
///
/// Built-in and community glyphs share this shape; community glyphs carry
/// provenance on top (see [`CommunityGlyph`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlyphDefinition {
    /// Globally unique ID across built-in, community and compound spaces
    pub id: String,
    pub meaning: String,
    /// Gesture the glyph depicts
    pub pose: String,
    /// Single-character symbol used in compact renderings
    pub symbol: String,
    pub domain: Domain,
    /// Whole-word match targets, lowercase
    pub keywords: Vec<String>,
    pub visual_hint: String,
}

/// A community-installed base glyph: a [`GlyphDefinition`] plus provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityGlyph {
    #[serde(flatten)]
    pub def: GlyphDefinition,
    pub proposer: String,
    /// Epoch milliseconds
    pub created_at: i64,
}

/// A compound glyph: a new identifier bound to an ordered sequence of
/// existing glyph IDs. Compounds are referential, not semantic primitives;
/// they resolve by ID only and never join keyword matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompoundGlyph {
    pub id: String,
    pub name: String,
    /// At least two installed glyph IDs, order preserved
    pub components: Vec<String>,
    pub description: String,
    pub proposer: String,
    /// Epoch milliseconds
    pub created_at: i64,
    pub use_count: i64,
}
