//! The live vocabulary: built-in table ∪ community base glyphs, with
//! compound glyphs tracked separately.
//!
//! A glyph ID is bound to exactly one definition across all three spaces.
//! Lookup is case-insensitive; matching order is built-ins in declaration
//! order, then community glyphs in install order.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Result, VocabError};
use crate::matcher::first_keyword_hit;
use crate::suggest;
use crate::types::{CommunityGlyph, CompoundGlyph, GlyphDefinition};

/// Which space a resolved ID lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Builtin(usize),
    Community(usize),
    Compound(usize),
}

/// A successful `resolve` outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedGlyph<'a> {
    Base(&'a GlyphDefinition),
    Community(&'a CommunityGlyph),
    Compound(&'a CompoundGlyph),
}

impl ResolvedGlyph<'_> {
    pub fn id(&self) -> &str {
        match self {
            ResolvedGlyph::Base(d) => &d.id,
            ResolvedGlyph::Community(c) => &c.def.id,
            ResolvedGlyph::Compound(c) => &c.id,
        }
    }

    /// The base definition, when this is not a compound.
    pub fn definition(&self) -> Option<&GlyphDefinition> {
        match self {
            ResolvedGlyph::Base(d) => Some(d),
            ResolvedGlyph::Community(c) => Some(&c.def),
            ResolvedGlyph::Compound(_) => None,
        }
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, ResolvedGlyph::Compound(_))
    }
}

/// In-memory glyph registry.
///
/// Mutated only through `install_*`, which the governance promotion path
/// calls after its transaction commits; holders wrap this in a lock so
/// readers see either the old or the new map, never a torn one.
pub struct Vocabulary {
    builtins: Vec<GlyphDefinition>,
    community: Vec<CommunityGlyph>,
    compounds: Vec<CompoundGlyph>,
    /// Uppercased ID → slot, across all three spaces
    index: HashMap<String, Slot>,
}

impl Vocabulary {
    /// Build from the built-in table alone.
    pub fn new(builtins: Vec<GlyphDefinition>) -> Self {
        let mut index = HashMap::new();
        for (i, g) in builtins.iter().enumerate() {
            index.insert(g.id.to_uppercase(), Slot::Builtin(i));
        }
        Self {
            builtins,
            community: Vec::new(),
            compounds: Vec::new(),
            index,
        }
    }

    /// Build from the built-in table plus persisted community and compound
    /// rows, in their original install order.
    pub fn load(
        builtins: Vec<GlyphDefinition>,
        community: Vec<CommunityGlyph>,
        compounds: Vec<CompoundGlyph>,
    ) -> Result<Self> {
        let mut vocab = Self::new(builtins);
        for g in community {
            vocab.install_community(g)?;
        }
        for c in compounds {
            vocab.install_compound(c)?;
        }
        Ok(vocab)
    }

    /// Case-insensitive lookup across all three spaces.
    pub fn resolve(&self, id: &str) -> Option<ResolvedGlyph<'_>> {
        match self.index.get(&id.to_uppercase())? {
            Slot::Builtin(i) => Some(ResolvedGlyph::Base(&self.builtins[*i])),
            Slot::Community(i) => Some(ResolvedGlyph::Community(&self.community[*i])),
            Slot::Compound(i) => Some(ResolvedGlyph::Compound(&self.compounds[*i])),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(&id.to_uppercase())
    }

    /// Lowercase whole-word keyword search. Built-ins first in declaration
    /// order, then community glyphs in install order; first hit wins.
    /// Compounds never participate.
    pub fn match_text(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        for g in &self.builtins {
            if first_keyword_hit(&lower, &g.keywords).is_some() {
                return Some(&g.id);
            }
        }
        for g in &self.community {
            if first_keyword_hit(&lower, &g.def.keywords).is_some() {
                return Some(&g.def.id);
            }
        }
        None
    }

    /// As `match_text`, but also reports which keyword matched.
    pub fn match_text_with_keyword(&self, text: &str) -> Option<(&str, &str)> {
        let lower = text.to_lowercase();
        for g in &self.builtins {
            if let Some(kw) = first_keyword_hit(&lower, &g.keywords) {
                return Some((&g.id, kw));
            }
        }
        for g in &self.community {
            if let Some(kw) = first_keyword_hit(&lower, &g.def.keywords) {
                return Some((&g.def.id, kw));
            }
        }
        None
    }

    /// The `n` keywords closest to the input, for encode-miss responses.
    pub fn suggest(&self, text: &str, n: usize) -> Vec<String> {
        let keywords = self
            .builtins
            .iter()
            .flat_map(|g| g.keywords.iter())
            .chain(self.community.iter().flat_map(|g| g.def.keywords.iter()))
            .map(|k| k.as_str());
        suggest::suggest(text, keywords, n)
    }

    /// Install a community base glyph. Fails when the ID is taken.
    pub fn install_community(&mut self, glyph: CommunityGlyph) -> Result<()> {
        let key = glyph.def.id.to_uppercase();
        if self.index.contains_key(&key) {
            return Err(VocabError::DuplicateId(glyph.def.id));
        }
        debug!(id = %glyph.def.id, "installing community glyph");
        self.index.insert(key, Slot::Community(self.community.len()));
        self.community.push(glyph);
        Ok(())
    }

    /// Install a compound glyph. Fails when the ID is taken.
    pub fn install_compound(&mut self, compound: CompoundGlyph) -> Result<()> {
        let key = compound.id.to_uppercase();
        if self.index.contains_key(&key) {
            return Err(VocabError::DuplicateId(compound.id));
        }
        debug!(id = %compound.id, "installing compound glyph");
        self.index.insert(key, Slot::Compound(self.compounds.len()));
        self.compounds.push(compound);
        Ok(())
    }

    /// Bump a compound's in-memory use count; the durable counter is
    /// updated by the caller's store write.
    pub fn note_compound_use(&mut self, id: &str) {
        if let Some(Slot::Compound(i)) = self.index.get(&id.to_uppercase()) {
            self.compounds[*i].use_count += 1;
        }
    }

    pub fn builtins(&self) -> &[GlyphDefinition] {
        &self.builtins
    }

    pub fn community(&self) -> &[CommunityGlyph] {
        &self.community
    }

    pub fn compounds(&self) -> &[CompoundGlyph] {
        &self.compounds
    }

    /// Drop all community and compound entries, keeping the built-ins.
    /// Used by the admin reset path.
    pub fn clear_installed(&mut self) {
        self.community.clear();
        self.compounds.clear();
        self.index.retain(|_, slot| matches!(slot, Slot::Builtin(_)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::builtin_table;
    use crate::types::Domain;

    fn community(id: &str, keywords: &[&str]) -> CommunityGlyph {
        CommunityGlyph {
            def: GlyphDefinition {
                id: id.to_string(),
                meaning: format!("meaning of {id}"),
                pose: "neutral stance".to_string(),
                symbol: "*".to_string(),
                domain: Domain::Agent,
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
                visual_hint: "community glyph".to_string(),
            },
            proposer: "agent:test".to_string(),
            created_at: 1_700_000_000_000,
        }
    }

    fn compound(id: &str, components: &[&str]) -> CompoundGlyph {
        CompoundGlyph {
            id: id.to_string(),
            name: format!("compound {id}"),
            components: components.iter().map(|c| c.to_string()).collect(),
            description: "test compound".to_string(),
            proposer: "agent:test".to_string(),
            created_at: 1_700_000_000_000,
            use_count: 0,
        }
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let vocab = Vocabulary::new(builtin_table());
        assert_eq!(vocab.resolve("q01").unwrap().id(), "Q01");
        assert_eq!(vocab.resolve("Q01").unwrap().id(), "Q01");
        assert!(vocab.resolve("Z99").is_none());
    }

    #[test]
    fn test_match_prefers_builtins_over_community() {
        let mut vocab = Vocabulary::new(builtin_table());
        vocab
            .install_community(community("B01", &["swap", "flip"]))
            .unwrap();
        // "swap" belongs to the built-in X01; the community glyph only
        // matches through its unshadowed keyword
        assert_eq!(vocab.match_text("please swap these"), Some("X01"));
        assert_eq!(vocab.match_text("flip these"), Some("B01"));
    }

    #[test]
    fn test_match_misses_return_none() {
        let vocab = Vocabulary::new(builtin_table());
        assert_eq!(vocab.match_text("zzz qqq"), None);
    }

    #[test]
    fn test_compounds_never_match_free_text() {
        let mut vocab = Vocabulary::new(builtin_table());
        vocab
            .install_compound(compound("C01", &["X05", "X01"]))
            .unwrap();
        // The compound name is not a keyword; only its ID resolves
        assert_eq!(vocab.match_text("compound C01"), None);
        assert!(vocab.resolve("c01").unwrap().is_compound());
    }

    #[test]
    fn test_duplicate_install_fails() {
        let mut vocab = Vocabulary::new(builtin_table());
        vocab.install_community(community("B01", &["flip"])).unwrap();
        let err = vocab
            .install_community(community("b01", &["other"]))
            .unwrap_err();
        assert!(matches!(err, VocabError::DuplicateId(_)));
        let err = vocab
            .install_compound(compound("Q01", &["X05", "X01"]))
            .unwrap_err();
        assert!(matches!(err, VocabError::DuplicateId(_)));
    }

    #[test]
    fn test_suggest_surfaces_near_miss() {
        let vocab = Vocabulary::new(builtin_table());
        let got = vocab.suggest("quary database", 3);
        assert!(got.contains(&"query".to_string()), "got: {got:?}");
    }

    #[test]
    fn test_match_reports_keyword() {
        let vocab = Vocabulary::new(builtin_table());
        let (id, kw) = vocab.match_text_with_keyword("what is the price?").unwrap();
        // "what" sits on Q01 ahead of X03's "price"
        assert_eq!(id, "Q01");
        assert_eq!(kw, "what");
    }

    #[test]
    fn test_clear_installed_keeps_builtins() {
        let mut vocab = Vocabulary::new(builtin_table());
        vocab.install_community(community("B01", &["flip"])).unwrap();
        vocab
            .install_compound(compound("C01", &["X05", "X01"]))
            .unwrap();
        vocab.clear_installed();
        assert!(vocab.resolve("B01").is_none());
        assert!(vocab.resolve("C01").is_none());
        assert!(vocab.resolve("Q01").is_some());
    }

    #[test]
    fn test_note_compound_use() {
        let mut vocab = Vocabulary::new(builtin_table());
        vocab
            .install_compound(compound("C01", &["X05", "X01"]))
            .unwrap();
        vocab.note_compound_use("c01");
        match vocab.resolve("C01").unwrap() {
            ResolvedGlyph::Compound(c) => assert_eq!(c.use_count, 1),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
