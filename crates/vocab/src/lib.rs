//! Glyphnet Vocabulary
//!
//! The shared symbol table for agent messaging: the built-in glyph set,
//! community-installed base glyphs, compound glyphs, keyword matching and
//! fuzzy suggestions.

pub mod builtin;
pub mod error;
pub mod matcher;
pub mod registry;
pub mod suggest;
pub mod types;

pub use builtin::builtin_table;
pub use error::{Result, VocabError};
pub use registry::{ResolvedGlyph, Vocabulary};
pub use types::{CommunityGlyph, CompoundGlyph, Domain, GlyphDefinition};
