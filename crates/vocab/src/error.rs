//! Error types for the vocabulary

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VocabError {
    #[error("Glyph ID already installed: {0}")]
    DuplicateId(String),

    #[error("Unknown glyph: {0}")]
    UnknownGlyph(String),

    #[error("Invalid glyph definition: {field}, reason: {reason}")]
    InvalidDefinition { field: String, reason: String },
}

pub type Result<T> = std::result::Result<T, VocabError>;
