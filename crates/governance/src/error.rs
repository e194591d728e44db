//! Error types for governance

use thiserror::Error;

/// Contract violations leave persistent state untouched; store errors abort
/// the whole transaction, so no partial log entry is ever observable.
#[derive(Error, Debug)]
pub enum GovernanceError {
    #[error("Agent not registered: {0}")]
    NotRegistered(String),

    #[error("Unknown proposal: {0}")]
    UnknownProposal(String),

    #[error("Proposal is not pending: {0}")]
    NotPending(String),

    #[error("Agent {agent} already voted on proposal {proposal}")]
    DuplicateVote { proposal: String, agent: String },

    #[error("Component not installed: {0}")]
    ComponentMissing(String),

    #[error("Keyword '{keyword}' already matches glyph {glyph}")]
    KeywordCollision { keyword: String, glyph: String },

    #[error("Cannot amend proposal {0}: not pending")]
    AmendNotPending(String),

    #[error("A pending proposal named '{0}' already exists")]
    DuplicateName(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database query failed: {0}")]
    Store(#[from] sqlx::Error),

    #[error(transparent)]
    Knowledge(#[from] glyphnet_knowledge::KnowledgeError),

    #[error(transparent)]
    Vocab(#[from] glyphnet_vocab::VocabError),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GovernanceError>;
