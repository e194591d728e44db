//! Error types for the knowledge base

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("Database query failed: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    Migration(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Agent not registered: {0}")]
    NotRegistered(String),

    #[error("Unknown glyph: {0}")]
    UnknownGlyph(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Wallet verification refused for {name} ({wallet})")]
    VerificationRefused { name: String, wallet: String },

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl KnowledgeError {
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;
        match self {
            Self::Store(_) | Self::Migration(_) | Self::Config(_) => Level::ERROR,
            Self::Json(_) => Level::ERROR,
            _ => Level::WARN,
        }
    }
}

pub type Result<T> = std::result::Result<T, KnowledgeError>;
