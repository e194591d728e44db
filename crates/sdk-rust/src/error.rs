//! SDK error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {kind} ({message})")]
    Api {
        status: u16,
        /// Stable server-side error kind, e.g. `no_match`
        kind: String,
        message: String,
    },

    #[error("Unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
}

impl SdkError {
    /// The server's stable error kind, when this is an API error.
    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::Api { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SdkError>;
