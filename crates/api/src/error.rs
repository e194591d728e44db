//! Error types for the API.
//!
//! Every error that reaches a client carries a stable `error` kind in the
//! JSON body; HTTP status is secondary. 2xx means the primary commit
//! succeeded — relay and broadcast failures ride in the success body, not
//! here.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use glyphnet_governance::GovernanceError;
use glyphnet_knowledge::KnowledgeError;
use glyphnet_vocab::VocabError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No matching glyph")]
    NoMatch { suggestions: Vec<String> },

    #[error("Unknown glyph: {0}")]
    UnknownGlyph(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not a registered agent: {0}")]
    NotRegistered(String),

    #[error("Already voted on proposal {0}")]
    DuplicateVote(String),

    #[error("Proposal is not pending: {0}")]
    NotPending(String),

    #[error("Component not installed: {0}")]
    ComponentMissing(String),

    #[error("Keyword '{keyword}' already matches glyph {glyph}")]
    KeywordCollision { keyword: String, glyph: String },

    #[error("Cannot amend proposal {0}: not pending")]
    AmendNotPending(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Admin credential missing or wrong")]
    Unauthorized,

    #[error("Payload too large: {0}")]
    TooLarge(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Database error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// The stable wire identifier.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoMatch { .. } => "no_match",
            Self::UnknownGlyph(_) => "unknown_glyph",
            Self::InvalidInput(_) => "invalid_input",
            Self::NotRegistered(_) => "not_registered",
            Self::DuplicateVote(_) => "duplicate_vote",
            Self::NotPending(_) => "not_pending",
            Self::ComponentMissing(_) => "component_missing",
            Self::KeywordCollision { .. } => "keyword_collision",
            Self::AmendNotPending(_) => "amend_not_pending",
            Self::NotFound(_) => "not_found",
            Self::Unauthorized => "unauthorized",
            Self::TooLarge(_) => "too_large",
            Self::RateLimited => "rate_limited",
            Self::Store(_) | Self::Internal(_) => "store_error",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::NoMatch { .. }
            | Self::UnknownGlyph(_)
            | Self::InvalidInput(_)
            | Self::NotRegistered(_)
            | Self::NotPending(_)
            | Self::ComponentMissing(_)
            | Self::KeywordCollision { .. }
            | Self::AmendNotPending(_) => StatusCode::BAD_REQUEST,
            Self::DuplicateVote(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::FORBIDDEN,
            Self::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Store(_) | Self::Internal(_)) {
            error!("request failed: {}", self);
        }
        let mut body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        if let Self::NoMatch { suggestions } = &self {
            body["suggestions"] = json!(suggestions);
        }
        if let Self::KeywordCollision { keyword, glyph } = &self {
            body["keyword"] = json!(keyword);
            body["glyph"] = json!(glyph);
        }
        (self.status(), Json(body)).into_response()
    }
}

impl From<KnowledgeError> for ApiError {
    fn from(err: KnowledgeError) -> Self {
        match err {
            KnowledgeError::NotRegistered(who) => Self::NotRegistered(who),
            KnowledgeError::UnknownGlyph(id) => Self::UnknownGlyph(id),
            KnowledgeError::InvalidInput(msg) => Self::InvalidInput(msg),
            KnowledgeError::VerificationRefused { name, wallet } => Self::InvalidInput(format!(
                "wallet verification refused for {name} ({wallet})"
            )),
            KnowledgeError::Store(e) => Self::Store(e),
            other => Self::Internal(other.into()),
        }
    }
}

impl From<GovernanceError> for ApiError {
    fn from(err: GovernanceError) -> Self {
        match err {
            GovernanceError::NotRegistered(who) => Self::NotRegistered(who),
            GovernanceError::UnknownProposal(id) => Self::NotFound(format!("proposal {id}")),
            GovernanceError::NotPending(id) => Self::NotPending(id),
            GovernanceError::DuplicateVote { proposal, .. } => Self::DuplicateVote(proposal),
            GovernanceError::ComponentMissing(c) => Self::ComponentMissing(c),
            GovernanceError::KeywordCollision { keyword, glyph } => {
                Self::KeywordCollision { keyword, glyph }
            }
            GovernanceError::AmendNotPending(id) => Self::AmendNotPending(id),
            GovernanceError::DuplicateName(name) => {
                Self::InvalidInput(format!("a pending proposal named '{name}' already exists"))
            }
            GovernanceError::InvalidInput(msg) => Self::InvalidInput(msg),
            GovernanceError::Store(e) => Self::Store(e),
            GovernanceError::Knowledge(e) => e.into(),
            other => Self::Internal(other.into()),
        }
    }
}

impl From<VocabError> for ApiError {
    fn from(err: VocabError) -> Self {
        match err {
            VocabError::UnknownGlyph(id) => Self::UnknownGlyph(id),
            other => Self::Internal(other.into()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_stable() {
        assert_eq!(
            ApiError::NoMatch { suggestions: vec![] }.kind(),
            "no_match"
        );
        assert_eq!(ApiError::Unauthorized.kind(), "unauthorized");
        assert_eq!(ApiError::RateLimited.kind(), "rate_limited");
        assert_eq!(ApiError::DuplicateVote("PC01".into()).kind(), "duplicate_vote");
    }

    #[test]
    fn test_governance_error_mapping() {
        let api: ApiError = GovernanceError::KeywordCollision {
            keyword: "swap".into(),
            glyph: "X01".into(),
        }
        .into();
        assert_eq!(api.kind(), "keyword_collision");

        let api: ApiError = GovernanceError::UnknownProposal("PC09".into()).into();
        assert_eq!(api.kind(), "not_found");
    }

    #[test]
    fn test_store_errors_are_5xx() {
        let api = ApiError::Store(sqlx::Error::PoolTimedOut);
        assert_eq!(api.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.kind(), "store_error");
    }
}
