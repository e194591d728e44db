//! Governance endpoints: proposals, votes, amendments, discussion.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use glyphnet_knowledge::models::{
    Comment, Proposal, ProposalKind, ProposalPayload, ProposalStatus,
};
use glyphnet_knowledge::store::Page;

use crate::error::{ApiError, Result};
use crate::models::{
    AmendRequest, CommentRequest, ProposalsQuery, ProposeBaseRequest, ProposeCompoundRequest,
    VoteRequest,
};
use crate::state::{now_ms, AppState};

pub async fn propose_compound(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProposeCompoundRequest>,
) -> Result<Json<Proposal>> {
    let proposal = state
        .governance
        .create_proposal(
            &req.proposer,
            &req.name,
            &req.description,
            ProposalPayload::Compound {
                components: req.components,
            },
            now_ms(),
        )
        .await?;
    Ok(Json(proposal))
}

pub async fn propose_base_glyph(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProposeBaseRequest>,
) -> Result<Json<Proposal>> {
    let proposal = state
        .governance
        .create_proposal(
            &req.proposer,
            &req.name,
            &req.description,
            ProposalPayload::BaseGlyph {
                domain: req.domain,
                keywords: req.keywords,
                meaning: req.meaning,
                bitmap: req.bitmap,
            },
            now_ms(),
        )
        .await?;
    Ok(Json(proposal))
}

pub async fn endorse(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<Proposal>> {
    let proposal = state
        .governance
        .endorse(&req.proposal_id, &req.agent, now_ms())
        .await?;
    Ok(Json(proposal))
}

pub async fn reject(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<Proposal>> {
    let proposal = state
        .governance
        .reject(&req.proposal_id, &req.agent, now_ms())
        .await?;
    Ok(Json(proposal))
}

/// GET /knowledge/proposals?status=pending|all|accepted|rejected|expired|superseded
pub async fn list_proposals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProposalsQuery>,
) -> Result<Json<Value>> {
    let status = match query.status.as_deref().unwrap_or("pending") {
        "all" => None,
        other => Some(ProposalStatus::parse(other).ok_or_else(|| {
            ApiError::InvalidInput(format!("unknown proposal status: {other}"))
        })?),
    };
    let page = Page::clamped(query.limit, query.offset);
    let proposals = state.governance.list_proposals(status, page).await?;
    Ok(Json(json!({ "proposals": proposals })))
}

/// POST /governance/proposals/:id/amend — supersede a pending proposal
/// with a revised version; prior votes are voided.
pub async fn amend(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AmendRequest>,
) -> Result<Json<Proposal>> {
    let original = state
        .governance
        .get_proposal(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("proposal {id}")))?;

    let payload = match original.kind {
        ProposalKind::Compound => ProposalPayload::Compound {
            components: req.components.ok_or_else(|| {
                ApiError::InvalidInput("amending a compound needs components".to_string())
            })?,
        },
        ProposalKind::BaseGlyph => ProposalPayload::BaseGlyph {
            domain: req.domain.ok_or_else(|| {
                ApiError::InvalidInput("amending a base glyph needs a domain".to_string())
            })?,
            keywords: req.keywords.ok_or_else(|| {
                ApiError::InvalidInput("amending a base glyph needs keywords".to_string())
            })?,
            meaning: req.meaning.ok_or_else(|| {
                ApiError::InvalidInput("amending a base glyph needs a meaning".to_string())
            })?,
            bitmap: req.bitmap,
        },
    };

    let description = match &req.reason {
        Some(reason) if req.description.is_empty() => reason.clone(),
        _ => req.description.clone(),
    };
    let amended = state
        .governance
        .amend(&id, &req.agent, &req.name, &description, payload, now_ms())
        .await?;
    Ok(Json(amended))
}

pub async fn comment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> Result<Json<Comment>> {
    let comment = state
        .governance
        .comment(&id, &req.author, &req.body, req.parent_id.as_deref(), now_ms())
        .await?;
    Ok(Json(comment))
}

/// GET /governance/proposals/:id/discussion — top-level comments with
/// their replies nested.
pub async fn discussion(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let comments = state.governance.discussion(&id).await?;
    let (tops, replies): (Vec<&Comment>, Vec<&Comment>) =
        comments.iter().partition(|c| c.parent_id.is_none());
    let threaded: Vec<Value> = tops
        .into_iter()
        .map(|top| {
            let children: Vec<&Comment> = replies
                .iter()
                .filter(|r| r.parent_id.as_deref() == Some(top.id.as_str()))
                .copied()
                .collect();
            let mut value = json!(top);
            value["replies"] = json!(children);
            value
        })
        .collect();
    Ok(Json(json!({ "proposalId": id, "comments": threaded })))
}

pub async fn summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<glyphnet_governance::ProposalSummary>> {
    let summary = state.governance.summary(&id, now_ms()).await?;
    Ok(Json(summary))
}
