//! Agent registration and lookup endpoints

use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use glyphnet_knowledge::identity::Registration;
use glyphnet_knowledge::models::Agent;
use glyphnet_knowledge::store::Page;

use crate::error::{ApiError, Result};
use crate::models::ListQuery;
use crate::state::{now_ms, AppState};

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<Registration>,
) -> Result<Json<Agent>> {
    let agent = state.identity.register(req, now_ms()).await?;
    Ok(Json(agent))
}

pub async fn list_agents(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>> {
    let page = Page::clamped(query.limit, query.offset);
    let agents = state.identity.list(page).await?;
    Ok(Json(json!({ "agents": agents })))
}

pub async fn get_agent(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<Agent>> {
    let agent = state
        .identity
        .find(&address)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("agent {address}")))?;
    Ok(Json(agent))
}

/// GET /agents/:address/verify — ask the attestation collaborator and
/// promote to on-chain when it confirms.
pub async fn verify_agent(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<Value>> {
    let (agent, attestation) = state.identity.verify_on_chain(&address, now_ms()).await?;
    Ok(Json(json!({
        "agent": agent,
        "attested": attestation.is_some(),
        "attestationTxHash": attestation,
    })))
}
