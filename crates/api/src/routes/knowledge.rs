//! Read-only knowledge views plus the admin reset.

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use glyphnet_knowledge::store::{self, MessageFilter, Page};

use crate::error::{ApiError, Result};
use crate::models::{resolved_to_json, ListQuery, SearchQuery, SequencesQuery};
use crate::state::AppState;

/// GET /knowledge — the one-screen overview.
pub async fn overview(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let (total_messages, glyph_count, agent_count, sequence_count) = state
        .knowledge
        .with_index(|i| {
            (
                i.total_messages(),
                i.glyph_views().len(),
                i.agent_views().len(),
                i.sequence_views().len(),
            )
        })
        .await;
    let registered = {
        let mut conn = state.db.pool().acquire().await?;
        store::count_agents(&mut conn).await?
    };
    let vocab = state.vocab.read().await;
    Ok(Json(json!({
        "totalMessages": total_messages,
        "glyphsUsed": glyph_count,
        "activeAgents": agent_count,
        "registeredAgents": registered,
        "sequencesObserved": sequence_count,
        "builtinGlyphs": vocab.builtins().len(),
        "communityGlyphs": vocab.community().len(),
        "compoundGlyphs": vocab.compounds().len(),
    })))
}

pub async fn messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>> {
    let page = Page::clamped(query.limit, query.offset);
    let filter = MessageFilter {
        glyph: query.glyph,
        sender: query.sender,
        recipient: query.recipient,
        since: query.since,
    };
    let mut conn = state.db.pool().acquire().await?;
    let messages = store::list_messages(&mut conn, page, &filter).await?;
    Ok(Json(json!({
        "messages": messages,
        "limit": page.limit,
        "offset": page.offset,
    })))
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Json<Value> {
    let views = state.knowledge.with_index(|i| i.glyph_views()).await;
    Json(json!({ "glyphs": views }))
}

pub async fn agent_activity(State(state): State<Arc<AppState>>) -> Json<Value> {
    let views = state.knowledge.with_index(|i| i.agent_views()).await;
    Json(json!({ "agents": views }))
}

/// GET /knowledge/sequences — observed n-grams, promotable ones flagged.
pub async fn sequences(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SequencesQuery>,
) -> Json<Value> {
    let mut views = state.knowledge.with_index(|i| i.sequence_views()).await;
    if query.promotable == Some(true) {
        views.retain(|v| v.promotable);
    }
    Json(json!({ "sequences": views }))
}

pub async fn compounds(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>> {
    let page = Page::clamped(query.limit, query.offset);
    let mut conn = state.db.pool().acquire().await?;
    let compounds = store::list_compounds(&mut conn, page).await?;
    Ok(Json(json!({ "compounds": compounds })))
}

/// GET /knowledge/glyph/:id — definition plus usage stats.
pub async fn glyph_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let definition = {
        let vocab = state.vocab.read().await;
        let resolved = vocab
            .resolve(&id)
            .ok_or_else(|| ApiError::UnknownGlyph(id.clone()))?;
        resolved_to_json(&resolved)
    };
    let canonical = definition["id"].as_str().unwrap_or(&id).to_string();
    let stats = state
        .knowledge
        .with_index(|i| {
            i.glyph(&canonical).map(|s| {
                json!({
                    "count": s.count,
                    "firstSeen": s.first_seen,
                    "lastSeen": s.last_seen,
                    "agents": s.agents.iter().collect::<Vec<_>>(),
                })
            })
        })
        .await;
    Ok(Json(json!({
        "definition": definition,
        "stats": stats,
    })))
}

/// GET /knowledge/query?q= — free-text lookup across the vocabulary and
/// the message log.
pub async fn query(
    State(state): State<Arc<AppState>>,
    Query(search): Query<SearchQuery>,
) -> Result<Json<Value>> {
    let q = search.q.trim();
    if q.is_empty() {
        return Err(ApiError::InvalidInput("query is empty".to_string()));
    }
    let needle = q.to_lowercase();

    let (glyphs, matched_id) = {
        let vocab = state.vocab.read().await;
        let mut hits: Vec<Value> = Vec::new();
        // direct ID hit first
        if let Some(resolved) = vocab.resolve(q) {
            hits.push(resolved_to_json(&resolved));
        }
        for def in vocab.builtins().iter() {
            if def.meaning.to_lowercase().contains(&needle)
                || def.keywords.iter().any(|k| k.contains(&needle))
            {
                if hits.iter().all(|h| h["id"] != def.id.as_str()) {
                    hits.push(json!(def));
                }
            }
        }
        for glyph in vocab.community().iter() {
            if glyph.def.meaning.to_lowercase().contains(&needle)
                || glyph.def.keywords.iter().any(|k| k.contains(&needle))
            {
                if hits.iter().all(|h| h["id"] != glyph.def.id.as_str()) {
                    hits.push(json!(glyph));
                }
            }
        }
        (hits, vocab.match_text(q).map(|s| s.to_string()))
    };

    // when the query names a glyph, surface its recent traffic too
    let messages = match &matched_id {
        Some(glyph) => {
            let page = Page::clamped(search.limit, search.offset);
            let filter = MessageFilter {
                glyph: Some(glyph.clone()),
                ..Default::default()
            };
            let mut conn = state.db.pool().acquire().await?;
            store::list_messages(&mut conn, page, &filter).await?
        }
        None => Vec::new(),
    };

    Ok(Json(json!({
        "query": q,
        "glyphs": glyphs,
        "matchedGlyph": matched_id,
        "messages": messages,
    })))
}

/// POST /knowledge/reset (admin) — wipe the store, derived indices and
/// installed vocabulary.
pub async fn reset(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    let token = headers.get("x-admin-token").and_then(|v| v.to_str().ok());
    if !state.is_admin(token) {
        return Err(ApiError::Unauthorized);
    }
    state.knowledge.reset().await?;
    state.vocab.write().await.clear_installed();
    info!("knowledge base reset by admin");
    Ok(Json(json!({ "success": true })))
}
