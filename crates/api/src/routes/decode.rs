//! Decode endpoints: glyph ID → definition

use axum::{extract::State, Json};
use serde_json::Value;
use std::sync::Arc;

use crate::error::{ApiError, Result};
use crate::models::{resolved_to_json, DecodeBatchItem, DecodeBatchRequest, DecodeRequest};
use crate::state::AppState;

pub async fn decode(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DecodeRequest>,
) -> Result<Json<Value>> {
    let vocab = state.vocab.read().await;
    let resolved = vocab
        .resolve(&req.glyph)
        .ok_or_else(|| ApiError::UnknownGlyph(req.glyph.clone()))?;
    Ok(Json(resolved_to_json(&resolved)))
}

/// Per-item results; unknown IDs are reported, not fatal.
pub async fn decode_batch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DecodeBatchRequest>,
) -> Result<Json<Vec<DecodeBatchItem>>> {
    let vocab = state.vocab.read().await;
    let items = req
        .glyphs
        .iter()
        .map(|id| match vocab.resolve(id) {
            Some(resolved) => DecodeBatchItem {
                glyph: resolved.id().to_string(),
                found: true,
                definition: Some(resolved_to_json(&resolved)),
            },
            None => DecodeBatchItem {
                glyph: id.clone(),
                found: false,
                definition: None,
            },
        })
        .collect();
    Ok(Json(items))
}
