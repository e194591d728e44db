//! Encode endpoint: natural language → glyph

use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::debug;

use glyphnet_knowledge::hash::message_hash;

use crate::error::{ApiError, Result};
use crate::models::{EncodeRequest, EncodeResponse};
use crate::state::{now_ms, AppState};

/// Suggestions returned with an encode miss.
const SUGGESTION_COUNT: usize = 3;

/// Resolve a text fragment to a glyph. A miss is a 400 with the closest
/// keywords attached.
pub async fn encode(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EncodeRequest>,
) -> Result<Json<EncodeResponse>> {
    if req.text.trim().is_empty() {
        return Err(ApiError::InvalidInput("text is empty".to_string()));
    }

    let vocab = state.vocab.read().await;
    let Some((glyph_id, keyword)) = vocab.match_text_with_keyword(&req.text) else {
        let suggestions = vocab.suggest(&req.text, SUGGESTION_COUNT);
        return Err(ApiError::NoMatch { suggestions });
    };
    debug!(glyph = glyph_id, keyword, "encode matched");

    let def = vocab
        .resolve(glyph_id)
        .and_then(|r| r.definition().cloned())
        .ok_or_else(|| ApiError::UnknownGlyph(glyph_id.to_string()))?;
    drop(vocab);

    let timestamp = now_ms();
    let message_hash = message_hash(
        &def.id,
        req.data.as_ref(),
        req.recipient.as_deref().unwrap_or_default(),
        timestamp,
    );
    Ok(Json(EncodeResponse {
        glyph: def.id,
        meaning: def.meaning,
        pose: def.pose,
        symbol: def.symbol,
        domain: def.domain,
        data: req.data,
        recipient: req.recipient,
        timestamp,
        message_hash,
    }))
}
