//! Glyph catalog endpoints

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::{ApiError, Result};
use crate::models::{resolved_to_json, GlyphCatalog};
use crate::state::AppState;

/// The full catalog: built-ins, community glyphs, compounds.
pub async fn catalog(State(state): State<Arc<AppState>>) -> Result<Json<GlyphCatalog>> {
    let vocab = state.vocab.read().await;
    Ok(Json(GlyphCatalog {
        builtin: vocab.builtins().to_vec(),
        community: vocab.community().to_vec(),
        compounds: vocab.compounds().to_vec(),
    }))
}

pub async fn get_glyph(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let vocab = state.vocab.read().await;
    let resolved = vocab
        .resolve(&id)
        .ok_or_else(|| ApiError::UnknownGlyph(id.clone()))?;
    Ok(Json(resolved_to_json(&resolved)))
}

pub async fn glyph_exists(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<Value> {
    let vocab = state.vocab.read().await;
    Json(json!({
        "id": id,
        "exists": vocab.contains(&id),
    }))
}
