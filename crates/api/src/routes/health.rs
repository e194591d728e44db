//! Health check endpoint

use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::Result;
use crate::state::{now_ms, AppState};

/// Liveness plus a cheap store round-trip.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    state.db.health_check().await?;
    Ok(Json(json!({
        "status": "ok",
        "subscribers": state.subscribers.active(),
        "timestamp": now_ms(),
    })))
}
