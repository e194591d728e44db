//! Send endpoint: the message pipeline.
//!
//! Resolve → validate → persist (Knowledge) → broadcast → relay. The HTTP
//! status reflects only the persist step; relay problems ride in
//! `relayStatus`.

use axum::{extract::State, Json};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use glyphnet_knowledge::events::Event;
use glyphnet_knowledge::hash::message_hash;
use glyphnet_knowledge::models::{message::AGORA, Message};
use glyphnet_knowledge::store;

use crate::error::{ApiError, Result};
use crate::models::{SendRequest, SendResponse};
use crate::relay::{self, RelayStatus};
use crate::state::{now_ms, AppState};

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendRequest>,
) -> Result<Json<SendResponse>> {
    let recipient = req.recipient.trim().to_string();
    if recipient.is_empty() {
        return Err(ApiError::InvalidInput("recipient is empty".to_string()));
    }
    if req.sender.trim().is_empty() {
        return Err(ApiError::InvalidInput("sender is empty".to_string()));
    }

    let (glyph_id, is_compound) = {
        let vocab = state.vocab.read().await;
        let resolved = vocab
            .resolve(&req.glyph)
            .ok_or_else(|| ApiError::UnknownGlyph(req.glyph.clone()))?;
        (resolved.id().to_string(), resolved.is_compound())
    };

    // the agora demands a registered sender and bounded string fields
    if recipient == AGORA {
        state
            .identity
            .find(&req.sender)
            .await?
            .ok_or_else(|| ApiError::NotRegistered(req.sender.clone()))?;
        if let Some(data) = &req.data {
            check_field_lengths(data, state.cfg.agora_max_field_len)?;
        }
    }

    let timestamp = now_ms();
    let msg = Message {
        id: Uuid::new_v4().simple().to_string(),
        glyph: glyph_id.clone(),
        sender: req.sender,
        recipient: recipient.clone(),
        message_hash: message_hash(&glyph_id, req.data.as_ref(), &recipient, timestamp),
        data: req.data,
        timestamp,
        attestation_tx_hash: req.attestation_tx_hash,
        encrypted: req.encrypted,
    };

    state.knowledge.record(&msg).await?;

    if is_compound {
        let mut conn = state.db.pool().acquire().await?;
        store::bump_compound_use(&mut conn, &glyph_id).await?;
        drop(conn);
        state.vocab.write().await.note_compound_use(&glyph_id);
    }

    // best-effort fan-out; a full channel only means nobody is listening
    let event = Event::Message {
        glyph: msg.glyph.clone(),
        sender: msg.sender.clone(),
        recipient: msg.recipient.clone(),
        timestamp,
    };
    match serde_json::to_string(&event) {
        Ok(json) => {
            let _ = state.events.send(json);
        }
        Err(e) => warn!("failed to serialize message event: {}", e),
    }

    let relay_status = if relay::is_relay_recipient(&recipient) {
        relay::relay_message(&state.http, &msg, state.cfg.relay_deadline_ms).await
    } else {
        RelayStatus::Local
    };

    Ok(Json(SendResponse {
        success: true,
        message_hash: msg.message_hash,
        glyph_id,
        recipient,
        timestamp,
        relay_status,
    }))
}

/// Every string value anywhere in the payload must fit the agora field cap.
fn check_field_lengths(data: &Value, max_len: usize) -> Result<()> {
    match data {
        Value::String(s) => {
            if s.len() > max_len {
                return Err(ApiError::InvalidInput(format!(
                    "agora string field exceeds {max_len} bytes"
                )));
            }
        }
        Value::Array(items) => {
            for item in items {
                check_field_lengths(item, max_len)?;
            }
        }
        Value::Object(map) => {
            for value in map.values() {
                check_field_lengths(value, max_len)?;
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_length_cap() {
        let ok = json!({"note": "short", "nested": {"also": "fine"}});
        assert!(check_field_lengths(&ok, 200).is_ok());

        let long = "x".repeat(201);
        let bad = json!({"note": long});
        assert!(check_field_lengths(&bad, 200).is_err());

        let bad_nested = json!({"list": [{"deep": "y".repeat(300)}]});
        assert!(check_field_lengths(&bad_nested, 200).is_err());
    }

    #[test]
    fn test_non_string_values_are_unbounded() {
        let numbers = json!({"n": 12345678901234567890u64, "flag": true});
        assert!(check_field_lengths(&numbers, 10).is_ok());
    }
}
