//! API routes

pub mod agents;
pub mod decode;
pub mod encode;
pub mod glyphs;
pub mod governance;
pub mod health;
pub mod knowledge;
pub mod send;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::state::AppState;
use crate::stream;

/// Create the main API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Vocabulary & messaging
        .route("/encode", post(encode::encode))
        .route("/decode", post(decode::decode))
        .route("/decode/batch", post(decode::decode_batch))
        .route("/glyphs", get(glyphs::catalog))
        .route("/glyphs/:id", get(glyphs::get_glyph))
        .route("/glyphs/:id/exists", get(glyphs::glyph_exists))
        .route("/send", post(send::send_message))
        // Knowledge views
        .route("/knowledge", get(knowledge::overview))
        .route("/knowledge/messages", get(knowledge::messages))
        .route("/knowledge/stats", get(knowledge::stats))
        .route("/knowledge/agents", get(knowledge::agent_activity))
        .route("/knowledge/sequences", get(knowledge::sequences))
        .route("/knowledge/compounds", get(knowledge::compounds))
        .route("/knowledge/glyph/:id", get(knowledge::glyph_detail))
        .route("/knowledge/query", get(knowledge::query))
        .route("/knowledge/reset", post(knowledge::reset))
        // Governance
        .route("/knowledge/propose", post(governance::propose_compound))
        .route(
            "/knowledge/propose/base-glyph",
            post(governance::propose_base_glyph),
        )
        .route("/knowledge/endorse", post(governance::endorse))
        .route("/knowledge/reject", post(governance::reject))
        .route("/knowledge/proposals", get(governance::list_proposals))
        .route(
            "/governance/proposals/:id/amend",
            post(governance::amend),
        )
        .route(
            "/governance/proposals/:id/comment",
            post(governance::comment),
        )
        .route(
            "/governance/proposals/:id/discussion",
            get(governance::discussion),
        )
        .route(
            "/governance/proposals/:id/summary",
            get(governance::summary),
        )
        // Live stream
        .route("/stream", get(stream::stream_handler))
        .route("/stream/broadcast", post(stream::admin_broadcast))
        // Identity
        .route("/agents/register", post(agents::register))
        .route("/agents", get(agents::list_agents))
        .route("/agents/:address", get(agents::get_agent))
        .route("/agents/:address/verify", get(agents::verify_agent))
        .with_state(state)
}
