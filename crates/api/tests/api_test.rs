//! HTTP-level tests over the assembled router.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use glyphnet_api::{AppState, Server, ServerConfig};
use glyphnet_knowledge::config::CoreConfig;
use glyphnet_knowledge::db::Database;
use glyphnet_knowledge::identity::{AcceptAllVerifier, NoAttestor};

async fn test_router() -> Router {
    let cfg = CoreConfig {
        // let governance tests accept without waiting out the vote window
        compound_min_vote_ms: 0,
        base_min_vote_ms: 0,
        ..CoreConfig::default()
    };
    let db = Database::in_memory().await.unwrap();
    let state = AppState::new(
        cfg,
        db,
        Arc::new(AcceptAllVerifier),
        Arc::new(NoAttestor),
        Some("secret".to_string()),
    )
    .await
    .unwrap();
    Server::new(ServerConfig::default(), state).router()
}

async fn call(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    admin: bool,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if admin {
        builder = builder.header("x-admin-token", "secret");
    }
    let request = match body {
        Some(value) => builder
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register_agent(router: &Router, name: &str) -> String {
    let (status, body) = call(
        router,
        "POST",
        "/agents/register",
        Some(json!({ "name": name })),
        false,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register {name}: {body}");
    body["address"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_ok() {
    let router = test_router().await;
    let (status, body) = call(&router, "GET", "/health", None, false).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn encode_resolves_keywords() {
    let router = test_router().await;
    let (status, body) = call(
        &router,
        "POST",
        "/encode",
        Some(json!({ "text": "please swap these tokens" })),
        false,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["glyph"], "X01");
    assert_eq!(body["domain"], "crypto");
    assert_eq!(body["messageHash"].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn encode_miss_suggests_close_keywords() {
    let router = test_router().await;
    let (status, body) = call(
        &router,
        "POST",
        "/encode",
        Some(json!({ "text": "quary database" })),
        false,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no_match");
    let suggestions: Vec<String> = body["suggestions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s.as_str().unwrap().to_string())
        .collect();
    assert!(suggestions.len() <= 3);
    assert!(suggestions.contains(&"query".to_string()), "{suggestions:?}");
}

#[tokio::test]
async fn decode_round_trips_encode() {
    let router = test_router().await;
    let (_, encoded) = call(
        &router,
        "POST",
        "/encode",
        Some(json!({ "text": "stake my tokens" })),
        false,
    )
    .await;
    let glyph = encoded["glyph"].as_str().unwrap();

    let (status, decoded) = call(
        &router,
        "POST",
        "/decode",
        Some(json!({ "glyph": glyph })),
        false,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    // keywords contain the lower-cased matched word
    let keywords: Vec<String> = decoded["keywords"]
        .as_array()
        .unwrap()
        .iter()
        .map(|k| k.as_str().unwrap().to_string())
        .collect();
    assert!(keywords.contains(&"stake".to_string()));
}

#[tokio::test]
async fn decode_unknown_glyph_is_400() {
    let router = test_router().await;
    let (status, body) = call(
        &router,
        "POST",
        "/decode",
        Some(json!({ "glyph": "Z99" })),
        false,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unknown_glyph");
}

#[tokio::test]
async fn decode_batch_reports_per_item() {
    let router = test_router().await;
    let (status, body) = call(
        &router,
        "POST",
        "/decode/batch",
        Some(json!({ "glyphs": ["q01", "Z99"] })),
        false,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items[0]["found"], true);
    assert_eq!(items[0]["glyph"], "Q01");
    assert_eq!(items[1]["found"], false);
}

#[tokio::test]
async fn glyph_exists_endpoint() {
    let router = test_router().await;
    let (_, body) = call(&router, "GET", "/glyphs/X05/exists", None, false).await;
    assert_eq!(body["exists"], true);
    let (_, body) = call(&router, "GET", "/glyphs/Z99/exists", None, false).await;
    assert_eq!(body["exists"], false);
}

#[tokio::test]
async fn send_to_agora_requires_registration() {
    let router = test_router().await;
    let (status, body) = call(
        &router,
        "POST",
        "/send",
        Some(json!({
            "glyph": "Q01",
            "recipient": "agora",
            "sender": "nobody",
        })),
        false,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "not_registered");
}

#[tokio::test]
async fn send_to_agora_succeeds_for_registered_agent() {
    let router = test_router().await;
    register_agent(&router, "alice").await;

    let (status, body) = call(
        &router,
        "POST",
        "/send",
        Some(json!({
            "glyph": "Q01",
            "recipient": "agora",
            "sender": "alice",
            "data": { "note": "hello agents" },
        })),
        false,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["glyphId"], "Q01");
    assert_eq!(body["relayStatus"], "local");
    assert_eq!(body["messageHash"].as_str().unwrap().len(), 64);

    // the message shows up in the views
    let (_, messages) = call(&router, "GET", "/knowledge/messages", None, false).await;
    assert_eq!(messages["messages"].as_array().unwrap().len(), 1);
    let (_, stats) = call(&router, "GET", "/knowledge/stats", None, false).await;
    assert_eq!(stats["glyphs"][0]["glyph"], "Q01");
}

#[tokio::test]
async fn agora_field_length_is_capped() {
    let router = test_router().await;
    register_agent(&router, "alice").await;

    let long = "x".repeat(201);
    let (status, body) = call(
        &router,
        "POST",
        "/send",
        Some(json!({
            "glyph": "Q01",
            "recipient": "agora",
            "sender": "alice",
            "data": { "note": long },
        })),
        false,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");
}

#[tokio::test]
async fn send_unknown_glyph_is_refused() {
    let router = test_router().await;
    register_agent(&router, "alice").await;
    let (status, body) = call(
        &router,
        "POST",
        "/send",
        Some(json!({
            "glyph": "Z99",
            "recipient": "agora",
            "sender": "alice",
        })),
        false,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unknown_glyph");
}

#[tokio::test]
async fn list_limits_are_clamped_not_rejected() {
    let router = test_router().await;
    let (status, body) = call(
        &router,
        "GET",
        "/knowledge/messages?limit=9999&offset=-3",
        None,
        false,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["limit"], 200);
    assert_eq!(body["offset"], 0);

    let (status, body) = call(&router, "GET", "/knowledge/messages?limit=0", None, false).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["limit"], 1);
}

#[tokio::test]
async fn admin_reset_requires_credential() {
    let router = test_router().await;
    let (status, body) = call(&router, "POST", "/knowledge/reset", None, false).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "unauthorized");

    let (status, body) = call(&router, "POST", "/knowledge/reset", None, true).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn stream_broadcast_requires_credential() {
    let router = test_router().await;
    let (status, _) = call(
        &router,
        "POST",
        "/stream/broadcast",
        Some(json!({ "type": "notice" })),
        false,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(
        &router,
        "POST",
        "/stream/broadcast",
        Some(json!({ "type": "notice" })),
        true,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn governance_flow_over_http() {
    let router = test_router().await;
    let mut agents = Vec::new();
    for name in ["alice", "bob", "carol"] {
        agents.push(register_agent(&router, name).await);
    }

    // propose a compound
    let (status, proposal) = call(
        &router,
        "POST",
        "/knowledge/propose",
        Some(json!({
            "name": "stake-then-swap",
            "description": "stake followed by swap",
            "components": ["X05", "X01"],
            "proposer": agents[0],
        })),
        false,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{proposal}");
    let id = proposal["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("PC"));
    assert_eq!(proposal["status"], "pending");

    // two more unverified endorsements cross the threshold of 3
    for agent in &agents[1..] {
        let (status, _) = call(
            &router,
            "POST",
            "/knowledge/endorse",
            Some(json!({ "proposalId": id, "agent": agent })),
            false,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    // duplicate vote is a conflict
    let (status, body) = call(
        &router,
        "POST",
        "/knowledge/endorse",
        Some(json!({ "proposalId": id, "agent": agents[1] })),
        false,
    )
    .await;
    // the proposal is already terminal, which reports first
    assert!(status == StatusCode::CONFLICT || status == StatusCode::BAD_REQUEST);
    assert!(body["error"] == "duplicate_vote" || body["error"] == "not_pending");

    // accepted and listed
    let (_, listed) = call(
        &router,
        "GET",
        "/knowledge/proposals?status=all",
        None,
        false,
    )
    .await;
    let found = listed["proposals"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == id.as_str())
        .unwrap()
        .clone();
    assert_eq!(found["status"], "accepted");

    // the compound is live
    let (_, compounds) = call(&router, "GET", "/knowledge/compounds", None, false).await;
    let compound = &compounds["compounds"][0];
    assert_eq!(compound["components"][0], "X05");
    assert_eq!(compound["components"][1], "X01");
    let compound_id = compound["id"].as_str().unwrap();
    let (_, exists) = call(
        &router,
        "GET",
        &format!("/glyphs/{compound_id}/exists"),
        None,
        false,
    )
    .await;
    assert_eq!(exists["exists"], true);

    // free-text encode still routes through base keywords, never the compound
    let (_, encoded) = call(
        &router,
        "POST",
        "/encode",
        Some(json!({ "text": "stake and swap" })),
        false,
    )
    .await;
    assert_ne!(encoded["glyph"], compound_id);
}

#[tokio::test]
async fn base_glyph_keyword_collision_over_http() {
    let router = test_router().await;
    let alice = register_agent(&router, "alice").await;
    let (status, body) = call(
        &router,
        "POST",
        "/knowledge/propose/base-glyph",
        Some(json!({
            "name": "swap-two",
            "domain": "crypto",
            "keywords": ["swap"],
            "meaning": "swap again",
            "proposer": alice,
        })),
        false,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "keyword_collision");
    assert_eq!(body["glyph"], "X01");
}

#[tokio::test]
async fn summary_and_discussion_endpoints() {
    let router = test_router().await;
    let alice = register_agent(&router, "alice").await;
    let bob = register_agent(&router, "bob").await;

    let (_, proposal) = call(
        &router,
        "POST",
        "/knowledge/propose",
        Some(json!({
            "name": "stake-then-swap",
            "components": ["X05", "X01"],
            "proposer": alice,
        })),
        false,
    )
    .await;
    let id = proposal["id"].as_str().unwrap().to_string();

    let (status, comment) = call(
        &router,
        "POST",
        &format!("/governance/proposals/{id}/comment"),
        Some(json!({ "author": bob, "body": "why this order?" })),
        false,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let comment_id = comment["id"].as_str().unwrap().to_string();

    let (_, reply) = call(
        &router,
        "POST",
        &format!("/governance/proposals/{id}/comment"),
        Some(json!({ "author": alice, "body": "stake must come first", "parentId": comment_id })),
        false,
    )
    .await;
    assert_eq!(reply["parentId"], comment_id.as_str());

    let (status, discussion) = call(
        &router,
        "GET",
        &format!("/governance/proposals/{id}/discussion"),
        None,
        false,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let threads = discussion["comments"].as_array().unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0]["replies"].as_array().unwrap().len(), 1);

    let (status, summary) = call(
        &router,
        "GET",
        &format!("/governance/proposals/{id}/summary"),
        None,
        false,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["voteStatus"]["threshold"], 3);
    assert_eq!(summary["voteStatus"]["endorsements"], 1);
    assert_eq!(summary["proposal"]["id"], id.as_str());
    assert!(summary["governanceLog"].as_array().unwrap().len() >= 2);
}

#[tokio::test]
async fn amend_over_http_clears_votes() {
    let router = test_router().await;
    let alice = register_agent(&router, "alice").await;
    let bob = register_agent(&router, "bob").await;

    let (_, proposal) = call(
        &router,
        "POST",
        "/knowledge/propose",
        Some(json!({
            "name": "stake-then-swap",
            "components": ["X05", "X01"],
            "proposer": alice,
        })),
        false,
    )
    .await;
    let id = proposal["id"].as_str().unwrap().to_string();

    let (status, amended) = call(
        &router,
        "POST",
        &format!("/governance/proposals/{id}/amend"),
        Some(json!({
            "agent": bob,
            "name": "stake-then-swap-v2",
            "reason": "clearer component order",
            "components": ["X05", "X01"],
        })),
        false,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{amended}");
    assert_eq!(amended["supersedes"], id.as_str());
    // only the amender's fresh auto-endorsement
    assert_eq!(amended["endorsers"].as_array().unwrap().len(), 1);
    assert_eq!(amended["rejectors"].as_array().unwrap().len(), 0);

    let (_, summary) = call(
        &router,
        "GET",
        &format!("/governance/proposals/{id}/summary"),
        None,
        false,
    )
    .await;
    assert_eq!(summary["proposal"]["status"], "superseded");
    assert_eq!(
        summary["proposal"]["supersededBy"],
        amended["id"].as_str().unwrap()
    );
}

#[tokio::test]
async fn agents_endpoints() {
    let router = test_router().await;
    let address = register_agent(&router, "alice").await;

    let (status, agent) = call(&router, "GET", &format!("/agents/{address}"), None, false).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(agent["name"], "alice");
    assert_eq!(agent["tier"], "unverified");

    let (status, missing) = call(&router, "GET", "/agents/agent:ghost", None, false).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing["error"], "not_found");

    let (_, listed) = call(&router, "GET", "/agents", None, false).await;
    assert_eq!(listed["agents"].as_array().unwrap().len(), 1);

    // the default attestor never confirms
    let (status, verified) = call(
        &router,
        "GET",
        &format!("/agents/{address}/verify"),
        None,
        false,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified["attested"], false);
    assert_eq!(verified["agent"]["tier"], "unverified");
}

#[tokio::test]
async fn sequences_view_flags_promotable() {
    let router = test_router().await;
    for name in ["alice", "bob", "carol", "dave", "eve", "frank"] {
        register_agent(&router, name).await;
    }

    // repeat X05→X01 across three pairs until count ≥ 10
    let pairs = [("alice", "bob"), ("carol", "dave"), ("eve", "frank")];
    for _round in 0..4 {
        for (from, to) in pairs {
            for glyph in ["X05", "X01"] {
                let (status, _) = call(
                    &router,
                    "POST",
                    "/send",
                    Some(json!({
                        "glyph": glyph,
                        "recipient": format!("agent:{to}"),
                        "sender": from,
                    })),
                    false,
                )
                .await;
                assert_eq!(status, StatusCode::OK);
            }
        }
    }

    let (status, body) = call(&router, "GET", "/knowledge/sequences", None, false).await;
    assert_eq!(status, StatusCode::OK);
    let sequences = body["sequences"].as_array().unwrap();
    let target = sequences
        .iter()
        .find(|s| s["sequence"] == json!(["X05", "X01"]))
        .expect("sequence observed");
    assert_eq!(target["distinctPairs"], 3);
    assert!(target["count"].as_u64().unwrap() >= 10);
    assert_eq!(target["promotable"], true);

    let (_, filtered) = call(
        &router,
        "GET",
        "/knowledge/sequences?promotable=true",
        None,
        false,
    )
    .await;
    assert!(filtered["sequences"]
        .as_array()
        .unwrap()
        .iter()
        .all(|s| s["promotable"] == true));
}
