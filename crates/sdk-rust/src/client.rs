//! The HTTP client

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, SdkError};
use crate::types::{
    Agent, EncodeRequest, EncodeResponse, Proposal, ProposalList, ProposeCompoundRequest,
    RegisterRequest, SendRequest, SendResponse, VoteRequest,
};

/// Async client over one Glyphnet server.
#[derive(Clone)]
pub struct GlyphnetClient {
    base_url: String,
    http: Client,
}

impl GlyphnetClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body: Value = response.json().await.unwrap_or_default();
            Err(SdkError::Api {
                status: status.as_u16(),
                kind: body["error"].as_str().unwrap_or("unknown").to_string(),
                message: body["message"].as_str().unwrap_or_default().to_string(),
            })
        }
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.http.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    /// Resolve a text fragment to a glyph. An encode miss surfaces as an
    /// `Api` error with kind `no_match`.
    pub async fn encode(&self, req: &EncodeRequest) -> Result<EncodeResponse> {
        self.post("/encode", req).await
    }

    /// Full definition of a glyph ID (base or compound).
    pub async fn decode_glyph(&self, glyph: &str) -> Result<Value> {
        self.post("/decode", &serde_json::json!({ "glyph": glyph }))
            .await
    }

    pub async fn send(&self, req: &SendRequest) -> Result<SendResponse> {
        self.post("/send", req).await
    }

    pub async fn register_agent(&self, req: &RegisterRequest) -> Result<Agent> {
        self.post("/agents/register", req).await
    }

    pub async fn propose_compound(&self, req: &ProposeCompoundRequest) -> Result<Proposal> {
        self.post("/knowledge/propose", req).await
    }

    pub async fn endorse(&self, proposal_id: &str, agent: &str) -> Result<Proposal> {
        let req = VoteRequest {
            proposal_id: proposal_id.to_string(),
            agent: agent.to_string(),
        };
        self.post("/knowledge/endorse", &req).await
    }

    pub async fn reject(&self, proposal_id: &str, agent: &str) -> Result<Proposal> {
        let req = VoteRequest {
            proposal_id: proposal_id.to_string(),
            agent: agent.to_string(),
        };
        self.post("/knowledge/reject", &req).await
    }

    /// Proposals by status: `pending`, `all`, `accepted`, …
    pub async fn proposals(&self, status: &str) -> Result<Vec<Proposal>> {
        let list: ProposalList = self
            .get(&format!("/knowledge/proposals?status={status}"))
            .await?;
        Ok(list.proposals)
    }

    pub async fn health(&self) -> Result<Value> {
        self.get("/health").await
    }
}
