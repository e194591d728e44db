//! Agent registration and tier resolution.
//!
//! Three monotonically ordered tiers decide vote weight. Wallet signature
//! checks and on-chain attestation are external collaborators behind async
//! traits; the defaults accept wallets unverified-style and never attest.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::db::Database;
use crate::error::{KnowledgeError, Result};
use crate::models::{Agent, AgentTier};
use crate::store::{self, Page};

/// Collaborator that proves control of a claimed wallet address.
#[async_trait]
pub trait WalletVerifier: Send + Sync {
    /// True when `signature` proves `name` controls `wallet`. Called only
    /// when a signature was supplied; a bare wallet claim skips this.
    async fn verify(&self, name: &str, wallet: &str, signature: &str) -> bool;
}

/// Collaborator that confirms an on-chain identity record for an agent.
#[async_trait]
pub trait ChainAttestor: Send + Sync {
    /// The attestation transaction hash, when the chain knows this agent.
    async fn attest(&self, address: &str, wallet: Option<&str>) -> Option<String>;
}

/// Default verifier: accepts every claim.
pub struct AcceptAllVerifier;

#[async_trait]
impl WalletVerifier for AcceptAllVerifier {
    async fn verify(&self, _name: &str, _wallet: &str, _signature: &str) -> bool {
        true
    }
}

/// Default attestor: never confirms.
pub struct NoAttestor;

#[async_trait]
impl ChainAttestor for NoAttestor {
    async fn attest(&self, _address: &str, _wallet: Option<&str>) -> Option<String> {
        None
    }
}

/// A registration request, as received on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub name: String,
    pub wallet_address: Option<String>,
    pub signature: Option<String>,
    pub service_url: Option<String>,
    #[serde(default)]
    pub protocols: Vec<String>,
}

/// Identity service over the agent table.
pub struct Identity {
    db: Database,
    verifier: Arc<dyn WalletVerifier>,
    attestor: Arc<dyn ChainAttestor>,
}

impl Identity {
    pub fn new(
        db: Database,
        verifier: Arc<dyn WalletVerifier>,
        attestor: Arc<dyn ChainAttestor>,
    ) -> Self {
        Self {
            db,
            verifier,
            attestor,
        }
    }

    /// Register a new agent or upgrade an existing one by name.
    ///
    /// A bare name yields `unverified` with a synthetic address; a wallet
    /// claim yields `wallet-linked` (refused when a supplied signature fails
    /// verification). Tier never decreases on re-registration.
    pub async fn register(&self, reg: Registration, now: i64) -> Result<Agent> {
        let name = reg.name.trim();
        if name.is_empty() {
            return Err(KnowledgeError::InvalidInput("agent name is empty".into()));
        }

        let claimed_tier = match &reg.wallet_address {
            Some(wallet) => {
                if let Some(signature) = &reg.signature {
                    if !self.verifier.verify(name, wallet, signature).await {
                        return Err(KnowledgeError::VerificationRefused {
                            name: name.to_string(),
                            wallet: wallet.clone(),
                        });
                    }
                }
                AgentTier::WalletLinked
            }
            None => AgentTier::Unverified,
        };

        let mut conn = self.db.pool().acquire().await?;
        let existing = store::find_agent(&mut *conn, name).await?;
        drop(conn);

        let agent = match existing {
            Some(mut agent) => {
                // monotonic: a weaker claim never demotes
                agent.tier = agent.tier.max(claimed_tier);
                if reg.wallet_address.is_some() {
                    agent.wallet_address = reg.wallet_address;
                }
                if reg.service_url.is_some() {
                    agent.service_url = reg.service_url;
                }
                if !reg.protocols.is_empty() {
                    agent.protocols = reg.protocols;
                }
                agent.last_seen = now;
                agent
            }
            None => Agent {
                address: synthetic_address(),
                name: name.to_string(),
                tier: claimed_tier,
                wallet_address: reg.wallet_address,
                service_url: reg.service_url,
                protocols: reg.protocols,
                registered_at: now,
                last_seen: now,
            },
        };

        let mut tx = self.db.pool().begin().await?;
        store::upsert_agent(&mut *tx, &agent).await?;
        tx.commit().await?;
        info!(name = %agent.name, tier = agent.tier.as_str(), "agent registered");
        Ok(agent)
    }

    /// Promote to `on-chain` when the attestation collaborator confirms an
    /// identity record. Returns the agent and the attestation hash, if any.
    pub async fn verify_on_chain(&self, address: &str, now: i64) -> Result<(Agent, Option<String>)> {
        let mut conn = self.db.pool().acquire().await?;
        let mut agent = store::get_agent(&mut *conn, address)
            .await?
            .ok_or_else(|| KnowledgeError::NotRegistered(address.to_string()))?;
        drop(conn);

        let attestation = self
            .attestor
            .attest(&agent.address, agent.wallet_address.as_deref())
            .await;
        if attestation.is_some() && agent.tier < AgentTier::OnChain {
            agent.tier = AgentTier::OnChain;
            agent.last_seen = now;
            let mut tx = self.db.pool().begin().await?;
            store::upsert_agent(&mut *tx, &agent).await?;
            tx.commit().await?;
            info!(name = %agent.name, "agent promoted to on-chain");
        }
        Ok((agent, attestation))
    }

    pub async fn get(&self, address: &str) -> Result<Option<Agent>> {
        let mut conn = self.db.pool().acquire().await?;
        store::get_agent(&mut *conn, address).await
    }

    /// Lookup by address or unique name.
    pub async fn find(&self, ident: &str) -> Result<Option<Agent>> {
        let mut conn = self.db.pool().acquire().await?;
        store::find_agent(&mut *conn, ident).await
    }

    pub async fn list(&self, page: Page) -> Result<Vec<Agent>> {
        let mut conn = self.db.pool().acquire().await?;
        store::list_agents(&mut *conn, page).await
    }
}

fn synthetic_address() -> String {
    format!("agent:{}", Uuid::new_v4().simple())
}
