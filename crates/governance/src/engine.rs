//! Proposal lifecycle engine.
//!
//! Every mutation runs in one store transaction; the in-memory vocabulary
//! is touched only after the transaction commits, under the write lock held
//! for the whole operation. Callers supply `now` (epoch milliseconds), so
//! the engine itself is clock-free and fully deterministic under test.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use sqlx::{Sqlite, Transaction};
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};
use uuid::Uuid;

use glyphnet_knowledge::config::CoreConfig;
use glyphnet_knowledge::db::Database;
use glyphnet_knowledge::events::{Event, GovernanceEvent};
use glyphnet_knowledge::models::{
    Agent, Comment, GovernanceLogEntry, LogAction, Proposal, ProposalKind, ProposalPayload,
    ProposalStatus, Vote, VoteAction,
};
use glyphnet_knowledge::store::{self, Page};
use glyphnet_vocab::{CommunityGlyph, CompoundGlyph, GlyphDefinition, Vocabulary};

use crate::error::{GovernanceError, Result};

/// Tally snapshot for the summary view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteStatus {
    pub endorsements: i64,
    pub rejections: i64,
    pub threshold: i64,
    pub rejection_threshold: i64,
    pub min_vote_at: i64,
    pub can_accept: bool,
}

/// Everything a client needs to render one proposal.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalSummary {
    pub proposal: Proposal,
    pub comments: Vec<Comment>,
    pub governance_log: Vec<GovernanceLogEntry>,
    pub vote_status: VoteStatus,
}

/// What an accepted proposal installed, applied to the in-memory map after
/// commit.
enum Installed {
    Community(CommunityGlyph),
    Compound(CompoundGlyph),
}

struct EvalOutcome {
    status: ProposalStatus,
    installed: Option<Installed>,
    minted_id: Option<String>,
}

impl EvalOutcome {
    fn pending() -> Self {
        Self {
            status: ProposalStatus::Pending,
            installed: None,
            minted_id: None,
        }
    }
}

/// The governance engine.
pub struct Governance {
    db: Database,
    vocab: Arc<RwLock<Vocabulary>>,
    events: broadcast::Sender<String>,
    cfg: Arc<CoreConfig>,
}

impl Governance {
    pub fn new(
        db: Database,
        vocab: Arc<RwLock<Vocabulary>>,
        events: broadcast::Sender<String>,
        cfg: Arc<CoreConfig>,
    ) -> Self {
        Self {
            db,
            vocab,
            events,
            cfg,
        }
    }

    fn publish(&self, event: &Event) {
        match serde_json::to_string(event) {
            // send only fails when nobody subscribes, which is fine
            Ok(json) => {
                let _ = self.events.send(json);
            }
            Err(e) => warn!("failed to serialize broadcast event: {}", e),
        }
    }

    fn governance_event(agent: &Agent, proposal_id: &str, weight: Option<i64>, now: i64) -> GovernanceEvent {
        GovernanceEvent {
            proposal_id: proposal_id.to_string(),
            agent: agent.address.clone(),
            agent_tier: agent.tier,
            weight,
            timestamp: now,
            glyph_id: None,
        }
    }

    // ---- create -----------------------------------------------------------

    /// Create a proposal of either kind. The proposer's own endorsement is
    /// recorded immediately at their current tier weight.
    pub async fn create_proposal(
        &self,
        proposer_ident: &str,
        name: &str,
        description: &str,
        payload: ProposalPayload,
        now: i64,
    ) -> Result<Proposal> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GovernanceError::InvalidInput("proposal name is empty".into()));
        }
        let kind = match payload {
            ProposalPayload::Compound { .. } => ProposalKind::Compound,
            ProposalPayload::BaseGlyph { .. } => ProposalKind::BaseGlyph,
        };

        let vocab = self.vocab.read().await;
        let mut tx = self.db.pool().begin().await?;

        let proposer = store::find_agent(&mut *tx, proposer_ident)
            .await?
            .ok_or_else(|| GovernanceError::NotRegistered(proposer_ident.to_string()))?;
        if store::pending_name_exists(&mut *tx, name, None).await? {
            return Err(GovernanceError::DuplicateName(name.to_string()));
        }
        validate_payload(&vocab, &payload)?;
        drop(vocab);

        let id = match kind {
            ProposalKind::Compound => store::next_id(&mut *tx, "proposal_compound", "PC").await?,
            ProposalKind::BaseGlyph => store::next_id(&mut *tx, "proposal_base", "PB").await?,
        };
        let compound = kind == ProposalKind::Compound;
        let auto_vote = Vote {
            proposal_id: id.clone(),
            agent_address: proposer.address.clone(),
            action: VoteAction::Endorse,
            weight: proposer.tier.weight(),
            tier: proposer.tier,
            timestamp: now,
        };
        let proposal = Proposal {
            id: id.clone(),
            kind,
            status: ProposalStatus::Pending,
            name: name.to_string(),
            description: description.to_string(),
            proposer: proposer.address.clone(),
            created_at: now,
            expires_at: now + self.cfg.expiry_ms(compound),
            min_vote_at: now + self.cfg.min_vote_ms(compound),
            endorsers: vec![auto_vote.clone()],
            rejectors: vec![],
            superseded_by: None,
            supersedes: None,
            payload,
        };

        store::insert_proposal(&mut *tx, &proposal).await?;
        store::insert_vote(&mut *tx, &auto_vote).await?;
        store::append_governance_log(
            &mut *tx,
            &id,
            LogAction::Propose,
            &proposer.address,
            proposer.tier,
            Some(proposer.tier.weight()),
            now,
            None,
        )
        .await?;
        tx.commit().await?;

        info!(id = %proposal.id, kind = kind.as_str(), name = %proposal.name, "proposal created");
        self.publish(&Event::GovernancePropose(Self::governance_event(
            &proposer,
            &proposal.id,
            Some(proposer.tier.weight()),
            now,
        )));
        Ok(proposal)
    }

    // ---- voting -----------------------------------------------------------

    pub async fn endorse(&self, proposal_id: &str, agent_ident: &str, now: i64) -> Result<Proposal> {
        self.cast_vote(proposal_id, agent_ident, VoteAction::Endorse, now)
            .await
    }

    pub async fn reject(&self, proposal_id: &str, agent_ident: &str, now: i64) -> Result<Proposal> {
        self.cast_vote(proposal_id, agent_ident, VoteAction::Reject, now)
            .await
    }

    async fn cast_vote(
        &self,
        proposal_id: &str,
        agent_ident: &str,
        action: VoteAction,
        now: i64,
    ) -> Result<Proposal> {
        // write lock up front: an accepting vote mutates the vocabulary
        let mut vocab = self.vocab.write().await;
        let mut tx = self.db.pool().begin().await?;

        let agent = store::find_agent(&mut *tx, agent_ident)
            .await?
            .ok_or_else(|| GovernanceError::NotRegistered(agent_ident.to_string()))?;
        let mut proposal = store::get_proposal(&mut *tx, proposal_id)
            .await?
            .ok_or_else(|| GovernanceError::UnknownProposal(proposal_id.to_string()))?;
        if proposal.status != ProposalStatus::Pending {
            return Err(GovernanceError::NotPending(proposal_id.to_string()));
        }
        if proposal.has_voted(&agent.address) {
            return Err(GovernanceError::DuplicateVote {
                proposal: proposal_id.to_string(),
                agent: agent.address.clone(),
            });
        }

        let vote = Vote {
            proposal_id: proposal.id.clone(),
            agent_address: agent.address.clone(),
            action,
            weight: agent.tier.weight(),
            tier: agent.tier,
            timestamp: now,
        };
        store::insert_vote(&mut *tx, &vote).await?;
        let log_action = match action {
            VoteAction::Endorse => LogAction::Endorse,
            VoteAction::Reject => LogAction::Reject,
        };
        store::append_governance_log(
            &mut *tx,
            &proposal.id,
            log_action,
            &agent.address,
            agent.tier,
            Some(vote.weight),
            now,
            None,
        )
        .await?;

        match action {
            VoteAction::Endorse => proposal.endorsers.push(vote),
            VoteAction::Reject => proposal.rejectors.push(vote),
        }

        let outcome = self.evaluate_tx(&mut tx, &mut vocab, &proposal, now).await?;
        tx.commit().await?;
        proposal.status = outcome.status;

        // commit succeeded: now mutate the map and tell subscribers
        if let Some(installed) = outcome.installed {
            match installed {
                Installed::Community(g) => vocab.install_community(g)?,
                Installed::Compound(c) => vocab.install_compound(c)?,
            }
        }
        drop(vocab);

        let vote_event = Self::governance_event(&agent, &proposal.id, Some(agent.tier.weight()), now);
        self.publish(&match action {
            VoteAction::Endorse => Event::GovernanceEndorse(vote_event),
            VoteAction::Reject => Event::GovernanceReject(vote_event),
        });
        if outcome.status == ProposalStatus::Accepted {
            self.publish_accept(&proposal, outcome.minted_id, now);
        }
        Ok(proposal)
    }

    fn publish_accept(&self, proposal: &Proposal, minted_id: Option<String>, now: i64) {
        let proposer_tier = proposal
            .endorsers
            .first()
            .map(|v| v.tier)
            .unwrap_or(glyphnet_knowledge::models::AgentTier::Unverified);
        self.publish(&Event::GovernanceAccept(GovernanceEvent {
            proposal_id: proposal.id.clone(),
            agent: proposal.proposer.clone(),
            agent_tier: proposer_tier,
            weight: None,
            timestamp: now,
            glyph_id: minted_id,
        }));
    }

    // ---- evaluation -------------------------------------------------------

    /// Deterministic tally and status transition, inside the caller's
    /// transaction. Rejection wins first; endorsement acceptance is
    /// deferred until the vote window opens.
    async fn evaluate_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        vocab: &mut Vocabulary,
        proposal: &Proposal,
        now: i64,
    ) -> Result<EvalOutcome> {
        if proposal.rejection_weight() >= self.cfg.rejection_threshold {
            store::update_proposal_status(&mut *tx, &proposal.id, ProposalStatus::Rejected, None)
                .await?;
            info!(id = %proposal.id, "proposal rejected");
            return Ok(EvalOutcome {
                status: ProposalStatus::Rejected,
                installed: None,
                minted_id: None,
            });
        }
        if now < proposal.min_vote_at {
            return Ok(EvalOutcome::pending());
        }
        let compound = proposal.kind == ProposalKind::Compound;
        if proposal.endorsement_weight() >= self.cfg.endorsement_threshold(compound) {
            return self.accept_tx(tx, vocab, proposal, now).await;
        }
        Ok(EvalOutcome::pending())
    }

    /// Promote an accepted proposal into the vocabulary. Preconditions are
    /// re-validated here: a component superseded between propose and accept
    /// expires the proposal instead.
    async fn accept_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        vocab: &Vocabulary,
        proposal: &Proposal,
        now: i64,
    ) -> Result<EvalOutcome> {
        if validate_payload(vocab, &proposal.payload).is_err() {
            warn!(id = %proposal.id, "acceptance revalidation failed, expiring");
            store::update_proposal_status(&mut *tx, &proposal.id, ProposalStatus::Expired, None)
                .await?;
            self.log_terminal(tx, proposal, LogAction::Expire, now).await?;
            return Ok(EvalOutcome {
                status: ProposalStatus::Expired,
                installed: None,
                minted_id: None,
            });
        }

        let installed = match &proposal.payload {
            ProposalPayload::Compound { components } => {
                let id = store::next_id(&mut *tx, "compound", "C").await?;
                let compound = CompoundGlyph {
                    id: id.clone(),
                    name: proposal.name.clone(),
                    components: components.clone(),
                    description: proposal.description.clone(),
                    proposer: proposal.proposer.clone(),
                    created_at: now,
                    use_count: 0,
                };
                store::insert_compound(&mut *tx, &compound).await?;
                Installed::Compound(compound)
            }
            ProposalPayload::BaseGlyph {
                domain,
                keywords,
                meaning,
                bitmap,
            } => {
                let id = store::next_id(&mut *tx, "base", "B").await?;
                let glyph = CommunityGlyph {
                    def: GlyphDefinition {
                        id: id.clone(),
                        meaning: meaning.clone(),
                        pose: proposal.name.clone(),
                        symbol: "\u{25c7}".to_string(),
                        domain: *domain,
                        keywords: keywords.clone(),
                        visual_hint: if bitmap.is_some() {
                            "custom 16x16 bitmap".to_string()
                        } else {
                            "community glyph".to_string()
                        },
                    },
                    proposer: proposal.proposer.clone(),
                    created_at: now,
                };
                store::insert_community_glyph(&mut *tx, &glyph).await?;
                Installed::Community(glyph)
            }
        };
        let minted_id = match &installed {
            Installed::Community(g) => g.def.id.clone(),
            Installed::Compound(c) => c.id.clone(),
        };

        store::update_proposal_status(&mut *tx, &proposal.id, ProposalStatus::Accepted, None)
            .await?;
        self.log_terminal(tx, proposal, LogAction::Accept, now).await?;
        info!(id = %proposal.id, glyph = %minted_id, "proposal accepted");
        Ok(EvalOutcome {
            status: ProposalStatus::Accepted,
            installed: Some(installed),
            minted_id: Some(minted_id),
        })
    }

    /// Terminal log entries are attributed to the proposer, at the tier
    /// their auto-endorsement was cast with.
    async fn log_terminal(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        proposal: &Proposal,
        action: LogAction,
        now: i64,
    ) -> Result<()> {
        let tier = proposal
            .endorsers
            .first()
            .map(|v| v.tier)
            .unwrap_or(glyphnet_knowledge::models::AgentTier::Unverified);
        store::append_governance_log(
            &mut *tx,
            &proposal.id,
            action,
            &proposal.proposer,
            tier,
            None,
            now,
            None,
        )
        .await?;
        Ok(())
    }

    // ---- amendment --------------------------------------------------------

    /// Replace a pending proposal with a revised one. All prior votes are
    /// voided; the amender's auto-endorsement is applied fresh at their
    /// current tier.
    pub async fn amend(
        &self,
        proposal_id: &str,
        amender_ident: &str,
        name: &str,
        description: &str,
        payload: ProposalPayload,
        now: i64,
    ) -> Result<Proposal> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GovernanceError::InvalidInput("proposal name is empty".into()));
        }

        let vocab = self.vocab.read().await;
        let mut tx = self.db.pool().begin().await?;

        let amender = store::find_agent(&mut *tx, amender_ident)
            .await?
            .ok_or_else(|| GovernanceError::NotRegistered(amender_ident.to_string()))?;
        let original = store::get_proposal(&mut *tx, proposal_id)
            .await?
            .ok_or_else(|| GovernanceError::UnknownProposal(proposal_id.to_string()))?;
        if original.status != ProposalStatus::Pending {
            return Err(GovernanceError::AmendNotPending(proposal_id.to_string()));
        }

        let kind = match payload {
            ProposalPayload::Compound { .. } => ProposalKind::Compound,
            ProposalPayload::BaseGlyph { .. } => ProposalKind::BaseGlyph,
        };
        if kind != original.kind {
            return Err(GovernanceError::InvalidInput(
                "amendment must keep the proposal type".into(),
            ));
        }
        if store::pending_name_exists(&mut *tx, name, Some(&original.id)).await? {
            return Err(GovernanceError::DuplicateName(name.to_string()));
        }
        validate_payload(&vocab, &payload)?;
        drop(vocab);

        let new_id = match kind {
            ProposalKind::Compound => store::next_id(&mut *tx, "proposal_compound", "PC").await?,
            ProposalKind::BaseGlyph => store::next_id(&mut *tx, "proposal_base", "PB").await?,
        };
        let compound = kind == ProposalKind::Compound;
        let auto_vote = Vote {
            proposal_id: new_id.clone(),
            agent_address: amender.address.clone(),
            action: VoteAction::Endorse,
            weight: amender.tier.weight(),
            tier: amender.tier,
            timestamp: now,
        };
        let amended = Proposal {
            id: new_id.clone(),
            kind,
            status: ProposalStatus::Pending,
            name: name.to_string(),
            description: description.to_string(),
            proposer: amender.address.clone(),
            created_at: now,
            expires_at: now + self.cfg.expiry_ms(compound),
            min_vote_at: now + self.cfg.min_vote_ms(compound),
            endorsers: vec![auto_vote.clone()],
            rejectors: vec![],
            superseded_by: None,
            supersedes: Some(original.id.clone()),
            payload,
        };

        store::insert_proposal(&mut *tx, &amended).await?;
        store::insert_vote(&mut *tx, &auto_vote).await?;
        store::update_proposal_status(
            &mut *tx,
            &original.id,
            ProposalStatus::Superseded,
            Some(&new_id),
        )
        .await?;
        store::append_governance_log(
            &mut *tx,
            &new_id,
            LogAction::Amend,
            &amender.address,
            amender.tier,
            Some(amender.tier.weight()),
            now,
            Some(&json!({ "supersedes": original.id })),
        )
        .await?;
        store::append_governance_log(
            &mut *tx,
            &original.id,
            LogAction::Supersede,
            &amender.address,
            amender.tier,
            None,
            now,
            Some(&json!({ "supersededBy": new_id })),
        )
        .await?;
        tx.commit().await?;

        info!(original = %original.id, amended = %amended.id, "proposal amended");
        self.publish(&Event::GovernanceAmend(Self::governance_event(
            &amender,
            &amended.id,
            Some(amender.tier.weight()),
            now,
        )));
        Ok(amended)
    }

    // ---- discussion -------------------------------------------------------

    const MAX_COMMENT_LEN: usize = 2000;

    pub async fn comment(
        &self,
        proposal_id: &str,
        author_ident: &str,
        body: &str,
        parent_id: Option<&str>,
        now: i64,
    ) -> Result<Comment> {
        if body.trim().is_empty() {
            return Err(GovernanceError::InvalidInput("comment body is empty".into()));
        }
        if body.len() > Self::MAX_COMMENT_LEN {
            return Err(GovernanceError::InvalidInput(format!(
                "comment body exceeds {} chars",
                Self::MAX_COMMENT_LEN
            )));
        }

        let mut tx = self.db.pool().begin().await?;
        let author = store::find_agent(&mut *tx, author_ident)
            .await?
            .ok_or_else(|| GovernanceError::NotRegistered(author_ident.to_string()))?;
        let proposal = store::get_proposal(&mut *tx, proposal_id)
            .await?
            .ok_or_else(|| GovernanceError::UnknownProposal(proposal_id.to_string()))?;
        if proposal.status != ProposalStatus::Pending {
            return Err(GovernanceError::NotPending(proposal_id.to_string()));
        }
        if let Some(parent_id) = parent_id {
            let parent = store::get_comment(&mut *tx, parent_id)
                .await?
                .ok_or_else(|| {
                    GovernanceError::InvalidInput(format!("unknown parent comment: {parent_id}"))
                })?;
            if parent.proposal_id != proposal.id {
                return Err(GovernanceError::InvalidInput(
                    "parent comment belongs to another proposal".into(),
                ));
            }
            // single-level threading only
            if parent.parent_id.is_some() {
                return Err(GovernanceError::InvalidInput(
                    "replies to replies are not supported".into(),
                ));
            }
        }

        let comment = Comment {
            id: format!("cm-{}", Uuid::new_v4().simple()),
            proposal_id: proposal.id.clone(),
            author: author.address.clone(),
            body: body.to_string(),
            parent_id: parent_id.map(|s| s.to_string()),
            created_at: now,
        };
        store::insert_comment(&mut *tx, &comment).await?;
        store::append_governance_log(
            &mut *tx,
            &proposal.id,
            LogAction::Comment,
            &author.address,
            author.tier,
            None,
            now,
            None,
        )
        .await?;
        tx.commit().await?;

        self.publish(&Event::GovernanceComment(Self::governance_event(
            &author,
            &proposal.id,
            None,
            now,
        )));
        Ok(comment)
    }

    // ---- expiry sweep -----------------------------------------------------

    /// Idempotent background sweep. Every pending proposal gets one
    /// evaluation (an endorsement threshold reached during the vote window
    /// is honoured here once the window opens); those past expiry that stay
    /// pending become `expired`. Returns the number of status transitions.
    pub async fn expire_sweep(&self, now: i64) -> Result<u64> {
        let ids = {
            let mut conn = self.db.pool().acquire().await?;
            store::list_pending_ids(&mut conn).await?
        };

        let mut transitions = 0;
        for id in ids {
            let mut vocab = self.vocab.write().await;
            let mut tx = self.db.pool().begin().await?;
            let Some(proposal) = store::get_proposal(&mut *tx, &id).await? else {
                continue;
            };
            if proposal.status != ProposalStatus::Pending {
                continue;
            }

            let outcome = self.evaluate_tx(&mut tx, &mut vocab, &proposal, now).await?;
            let status = if outcome.status == ProposalStatus::Pending && proposal.expires_at <= now
            {
                store::update_proposal_status(&mut *tx, &id, ProposalStatus::Expired, None)
                    .await?;
                self.log_terminal(&mut tx, &proposal, LogAction::Expire, now).await?;
                info!(id = %proposal.id, "proposal expired");
                ProposalStatus::Expired
            } else {
                outcome.status
            };
            tx.commit().await?;

            if let Some(installed) = outcome.installed {
                match installed {
                    Installed::Community(g) => vocab.install_community(g)?,
                    Installed::Compound(c) => vocab.install_compound(c)?,
                }
            }
            drop(vocab);

            if status == ProposalStatus::Accepted {
                let mut accepted = proposal.clone();
                accepted.status = status;
                self.publish_accept(&accepted, outcome.minted_id, now);
            }
            if status != ProposalStatus::Pending {
                transitions += 1;
            }
        }
        Ok(transitions)
    }

    // ---- reads ------------------------------------------------------------

    pub async fn get_proposal(&self, id: &str) -> Result<Option<Proposal>> {
        let mut conn = self.db.pool().acquire().await?;
        Ok(store::get_proposal(&mut conn, id).await?)
    }

    pub async fn list_proposals(
        &self,
        status: Option<ProposalStatus>,
        page: Page,
    ) -> Result<Vec<Proposal>> {
        let mut conn = self.db.pool().acquire().await?;
        Ok(store::list_proposals(&mut conn, status, page).await?)
    }

    pub async fn discussion(&self, proposal_id: &str) -> Result<Vec<Comment>> {
        let mut conn = self.db.pool().acquire().await?;
        store::get_proposal(&mut conn, proposal_id)
            .await?
            .ok_or_else(|| GovernanceError::UnknownProposal(proposal_id.to_string()))?;
        Ok(store::list_comments(&mut conn, proposal_id).await?)
    }

    pub async fn summary(&self, proposal_id: &str, now: i64) -> Result<ProposalSummary> {
        let mut conn = self.db.pool().acquire().await?;
        let proposal = store::get_proposal(&mut conn, proposal_id)
            .await?
            .ok_or_else(|| GovernanceError::UnknownProposal(proposal_id.to_string()))?;
        let comments = store::list_comments(&mut conn, proposal_id).await?;
        let governance_log = store::list_governance_log(&mut conn, proposal_id).await?;

        let compound = proposal.kind == ProposalKind::Compound;
        let threshold = self.cfg.endorsement_threshold(compound);
        let endorsements = proposal.endorsement_weight();
        let vote_status = VoteStatus {
            endorsements,
            rejections: proposal.rejection_weight(),
            threshold,
            rejection_threshold: self.cfg.rejection_threshold,
            min_vote_at: proposal.min_vote_at,
            can_accept: proposal.status == ProposalStatus::Pending
                && now >= proposal.min_vote_at
                && endorsements >= threshold,
        };
        Ok(ProposalSummary {
            proposal,
            comments,
            governance_log,
            vote_status,
        })
    }
}

/// Shared create/amend/accept validation: compounds need at least two
/// installed components; base glyphs need clean, collision-free keywords.
fn validate_payload(vocab: &Vocabulary, payload: &ProposalPayload) -> Result<()> {
    match payload {
        ProposalPayload::Compound { components } => {
            if components.len() < 2 {
                return Err(GovernanceError::InvalidInput(
                    "a compound needs at least two components".into(),
                ));
            }
            for component in components {
                if !vocab.contains(component) {
                    return Err(GovernanceError::ComponentMissing(component.clone()));
                }
            }
        }
        ProposalPayload::BaseGlyph { keywords, .. } => {
            if keywords.is_empty() {
                return Err(GovernanceError::InvalidInput(
                    "a base glyph needs at least one keyword".into(),
                ));
            }
            for keyword in keywords {
                let trimmed = keyword.trim();
                if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
                    return Err(GovernanceError::InvalidInput(format!(
                        "invalid keyword: '{keyword}'"
                    )));
                }
                if let Some(glyph) = vocab.match_text(trimmed) {
                    return Err(GovernanceError::KeywordCollision {
                        keyword: trimmed.to_string(),
                        glyph: glyph.to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphnet_vocab::builtin_table;

    #[test]
    fn test_validate_compound_needs_two_components() {
        let vocab = Vocabulary::new(builtin_table());
        let err = validate_payload(
            &vocab,
            &ProposalPayload::Compound {
                components: vec!["X01".to_string()],
            },
        )
        .unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidInput(_)));
    }

    #[test]
    fn test_validate_compound_missing_component() {
        let vocab = Vocabulary::new(builtin_table());
        let err = validate_payload(
            &vocab,
            &ProposalPayload::Compound {
                components: vec!["X01".to_string(), "Z99".to_string()],
            },
        )
        .unwrap_err();
        assert!(matches!(err, GovernanceError::ComponentMissing(c) if c == "Z99"));
    }

    #[test]
    fn test_validate_keyword_collision() {
        let vocab = Vocabulary::new(builtin_table());
        let err = validate_payload(
            &vocab,
            &ProposalPayload::BaseGlyph {
                domain: glyphnet_vocab::Domain::Crypto,
                keywords: vec!["swap".to_string()],
                meaning: "again".to_string(),
                bitmap: None,
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GovernanceError::KeywordCollision { keyword, glyph } if keyword == "swap" && glyph == "X01"
        ));
    }

    #[test]
    fn test_validate_keyword_shape() {
        let vocab = Vocabulary::new(builtin_table());
        for bad in ["", "  ", "two words"] {
            let err = validate_payload(
                &vocab,
                &ProposalPayload::BaseGlyph {
                    domain: glyphnet_vocab::Domain::Agent,
                    keywords: vec![bad.to_string()],
                    meaning: "m".to_string(),
                    bitmap: None,
                },
            )
            .unwrap_err();
            assert!(matches!(err, GovernanceError::InvalidInput(_)), "{bad:?}");
        }
    }

    #[test]
    fn test_validate_fresh_keyword_passes() {
        let vocab = Vocabulary::new(builtin_table());
        validate_payload(
            &vocab,
            &ProposalPayload::BaseGlyph {
                domain: glyphnet_vocab::Domain::Agent,
                keywords: vec!["replan".to_string()],
                meaning: "revise the plan".to_string(),
                bitmap: None,
            },
        )
        .unwrap();
    }
}
