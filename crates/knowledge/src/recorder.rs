//! Message recording and derived indices.
//!
//! The store is the durable log; everything here besides the log itself is
//! derived and rebuilds from a replay. A cold start with empty indices plus
//! a full replay yields the same counters and observations as the live
//! path, because both run through [`KnowledgeIndex::observe`].

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::CoreConfig;
use crate::db::Database;
use crate::error::Result;
use crate::models::Message;
use crate::sequence::{SequenceDetector, SequenceView};
use crate::store;

/// Usage stats for one glyph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphStats {
    pub count: u64,
    pub first_seen: i64,
    pub last_seen: i64,
    pub agents: BTreeSet<String>,
}

/// Activity stats for one sender.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentStats {
    pub messages_sent: u64,
    pub glyphs_used: BTreeSet<String>,
    pub last_seen: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlyphStatsView {
    pub glyph: String,
    pub count: u64,
    pub first_seen: i64,
    pub last_seen: i64,
    pub agents: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatsView {
    pub agent: String,
    pub messages_sent: u64,
    pub glyphs_used: Vec<String>,
    pub last_seen: i64,
}

/// The in-memory derived state: counters plus the sequence detector.
pub struct KnowledgeIndex {
    glyph_stats: HashMap<String, GlyphStats>,
    agent_stats: HashMap<String, AgentStats>,
    detector: SequenceDetector,
    total_messages: u64,
}

impl KnowledgeIndex {
    pub fn new(cfg: &CoreConfig) -> Self {
        Self {
            glyph_stats: HashMap::new(),
            agent_stats: HashMap::new(),
            detector: SequenceDetector::new(cfg),
            total_messages: 0,
        }
    }

    /// Apply one non-encrypted message, in record order.
    pub fn observe(&mut self, msg: &Message) {
        self.total_messages += 1;

        let glyph = self.glyph_stats.entry(msg.glyph.clone()).or_default();
        if glyph.count == 0 {
            glyph.first_seen = msg.timestamp;
        }
        glyph.count += 1;
        glyph.last_seen = msg.timestamp;
        glyph.agents.insert(msg.sender.clone());

        let agent = self.agent_stats.entry(msg.sender.clone()).or_default();
        agent.messages_sent += 1;
        agent.glyphs_used.insert(msg.glyph.clone());
        agent.last_seen = msg.timestamp;

        self.detector
            .offer(&msg.sender, &msg.recipient, &msg.glyph, msg.timestamp);
    }

    /// Rebuild from a replayed log. Encrypted messages never contributed to
    /// derived state, so the replay skips them too.
    pub fn rebuild<'a>(cfg: &CoreConfig, log: impl IntoIterator<Item = &'a Message>) -> Self {
        let mut index = Self::new(cfg);
        for msg in log {
            if !msg.encrypted {
                index.observe(msg);
            }
        }
        index
    }

    pub fn total_messages(&self) -> u64 {
        self.total_messages
    }

    pub fn glyph(&self, id: &str) -> Option<&GlyphStats> {
        self.glyph_stats.get(id)
    }

    pub fn agent(&self, ident: &str) -> Option<&AgentStats> {
        self.agent_stats.get(ident)
    }

    /// Per-glyph stats, most used first.
    pub fn glyph_views(&self) -> Vec<GlyphStatsView> {
        let mut all: Vec<GlyphStatsView> = self
            .glyph_stats
            .iter()
            .map(|(glyph, s)| GlyphStatsView {
                glyph: glyph.clone(),
                count: s.count,
                first_seen: s.first_seen,
                last_seen: s.last_seen,
                agents: s.agents.iter().cloned().collect(),
            })
            .collect();
        all.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.glyph.cmp(&b.glyph)));
        all
    }

    pub fn agent_views(&self) -> Vec<AgentStatsView> {
        let mut all: Vec<AgentStatsView> = self
            .agent_stats
            .iter()
            .map(|(agent, s)| AgentStatsView {
                agent: agent.clone(),
                messages_sent: s.messages_sent,
                glyphs_used: s.glyphs_used.iter().cloned().collect(),
                last_seen: s.last_seen,
            })
            .collect();
        all.sort_by(|a, b| {
            b.messages_sent
                .cmp(&a.messages_sent)
                .then_with(|| a.agent.cmp(&b.agent))
        });
        all
    }

    pub fn sequence_views(&self) -> Vec<SequenceView> {
        self.detector.views()
    }

    pub fn detector(&self) -> &SequenceDetector {
        &self.detector
    }

    pub fn clear(&mut self) {
        self.glyph_stats.clear();
        self.agent_stats.clear();
        self.detector.clear();
        self.total_messages = 0;
    }
}

/// The knowledge base: durable log plus live derived state.
pub struct Knowledge {
    db: Database,
    index: Mutex<KnowledgeIndex>,
}

impl Knowledge {
    /// Open over an already-migrated database, replaying the message log
    /// into fresh indices.
    pub async fn open(db: Database, cfg: Arc<CoreConfig>) -> Result<Self> {
        let mut conn = db.pool().acquire().await?;
        let log = store::all_messages_ordered(&mut *conn).await?;
        drop(conn);
        info!("Rebuilding knowledge indices from {} messages", log.len());
        let index = KnowledgeIndex::rebuild(&cfg, log.iter());
        Ok(Self {
            db,
            index: Mutex::new(index),
        })
    }

    /// Persist a message and update derived state.
    ///
    /// The durable write and the sender's `last_seen` touch share one
    /// transaction. Encrypted messages are persisted but contribute nothing
    /// to counters or sequence detection.
    pub async fn record(&self, msg: &Message) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;
        store::insert_message(&mut *tx, msg).await?;
        if let Some(agent) = store::find_agent(&mut *tx, &msg.sender).await? {
            store::touch_agent(&mut *tx, &agent.address, msg.timestamp).await?;
        }
        tx.commit().await?;

        if !msg.encrypted {
            self.index.lock().await.observe(msg);
        }
        debug!(glyph = %msg.glyph, recipient = %msg.recipient, "message recorded");
        Ok(())
    }

    /// Run `f` over the live index.
    pub async fn with_index<T>(&self, f: impl FnOnce(&KnowledgeIndex) -> T) -> T {
        let index = self.index.lock().await;
        f(&index)
    }

    /// Admin reset: wipe the store and the derived state together.
    pub async fn reset(&self) -> Result<()> {
        let mut tx = self.db.pool().begin().await?;
        store::reset(&mut *tx).await?;
        tx.commit().await?;
        self.index.lock().await.clear();
        Ok(())
    }

    pub fn db(&self) -> &Database {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::message_hash;

    fn msg(id: &str, glyph: &str, sender: &str, recipient: &str, ts: i64) -> Message {
        Message {
            id: id.to_string(),
            glyph: glyph.to_string(),
            sender: sender.to_string(),
            recipient: recipient.to_string(),
            data: None,
            timestamp: ts,
            message_hash: message_hash(glyph, None, recipient, ts),
            attestation_tx_hash: None,
            encrypted: false,
        }
    }

    #[test]
    fn test_observe_updates_all_counters() {
        let cfg = CoreConfig::default();
        let mut index = KnowledgeIndex::new(&cfg);
        index.observe(&msg("m1", "X01", "alice", "bob", 100));
        index.observe(&msg("m2", "X01", "carol", "bob", 200));
        index.observe(&msg("m3", "Q01", "alice", "agora", 300));

        let x01 = index.glyph("X01").unwrap();
        assert_eq!(x01.count, 2);
        assert_eq!(x01.first_seen, 100);
        assert_eq!(x01.last_seen, 200);
        assert_eq!(x01.agents.len(), 2);

        let alice = index.agent("alice").unwrap();
        assert_eq!(alice.messages_sent, 2);
        assert_eq!(alice.glyphs_used.len(), 2);
        assert_eq!(alice.last_seen, 300);

        assert_eq!(index.total_messages(), 3);
    }

    #[test]
    fn test_rebuild_equals_live() {
        let cfg = CoreConfig::default();
        let log: Vec<Message> = vec![
            msg("m1", "X05", "alice", "bob", 100),
            msg("m2", "X01", "alice", "bob", 200),
            msg("m3", "X05", "carol", "dave", 300),
            msg("m4", "X01", "carol", "dave", 400),
        ];

        let mut live = KnowledgeIndex::new(&cfg);
        for m in &log {
            live.observe(m);
        }
        let rebuilt = KnowledgeIndex::rebuild(&cfg, log.iter());

        assert_eq!(live.glyph_stats, rebuilt.glyph_stats);
        assert_eq!(live.agent_stats, rebuilt.agent_stats);
        assert_eq!(live.total_messages(), rebuilt.total_messages());
        let live_seqs: Vec<_> = live.sequence_views().into_iter().map(|v| (v.sequence, v.count)).collect();
        let rebuilt_seqs: Vec<_> =
            rebuilt.sequence_views().into_iter().map(|v| (v.sequence, v.count)).collect();
        assert_eq!(live_seqs, rebuilt_seqs);
    }

    #[test]
    fn test_rebuild_skips_encrypted() {
        let cfg = CoreConfig::default();
        let mut secret = msg("m1", "X01", "alice", "bob", 100);
        secret.encrypted = true;
        let rebuilt = KnowledgeIndex::rebuild(&cfg, [&secret, &msg("m2", "Q01", "alice", "bob", 200)]);
        assert!(rebuilt.glyph("X01").is_none());
        assert_eq!(rebuilt.total_messages(), 1);
    }

    #[tokio::test]
    async fn test_record_persists_and_indexes() {
        let db = Database::in_memory().await.unwrap();
        let cfg = Arc::new(CoreConfig::default());
        let knowledge = Knowledge::open(db.clone(), cfg.clone()).await.unwrap();

        knowledge
            .record(&msg("m1", "X01", "alice", "agora", 100))
            .await
            .unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        assert_eq!(store::count_messages(&mut *conn).await.unwrap(), 1);
        let count = knowledge
            .with_index(|i| i.glyph("X01").map(|s| s.count))
            .await;
        assert_eq!(count, Some(1));
    }

    #[tokio::test]
    async fn test_encrypted_record_skips_index() {
        let db = Database::in_memory().await.unwrap();
        let cfg = Arc::new(CoreConfig::default());
        let knowledge = Knowledge::open(db.clone(), cfg).await.unwrap();

        let mut secret = msg("m1", "X01", "alice", "agent:bob", 100);
        secret.encrypted = true;
        knowledge.record(&secret).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        assert_eq!(store::count_messages(&mut *conn).await.unwrap(), 1);
        let seen = knowledge.with_index(|i| i.glyph("X01").is_some()).await;
        assert!(!seen);
    }

    #[tokio::test]
    async fn test_cold_start_replay_matches() {
        let db = Database::in_memory().await.unwrap();
        let cfg = Arc::new(CoreConfig::default());
        let knowledge = Knowledge::open(db.clone(), cfg.clone()).await.unwrap();
        for (i, glyph) in ["X05", "X01", "X05", "X01"].iter().enumerate() {
            knowledge
                .record(&msg(&format!("m{i}"), glyph, "alice", "bob", 100 * (i as i64 + 1)))
                .await
                .unwrap();
        }
        let live = knowledge.with_index(|i| i.glyph_views()).await;

        // cold start over the same database file
        let reopened = Knowledge::open(db, cfg).await.unwrap();
        let replayed = reopened.with_index(|i| i.glyph_views()).await;
        assert_eq!(
            serde_json::to_value(&live).unwrap(),
            serde_json::to_value(&replayed).unwrap()
        );
    }
}
