//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tracing::info;

use glyphnet_governance::Governance;
use glyphnet_knowledge::config::CoreConfig;
use glyphnet_knowledge::db::Database;
use glyphnet_knowledge::identity::{ChainAttestor, Identity, WalletVerifier};
use glyphnet_knowledge::store;
use glyphnet_knowledge::Knowledge;
use glyphnet_vocab::{builtin_table, Vocabulary};

use crate::error::Result;
use crate::stream::SubscriberRegistry;

/// Buffered broadcast events per subscriber before a slow client lags out.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Epoch milliseconds, the one clock read the handlers use.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Everything the handlers share. In-memory structures are guarded per the
/// preemptive-runtime adaptation: the vocabulary behind an `RwLock`, the
/// knowledge indices behind the `Knowledge` mutex, the subscriber registry
/// behind its slot counter.
pub struct AppState {
    pub cfg: Arc<CoreConfig>,
    pub db: Database,
    pub vocab: Arc<RwLock<Vocabulary>>,
    pub knowledge: Arc<Knowledge>,
    pub governance: Arc<Governance>,
    pub identity: Arc<Identity>,
    /// Pre-serialized event JSON fanned out to stream subscribers
    pub events: broadcast::Sender<String>,
    pub subscribers: SubscriberRegistry,
    pub admin_token: Option<String>,
    pub http: reqwest::Client,
}

impl AppState {
    /// Assemble the full service over an already-migrated database: load
    /// the vocabulary union from the store, replay the message log into the
    /// knowledge indices, and wire governance to the broadcast channel.
    pub async fn new(
        cfg: CoreConfig,
        db: Database,
        verifier: Arc<dyn WalletVerifier>,
        attestor: Arc<dyn ChainAttestor>,
        admin_token: Option<String>,
    ) -> Result<Arc<Self>> {
        let cfg = Arc::new(cfg);

        let mut conn = db.pool().acquire().await?;
        let community = store::list_community_glyphs(&mut conn).await?;
        let compounds = store::all_compounds(&mut conn).await?;
        drop(conn);
        info!(
            community = community.len(),
            compounds = compounds.len(),
            "loading vocabulary"
        );
        let vocab = Arc::new(RwLock::new(Vocabulary::load(
            builtin_table(),
            community,
            compounds,
        )?));

        let knowledge = Arc::new(Knowledge::open(db.clone(), cfg.clone()).await?);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let governance = Arc::new(Governance::new(
            db.clone(),
            vocab.clone(),
            events.clone(),
            cfg.clone(),
        ));
        let identity = Arc::new(Identity::new(db.clone(), verifier, attestor));

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.relay_deadline_ms))
            .build()
            .map_err(anyhow::Error::from)?;

        Ok(Arc::new(Self {
            subscribers: SubscriberRegistry::new(cfg.max_clients),
            cfg,
            db,
            vocab,
            knowledge,
            governance,
            identity,
            events,
            admin_token,
            http,
        }))
    }

    /// Admin gate for `/knowledge/reset` and `/stream/broadcast`.
    pub fn is_admin(&self, presented: Option<&str>) -> bool {
        match (&self.admin_token, presented) {
            (Some(expected), Some(got)) => expected == got,
            _ => false,
        }
    }
}
