//! Runtime configuration.
//!
//! Every tunable the domain logic reads lives here, loaded from environment
//! variables. Thresholds and windows are design-level constants with
//! defaults; code never hardcodes them at use sites.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CoreConfig {
    /// Sqlite connection string, e.g. `sqlite://glyphnet.db`
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Sequence-detector sliding window (env: `WINDOW_MS`)
    #[serde(default = "default_window_ms")]
    pub window_ms: i64,

    /// Observations below this count are never promotable
    #[serde(default = "default_seq_promote_count")]
    pub seq_promote_count: u64,

    /// Distinct agent pairs required before a sequence is promotable
    #[serde(default = "default_seq_promote_pairs")]
    pub seq_promote_pairs: u64,

    /// Per-pair window entry cap, the memory safety valve
    #[serde(default = "default_seq_pair_cap")]
    pub seq_pair_cap: usize,

    /// Endorsement weight needed to accept a compound proposal
    #[serde(default = "default_compound_threshold")]
    pub compound_threshold: i64,

    /// Endorsement weight needed to accept a base-glyph proposal
    #[serde(default = "default_base_threshold")]
    pub base_threshold: i64,

    /// Rejection weight that terminates any proposal
    #[serde(default = "default_rejection_threshold")]
    pub rejection_threshold: i64,

    #[serde(default = "default_compound_expiry_ms")]
    pub compound_expiry_ms: i64,

    #[serde(default = "default_base_expiry_ms")]
    pub base_expiry_ms: i64,

    /// Earliest time after creation at which endorsements may accept
    #[serde(default = "default_compound_min_vote_ms")]
    pub compound_min_vote_ms: i64,

    #[serde(default = "default_base_min_vote_ms")]
    pub base_min_vote_ms: i64,

    /// Broadcast subscriber cap
    #[serde(default = "default_max_clients")]
    pub max_clients: usize,

    /// Stream heartbeat interval
    #[serde(default = "default_heartbeat_ms")]
    pub heartbeat_ms: u64,

    /// Inbound stream frames larger than this are refused unparsed
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,

    /// Byte cap for each string field of agora message data
    #[serde(default = "default_agora_max_field_len")]
    pub agora_max_field_len: usize,

    /// Outbound relay wall-clock deadline
    #[serde(default = "default_relay_deadline_ms")]
    pub relay_deadline_ms: u64,

    /// Proposal expiry sweep interval
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,

    /// Maximum number of connections in the pool (env: `DB_MAX_CONNECTIONS`)
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// Timeout in seconds to wait for a connection from the pool
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,
}

fn default_database_url() -> String {
    "sqlite://glyphnet.db".to_string()
}

fn default_window_ms() -> i64 {
    30_000
}

fn default_seq_promote_count() -> u64 {
    10
}

fn default_seq_promote_pairs() -> u64 {
    3
}

fn default_seq_pair_cap() -> usize {
    1024
}

fn default_compound_threshold() -> i64 {
    3
}

fn default_base_threshold() -> i64 {
    5
}

fn default_rejection_threshold() -> i64 {
    3
}

fn default_compound_expiry_ms() -> i64 {
    7 * 24 * 60 * 60 * 1000
}

fn default_base_expiry_ms() -> i64 {
    14 * 24 * 60 * 60 * 1000
}

fn default_compound_min_vote_ms() -> i64 {
    60 * 60 * 1000
}

fn default_base_min_vote_ms() -> i64 {
    6 * 60 * 60 * 1000
}

fn default_max_clients() -> usize {
    100
}

fn default_heartbeat_ms() -> u64 {
    30_000
}

fn default_max_frame_bytes() -> usize {
    4096
}

fn default_agora_max_field_len() -> usize {
    200
}

fn default_relay_deadline_ms() -> u64 {
    10_000
}

fn default_sweep_interval_ms() -> u64 {
    60_000
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_acquire_timeout_secs() -> u64 {
    30
}

impl CoreConfig {
    pub fn load() -> std::result::Result<Self, config::ConfigError> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;
        cfg.try_deserialize()
    }

    /// Convenience constructor from environment variables.
    pub fn from_env() -> std::result::Result<Self, config::ConfigError> {
        Self::load()
    }

    pub fn expiry_ms(&self, compound: bool) -> i64 {
        if compound {
            self.compound_expiry_ms
        } else {
            self.base_expiry_ms
        }
    }

    pub fn min_vote_ms(&self, compound: bool) -> i64 {
        if compound {
            self.compound_min_vote_ms
        } else {
            self.base_min_vote_ms
        }
    }

    pub fn endorsement_threshold(&self, compound: bool) -> i64 {
        if compound {
            self.compound_threshold
        } else {
            self.base_threshold
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            window_ms: default_window_ms(),
            seq_promote_count: default_seq_promote_count(),
            seq_promote_pairs: default_seq_promote_pairs(),
            seq_pair_cap: default_seq_pair_cap(),
            compound_threshold: default_compound_threshold(),
            base_threshold: default_base_threshold(),
            rejection_threshold: default_rejection_threshold(),
            compound_expiry_ms: default_compound_expiry_ms(),
            base_expiry_ms: default_base_expiry_ms(),
            compound_min_vote_ms: default_compound_min_vote_ms(),
            base_min_vote_ms: default_base_min_vote_ms(),
            max_clients: default_max_clients(),
            heartbeat_ms: default_heartbeat_ms(),
            max_frame_bytes: default_max_frame_bytes(),
            agora_max_field_len: default_agora_max_field_len(),
            relay_deadline_ms: default_relay_deadline_ms(),
            sweep_interval_ms: default_sweep_interval_ms(),
            db_max_connections: default_db_max_connections(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
        }
    }
}
