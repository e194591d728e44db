//! Sliding-window glyph sequence detection.
//!
//! Each ordered (sender, recipient) pair keeps a short window of recent
//! glyphs. Every contiguous 2- and 3-gram ending at a new message feeds a
//! global observation table; an observation seen often enough across enough
//! distinct pairs becomes promotable — a candidate for a compound-glyph
//! proposal.

use std::collections::{BTreeSet, HashMap, VecDeque};

use serde::Serialize;

use crate::config::CoreConfig;

const MIN_NGRAM: usize = 2;
const MAX_NGRAM: usize = 3;

/// Aggregate stats for one observed glyph sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceObservation {
    pub sequence: Vec<String>,
    pub count: u64,
    pub first_seen: i64,
    pub last_seen: i64,
    pub pairs: BTreeSet<(String, String)>,
}

impl SequenceObservation {
    pub fn distinct_pairs(&self) -> u64 {
        self.pairs.len() as u64
    }

    pub fn involved_agents(&self) -> BTreeSet<&str> {
        self.pairs
            .iter()
            .flat_map(|(a, b)| [a.as_str(), b.as_str()])
            .collect()
    }
}

/// Wire/report form of an observation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceView {
    pub sequence: Vec<String>,
    pub count: u64,
    pub first_seen: i64,
    pub last_seen: i64,
    pub distinct_pairs: u64,
    pub involved_agents: Vec<String>,
    pub promotable: bool,
}

#[derive(Debug, Clone)]
struct WindowEntry {
    glyph: String,
    timestamp: i64,
}

/// The detector. Windows are bounded by the time horizon plus a hard
/// per-pair entry cap, so unbounded pair counts cannot exhaust memory.
pub struct SequenceDetector {
    window_ms: i64,
    pair_cap: usize,
    promote_count: u64,
    promote_pairs: u64,
    windows: HashMap<(String, String), VecDeque<WindowEntry>>,
    observations: HashMap<Vec<String>, SequenceObservation>,
}

impl SequenceDetector {
    pub fn new(cfg: &CoreConfig) -> Self {
        Self {
            window_ms: cfg.window_ms,
            pair_cap: cfg.seq_pair_cap,
            promote_count: cfg.seq_promote_count,
            promote_pairs: cfg.seq_promote_pairs,
            windows: HashMap::new(),
            observations: HashMap::new(),
        }
    }

    /// Feed one message. `timestamp` is arrival time; out-of-order relays
    /// are observed as they arrive, not by the sender's clock.
    pub fn offer(&mut self, sender: &str, recipient: &str, glyph: &str, timestamp: i64) {
        let key = (sender.to_string(), recipient.to_string());
        let window = self.windows.entry(key.clone()).or_default();

        window.push_back(WindowEntry {
            glyph: glyph.to_string(),
            timestamp,
        });
        let cutoff = timestamp - self.window_ms;
        while window
            .front()
            .map_or(false, |e| e.timestamp < cutoff)
        {
            window.pop_front();
        }
        while window.len() > self.pair_cap {
            window.pop_front();
        }

        // every contiguous n-gram ending at the new message
        let len = window.len();
        for n in MIN_NGRAM..=MAX_NGRAM.min(len) {
            let sequence: Vec<String> = window
                .iter()
                .skip(len - n)
                .map(|e| e.glyph.clone())
                .collect();
            let obs = self
                .observations
                .entry(sequence.clone())
                .or_insert_with(|| SequenceObservation {
                    sequence,
                    count: 0,
                    first_seen: timestamp,
                    last_seen: timestamp,
                    pairs: BTreeSet::new(),
                });
            obs.count += 1;
            obs.last_seen = timestamp;
            obs.pairs.insert(key.clone());
        }
    }

    pub fn is_promotable(&self, obs: &SequenceObservation) -> bool {
        obs.count >= self.promote_count && obs.distinct_pairs() >= self.promote_pairs
    }

    pub fn get(&self, sequence: &[String]) -> Option<&SequenceObservation> {
        self.observations.get(sequence)
    }

    /// All observations, most frequent first.
    pub fn views(&self) -> Vec<SequenceView> {
        let mut all: Vec<&SequenceObservation> = self.observations.values().collect();
        all.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.sequence.cmp(&b.sequence)));
        all.into_iter().map(|obs| self.view_of(obs)).collect()
    }

    pub fn view_of(&self, obs: &SequenceObservation) -> SequenceView {
        SequenceView {
            sequence: obs.sequence.clone(),
            count: obs.count,
            first_seen: obs.first_seen,
            last_seen: obs.last_seen,
            distinct_pairs: obs.distinct_pairs(),
            involved_agents: obs
                .involved_agents()
                .into_iter()
                .map(|s| s.to_string())
                .collect(),
            promotable: self.is_promotable(obs),
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn clear(&mut self) {
        self.windows.clear();
        self.observations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> SequenceDetector {
        SequenceDetector::new(&CoreConfig::default())
    }

    fn seq(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_bigram_and_trigram_emission() {
        let mut det = detector();
        det.offer("alice", "bob", "X05", 1000);
        det.offer("alice", "bob", "X01", 2000);
        det.offer("alice", "bob", "Q01", 3000);

        assert_eq!(det.get(&seq(&["X05", "X01"])).unwrap().count, 1);
        assert_eq!(det.get(&seq(&["X01", "Q01"])).unwrap().count, 1);
        assert_eq!(det.get(&seq(&["X05", "X01", "Q01"])).unwrap().count, 1);
        // no 1-grams, no 4-grams
        assert!(det.get(&seq(&["X05"])).is_none());
    }

    #[test]
    fn test_window_expiry_breaks_sequences() {
        let mut det = detector();
        det.offer("alice", "bob", "X05", 1000);
        // 31 s later: X05 has left the window
        det.offer("alice", "bob", "X01", 32_000);
        assert!(det.get(&seq(&["X05", "X01"])).is_none());
    }

    #[test]
    fn test_pairs_are_ordered() {
        let mut det = detector();
        det.offer("alice", "bob", "X05", 1000);
        det.offer("alice", "bob", "X01", 2000);
        det.offer("bob", "alice", "X05", 3000);
        det.offer("bob", "alice", "X01", 4000);

        let obs = det.get(&seq(&["X05", "X01"])).unwrap();
        assert_eq!(obs.count, 2);
        assert_eq!(obs.distinct_pairs(), 2);
    }

    #[test]
    fn test_promotion_thresholds() {
        let mut det = detector();
        let pairs = [("alice", "bob"), ("carol", "dave"), ("eve", "frank")];
        let mut ts = 0;
        // four rounds of X05→X01 over three pairs: count 12, pairs 3
        for round in 0..4 {
            for (a, b) in pairs {
                ts += 100;
                det.offer(a, b, "X05", ts + round);
                ts += 100;
                det.offer(a, b, "X01", ts + round);
            }
        }
        let obs = det.get(&seq(&["X05", "X01"])).unwrap();
        assert!(obs.count >= 10, "count = {}", obs.count);
        assert_eq!(obs.distinct_pairs(), 3);
        assert!(det.is_promotable(obs));

        let view = det.view_of(obs);
        assert!(view.promotable);
        assert!(view.involved_agents.contains(&"eve".to_string()));
    }

    #[test]
    fn test_below_pair_threshold_not_promotable() {
        let mut det = detector();
        let mut ts = 0;
        for _ in 0..12 {
            ts += 100;
            det.offer("alice", "bob", "X05", ts);
            ts += 100;
            det.offer("alice", "bob", "X01", ts);
        }
        let obs = det.get(&seq(&["X05", "X01"])).unwrap();
        assert!(obs.count >= 10);
        assert_eq!(obs.distinct_pairs(), 1);
        assert!(!det.is_promotable(obs));
    }

    #[test]
    fn test_per_pair_cap_is_enforced() {
        let mut cfg = CoreConfig::default();
        cfg.seq_pair_cap = 4;
        // huge horizon so only the cap evicts
        cfg.window_ms = i64::MAX / 2;
        let mut det = SequenceDetector::new(&cfg);
        for i in 0..100 {
            det.offer("alice", "bob", "Q01", i);
        }
        assert!(det.windows[&("alice".to_string(), "bob".to_string())].len() <= 4);
    }

    #[test]
    fn test_views_sorted_by_count() {
        let mut det = detector();
        det.offer("alice", "bob", "X05", 1000);
        det.offer("alice", "bob", "X01", 1100);
        det.offer("carol", "dave", "Q01", 1000);
        det.offer("carol", "dave", "Q02", 1100);
        det.offer("eve", "frank", "X05", 2000);
        det.offer("eve", "frank", "X01", 2100);

        let views = det.views();
        assert_eq!(views[0].sequence, seq(&["X05", "X01"]));
        assert_eq!(views[0].count, 2);
    }
}
