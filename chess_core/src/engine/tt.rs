use crate::logic::position::Move;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TTFlag {
    Exact,
    LowerBound, // Beta cutoff (fail-high)
    UpperBound, // Alpha cutoff (fail-low)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TTEntry {
    pub score: i32,
    pub depth: u8,
    pub flag: TTFlag,
    pub best_move: Option<Move>,
}

/// Bounded cache of searched positions keyed by their serialization.
///
/// When full, an arbitrary resident entry is evicted to make room. There is
/// no recency tracking, so a hot entry can be thrown out as easily as a cold
/// one.
pub struct TranspositionTable {
    entries: HashMap<String, TTEntry>,
    capacity: usize,
}

impl TranspositionTable {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity.min(1 << 16)),
            capacity,
        }
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn probe(&self, key: &str) -> Option<&TTEntry> {
        self.entries.get(key)
    }

    /// Score for `key` if it was searched at least `min_depth` deep and its
    /// bound settles the `[alpha, beta]` window.
    pub fn lookup(&self, key: &str, min_depth: u8, alpha: i32, beta: i32) -> Option<i32> {
        let entry = self.probe(key)?;
        if entry.depth < min_depth {
            return None;
        }
        match entry.flag {
            TTFlag::Exact => Some(entry.score),
            TTFlag::LowerBound if entry.score >= beta => Some(entry.score),
            TTFlag::UpperBound if entry.score <= alpha => Some(entry.score),
            _ => None,
        }
    }

    pub fn get_move(&self, key: &str) -> Option<Move> {
        self.probe(key).and_then(|e| e.best_move)
    }

    pub fn store(
        &mut self,
        key: String,
        score: i32,
        depth: u8,
        flag: TTFlag,
        best_move: Option<Move>,
    ) {
        let entry = TTEntry {
            score,
            depth,
            flag,
            best_move,
        };

        if let Some(existing) = self.entries.get_mut(&key) {
            // Replacement scheme: keep the deeper search
            if depth >= existing.depth {
                *existing = entry;
            }
            return;
        }

        if self.entries.len() >= self.capacity {
            if let Some(victim) = self.entries.keys().next().cloned() {
                self.entries.remove(&victim);
            }
        }
        self.entries.insert(key, entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
