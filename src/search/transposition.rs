//! Transposition table. No reference implementation for this file exists in
//! the retrieved pack (`tt_hashtable_get`/`update_transposition_table` are
//! called from `search_common.c`/`search_scout.c` but defined elsewhere), so
//! this is authored fresh in the teacher's own idiom: a shared table behind
//! `Arc<RwLock<_>>`, with each search thread keeping a small local cache and
//! batching writes to cut down on write-lock contention, mirroring
//! `engine::transposition::{TT, LocalTTCache}` and
//! `search::defs::{TTBatch, ThreadLocalData}`.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::board::Move;
use crate::defs::ErrFatal;

/// What kind of bound a stored score represents, relative to the window the
/// node was searched with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashFlag {
    /// The score is exact: the search completed inside `(alpha, beta)`.
    Exact,
    /// The score is a lower bound: the search failed high (`score >= beta`).
    Lower,
    /// The score is an upper bound: the search failed low (`score <= alpha`).
    Upper,
}

#[derive(Debug, Clone, Copy)]
pub struct TTEntry {
    pub key: u64,
    pub depth: i32,
    pub score: i32,
    pub flag: HashFlag,
    pub best_move: Option<Move>,
}

/// A score is usable to resolve a scout (null-window) probe outright when it
/// was searched to at least the requested depth and its bound still settles
/// the question against `beta`.
pub fn tt_is_usable(entry: &TTEntry, depth: i32, beta: i32) -> bool {
    if entry.depth < depth {
        return false;
    }
    match entry.flag {
        HashFlag::Exact => true,
        HashFlag::Lower => entry.score >= beta,
        HashFlag::Upper => entry.score < beta,
    }
}

/// Fixed-size, always-replace transposition table indexed by the low bits of
/// the Zobrist key. Collisions simply overwrite; a mismatched key on probe is
/// treated as a miss.
pub struct TT {
    slots: Vec<Option<TTEntry>>,
    mask: usize,
}

impl TT {
    /// `slots` is rounded down to the nearest power of two so indexing can
    /// use a mask instead of a modulo.
    pub fn new(slots: usize) -> TT {
        let capacity = slots.next_power_of_two().max(1);
        TT {
            slots: vec![None; capacity],
            mask: capacity - 1,
        }
    }

    fn index(&self, key: u64) -> usize {
        (key as usize) & self.mask
    }

    pub fn probe(&self, key: u64) -> Option<TTEntry> {
        match self.slots[self.index(key)] {
            Some(entry) if entry.key == key => Some(entry),
            _ => None,
        }
    }

    /// Always-replace: a fresh entry evicts whatever occupied its slot. Deep
    /// searches revisit hot positions often enough that this out-performs a
    /// depth-preferred scheme for the node counts this engine runs at.
    pub fn store(&mut self, entry: TTEntry) {
        let idx = self.index(entry.key);
        self.slots[idx] = Some(entry);
    }
}

/// Per-thread cache of recently seen entries, consulted before the shared
/// table's read lock.
pub struct LocalTTCache {
    cache: HashMap<u64, TTEntry>,
    capacity: usize,
}

impl LocalTTCache {
    pub fn new(capacity: usize) -> LocalTTCache {
        LocalTTCache {
            cache: HashMap::with_capacity(capacity),
            capacity,
        }
    }

    pub fn get(&self, key: u64) -> Option<TTEntry> {
        self.cache.get(&key).copied()
    }

    pub fn insert(&mut self, entry: TTEntry) {
        if self.cache.len() >= self.capacity {
            self.cache.clear();
        }
        self.cache.insert(entry.key, entry);
    }
}

impl Default for LocalTTCache {
    fn default() -> LocalTTCache {
        LocalTTCache::new(4096)
    }
}

const TT_BATCH_SIZE: usize = 32;

/// Accumulates entries destined for the shared table and flushes them in one
/// write-lock acquisition, instead of taking the lock once per node.
pub struct TTBatch {
    pending: Vec<TTEntry>,
}

impl TTBatch {
    pub fn new() -> TTBatch {
        TTBatch {
            pending: Vec::with_capacity(TT_BATCH_SIZE),
        }
    }

    pub fn is_full(&self) -> bool {
        self.pending.len() >= TT_BATCH_SIZE
    }

    /// Queues `entry`, flushing to `tt` first if the batch was already full.
    pub fn push(&mut self, tt: &Arc<RwLock<TT>>, entry: TTEntry) {
        if self.is_full() {
            self.flush(tt);
        }
        self.pending.push(entry);
    }

    pub fn flush(&mut self, tt: &Arc<RwLock<TT>>) {
        if self.pending.is_empty() {
            return;
        }
        let mut table = tt.write().expect(ErrFatal::LOCK);
        for entry in self.pending.drain(..) {
            table.store(entry);
        }
    }
}

impl Default for TTBatch {
    fn default() -> TTBatch {
        TTBatch::new()
    }
}

/// Reads the local cache, falling back to a shared-table probe (which is
/// mirrored back into the local cache on a hit, the same way the reference's
/// `ThreadLocalData` keeps its `local_tt_cache` warm).
pub fn probe(local: &mut LocalTTCache, tt: &Arc<RwLock<TT>>, key: u64) -> Option<TTEntry> {
    if let Some(entry) = local.get(key) {
        return Some(entry);
    }
    let entry = tt.read().expect(ErrFatal::LOCK).probe(key)?;
    local.insert(entry);
    Some(entry)
}
