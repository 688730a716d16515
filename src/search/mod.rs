//! Search: move ordering, the transposition/killer/history tables, and the
//! two recursive search drivers (`scout_search`/`search_pv`) that together
//! implement young-brothers-wait parallel search. `SearchShared` bundles
//! everything every node in a search needs read access to; `ThreadLocal` is
//! the per-worker state a parallel fan-out gives each spawned task its own
//! copy of. Mirrors the shape of the teacher's own `SearchRefs`/
//! `ThreadLocalData` split in `search::defs`, with the mutable board/ply
//! tracking the teacher keeps on `SearchRefs` replaced by the borrowed,
//! per-node `Position` this engine threads through instead.

pub mod defs;
pub mod node;
pub mod ordering;
pub mod pv;
pub mod scout;
pub mod transposition;

use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex, RwLock};

use crate::board::zobrist::ZobristTable;
use crate::board::Position;

pub use defs::{
    futility_margin, king_ori, AbortChain, AbortNode, Deadline, HistoryTable, KillerTable,
    NodeType, SearchConfig, SearchControl, SearchReport, DRAW, INF, NUM_KILLERS, WIN,
    YOUNG_BROTHERS_WAIT,
};
pub use node::SearchNode;
pub use pv::search_pv;
pub use scout::scout_search;
pub use transposition::{HashFlag, LocalTTCache, TTBatch, TTEntry, TT};

/// Everything a search node needs read access to but does not own itself:
/// the shared transposition table, the killer and history tables (each
/// behind its own mutex, since every node at a given ply reads and writes
/// the same rows), the tunable configuration, and the cooperative-abort /
/// node-count / time-budget machinery threaded through every recursive call.
pub struct SearchShared<'z> {
    pub zob: &'z ZobristTable,
    pub tt: Arc<RwLock<TT>>,
    pub killer: Arc<Mutex<KillerTable>>,
    pub history: Arc<Mutex<HistoryTable>>,
    pub config: SearchConfig,
    pub node_count: Arc<AtomicU64>,
    pub tics: Arc<AtomicU64>,
    pub deadline: Deadline,
    pub stop_rx: crossbeam_channel::Receiver<SearchControl>,
    pub abort_root: AbortChain,
}

/// Per-worker state: a small cache of recently seen transposition-table
/// entries and a batch of pending writes, both private to whichever thread
/// owns this `ThreadLocal` so a young-brothers-wait fan-out doesn't have
/// every parallel worker contending for the same lock on every node.
#[derive(Default)]
pub struct ThreadLocal {
    pub tt_cache: LocalTTCache,
    pub tt_batch: TTBatch,
}

impl ThreadLocal {
    /// Flushes any batched transposition-table writes to the shared table.
    /// Called once a parallel worker's move has been fully evaluated, so a
    /// write never outlives the thread that produced it.
    pub fn flush(&mut self, tt: &Arc<RwLock<TT>>) {
        self.tt_batch.flush(tt);
    }
}

/// Runs a single fixed-depth search from `position` and reports the best
/// move, its score, and the total node count. The only top-level entry
/// point this module provides; an external driver (iterative deepening,
/// time management, a UCI-like protocol loop) is expected to call this once
/// per depth it wants to search, supplying its own deadline and stop
/// channel -- none of that orchestration is this module's concern.
pub fn search<'a>(
    position: Position<'a>,
    depth: i32,
    shared: &SearchShared,
) -> SearchReport {
    let mut local = ThreadLocal::default();
    let abort_root = Arc::clone(&shared.abort_root);
    let root = SearchNode::root(position, depth, -INF, INF, abort_root);
    let score = search_pv(&root, shared, &mut local);
    local.tt_batch.flush(&shared.tt);

    SearchReport {
        best_move: root.best_move(),
        score,
        node_count: shared.node_count.load(std::sync::atomic::Ordering::Relaxed),
        aborted: shared.abort_root.is_set(),
    }
}
