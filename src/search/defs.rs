//! Search-wide constants, tunables and small shared types. Kept as one dense
//! file the way the teacher keeps `search/defs.rs` as the central
//! configuration point for its own alpha-beta search, repopulated here with
//! Leiserchess tunables instead of chess time-control constants.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::board::defs::NUM_ORI;
use crate::board::{Color, KingOri, Move, PType};
use crate::defs::{ARR_SIZE, MAX_PLY_IN_SEARCH};

// =======================================================================
// CORE SEARCH CONSTANTS
// =======================================================================

/// Score magnitude used for "no bound yet" / alpha-beta window edges. Chosen
/// well above any realistic evaluation or WIN score so it never collides.
pub const INF: i32 = 1_000_000;

/// Score awarded (before the ply adjustment) for zapping the enemy King.
pub const WIN: i32 = 100_000;

/// Score for a detected repetition draw, before the parity flip that
/// penalizes or rewards it depending on who is ahead.
pub const DRAW: i32 = 0;

/// Fan out to parallel search once this many legal moves have already been
/// searched serially at a node. Mirrors the reference's
/// `YOUNG_BROTHERS_WAIT`.
pub const YOUNG_BROTHERS_WAIT: u32 = 5;

/// Any score this close to `WIN` is a mate score, not a material/positional
/// one -- `game_over_score` never moves a score by more than
/// `MAX_PLY_IN_SEARCH` away from `WIN`, and the evaluator's own range sits
/// nowhere near this magnitude.
const MATE_THRESHOLD: i32 = WIN - MAX_PLY_IN_SEARCH as i32;

/// Converts a score about to be written to the transposition table into its
/// ply-independent form: a mate score is stored as "distance to mate from
/// the position itself", not "distance to mate from the search root", since
/// the same position can be reached again at a different ply. Non-mate
/// scores pass through unchanged.
pub fn score_to_tt(score: i32, ply: i32) -> i32 {
    if score > MATE_THRESHOLD {
        score + ply
    } else if score < -MATE_THRESHOLD {
        score - ply
    } else {
        score
    }
}

/// The inverse of `score_to_tt`: re-bases a ply-independent mate score read
/// back out of the transposition table to the ply of the node that probed
/// it. Non-mate scores pass through unchanged.
pub fn score_from_tt(score: i32, ply: i32) -> i32 {
    if score > MATE_THRESHOLD {
        score - ply
    } else if score < -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

/// Number of killer moves tracked per ply.
pub const NUM_KILLERS: usize = 2;

/// Bitmask gating how often `should_abort_check` actually looks at the
/// clock; checked every `tics & ABORT_CHECK_PERIOD == 0`.
pub const ABORT_CHECK_PERIOD: u64 = 0xFFF;

/// Margin table indexed by remaining depth, used by futility pruning in
/// `evaluate_as_leaf`. Values are multiples of a tunable `pawn_value`
/// rather than hardcoded, since the reference scales its own table by the
/// same `PAWN_VALUE`.
pub fn futility_margin(cfg: &SearchConfig, depth: i32) -> i32 {
    const SHAPE: [i32; 10] = [0, 1, 2, 5, 9, 14, 20, 30, 40, 60];
    let idx = depth.clamp(0, 9) as usize;
    (SHAPE[idx] * cfg.pawn_value) / 2
}

// =======================================================================
// SEARCH NODE TYPE
// =======================================================================

/// Which of the two recursive search routines a node belongs to: a
/// null-window "scout" probe, or a full-window principal-variation search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Scout,
    Pv,
}

// =======================================================================
// TUNABLE EVALUATION / SEARCH CONFIGURATION
// =======================================================================

/// Every tunable the reference engine exposed as a global, mutable variable
/// (set from outside at startup) is threaded explicitly here instead, so a
/// search never reaches for ambient global state. Default values are this
/// crate's own choice where the retrieved source set them from outside the
/// files in this pack; see `DESIGN.md` for the reasoning behind each one.
#[derive(Debug, Clone, Copy)]
pub struct SearchConfig {
    /// Base value of a Pawn, in evaluation-score units (pre-`EV_SCORE_RATIO`
    /// scaling).
    pub pawn_value: i32,
    /// `EV_SCORE_RATIO`: the fixed-point scale the static evaluator computes
    /// in, divided out again before a score leaves `eval`.
    pub ev_score_ratio: i32,
    /// Bonus weight for how close a color's laser comes to the enemy King.
    pub hattack: i32,
    /// Bonus for a Pawn sitting inside the bounding box the two Kings form.
    pub pbetween: i32,
    /// Bonus weight for a Pawn's nearness to the board center.
    pub pcentral: i32,
    /// Bonus weight for a King facing toward its opponent.
    pub kface: i32,
    /// Bonus weight for a King commanding more of the board behind it.
    pub kaggressive: i32,
    /// Bonus weight for safe squares around a King.
    pub mobility: i32,
    /// Bonus weight per enemy Pawn pinned by a King's laser.
    pub pawnpin: i32,
    /// Half-width of the uniform noise band added to `eval`'s final score;
    /// 0 disables randomization entirely.
    pub randomize: i32,
    /// Stand-pat bonus added on top of `eval` before quiescence/futility
    /// decisions in `evaluate_as_leaf` (the reference's `HMB`).
    pub hmb: i32,
    /// Respect the Ko rule (reject a move that exactly restores the
    /// position before the opponent's last move).
    pub use_ko: bool,
    /// Detect and score repetition draws.
    pub detect_draws: bool,
    /// Margin-based forward pruning ("null move margin") at shallow depth
    /// in `evaluate_as_leaf`.
    pub use_nmm: bool,
    /// Enable killer-move and history-table move ordering.
    pub enable_tables: bool,
    /// Deepest remaining depth at which futility pruning still applies.
    pub fut_depth: i32,
    /// Legal-move-count threshold (inclusive) at which LMR starts reducing.
    pub lmr_r1: u32,
    /// Legal-move-count threshold (inclusive) at which LMR reduces by 2
    /// plies instead of 1.
    pub lmr_r2: u32,
    /// Print each move considered, indented by ply, to stdout.
    pub trace_moves: bool,
}

impl SearchConfig {
    pub fn pawn_ev_value(&self) -> i32 {
        self.pawn_value * self.ev_score_ratio
    }
}

impl Default for SearchConfig {
    fn default() -> SearchConfig {
        SearchConfig {
            pawn_value: 1,
            ev_score_ratio: 100,
            hattack: 1,
            pbetween: 1,
            pcentral: 1,
            kface: 1,
            kaggressive: 1,
            mobility: 1,
            pawnpin: 1,
            randomize: 0,
            hmb: 0,
            use_ko: true,
            detect_draws: true,
            use_nmm: true,
            enable_tables: true,
            fut_depth: 3,
            lmr_r1: 4,
            lmr_r2: 8,
            trace_moves: false,
        }
    }
}

/// `ori_of(king_piece)` decoded into the four cardinal cases `kface` branches
/// on, matching the reference's `switch` over `NN`/`EE`/`SS`/`WW`.
pub fn king_ori(ori: u8) -> KingOri {
    match ori & 3 {
        0 => KingOri::N,
        1 => KingOri::E,
        2 => KingOri::S,
        _ => KingOri::W,
    }
}

// =======================================================================
// KILLER MOVES
// =======================================================================

/// Two killer-move slots per ply: quiet moves that caused a beta cutoff
/// elsewhere at the same ply, tried early since they're likely to cut off
/// again in a sibling position.
pub struct KillerTable {
    slots: Vec<[Option<Move>; NUM_KILLERS]>,
}

impl KillerTable {
    pub fn new() -> KillerTable {
        KillerTable {
            slots: vec![[None; NUM_KILLERS]; MAX_PLY_IN_SEARCH],
        }
    }

    pub fn get(&self, ply: usize) -> (Option<Move>, Option<Move>) {
        let row = &self.slots[ply.min(MAX_PLY_IN_SEARCH - 1)];
        (row[0], row[1])
    }

    /// Promotes `mv` into slot 0 at `ply`, bumping the previous slot-0
    /// occupant down to slot 1 -- unless `mv` already is slot 0.
    pub fn record(&mut self, ply: usize, mv: Move) {
        let row = &mut self.slots[ply.min(MAX_PLY_IN_SEARCH - 1)];
        if row[0] != Some(mv) {
            row[1] = row[0];
            row[0] = Some(mv);
        }
    }
}

impl Default for KillerTable {
    fn default() -> KillerTable {
        KillerTable::new()
    }
}

// =======================================================================
// HISTORY HEURISTIC
// =======================================================================

/// `best_move_history[BMH(color, ptype, to_square, resulting_orientation)]`:
/// a sort-key-sized score per (mover color, piece type, destination square,
/// orientation the piece ends up facing), incremented whenever a move from
/// that bucket turns out to be the best move found at a node.
pub struct HistoryTable {
    scores: Vec<u32>,
}

const BMH_PTYPES: usize = 4; // indexed by PType as u8 (Empty/Pawn/King/Invalid)

impl HistoryTable {
    pub fn new() -> HistoryTable {
        HistoryTable {
            scores: vec![0u32; 2 * BMH_PTYPES * ARR_SIZE * NUM_ORI as usize],
        }
    }

    fn index(color: Color, ptype: PType, to_sq: u8, ori: u8) -> usize {
        let c = color.as_index();
        let p = ptype as usize;
        let t = to_sq as usize;
        let o = (ori & (NUM_ORI - 1)) as usize;
        ((c * BMH_PTYPES + p) * ARR_SIZE + t) * NUM_ORI as usize + o
    }

    pub fn get(&self, color: Color, ptype: PType, to_sq: u8, ori: u8) -> u32 {
        self.scores[Self::index(color, ptype, to_sq, ori)]
    }

    /// Bumps the bucket a winning move falls into, weighted by the depth it
    /// won at so deeper confirmations count for more.
    pub fn update(&mut self, color: Color, ptype: PType, to_sq: u8, ori: u8, depth: i32) {
        let idx = Self::index(color, ptype, to_sq, ori);
        self.scores[idx] = self.scores[idx].saturating_add((depth * depth).max(1) as u32);
    }

    /// Decays the bucket a move falls into when it was tried but did not end
    /// up best, so buckets that keep losing drift back down over time.
    pub fn penalize(&mut self, color: Color, ptype: PType, to_sq: u8, ori: u8, depth: i32) {
        let idx = Self::index(color, ptype, to_sq, ori);
        self.scores[idx] = self.scores[idx].saturating_sub(depth.max(1) as u32);
    }
}

impl Default for HistoryTable {
    fn default() -> HistoryTable {
        HistoryTable::new()
    }
}

// =======================================================================
// COOPERATIVE ABORT
// =======================================================================

/// One link in a chain of ancestor search nodes, each carrying its own
/// cut-off flag. The reference walks a raw `searchNode* parent` pointer
/// chain checking `pred->abort`; a borrowed stack of `SearchNode`s can't be
/// walked that way once nodes are handed off to other threads during the
/// young-brothers-wait fan-out, so the chain is instead an `Arc` linked list
/// that survives being cloned into a spawned thread.
pub struct AbortNode {
    flag: AtomicBool,
    parent: Option<AbortChain>,
}

/// Shared handle to a node's own abort link, reference-counted so a
/// parallel child can hold on to its whole ancestor chain independently of
/// the stack frame that spawned it.
pub type AbortChain = Arc<AbortNode>;

impl AbortNode {
    /// A fresh chain with no ancestors, for the search root.
    pub fn root() -> AbortChain {
        Arc::new(AbortNode {
            flag: AtomicBool::new(false),
            parent: None,
        })
    }

    /// A new link for a child node, chained onto `parent`.
    pub fn child(parent: &AbortChain) -> AbortChain {
        Arc::new(AbortNode {
            flag: AtomicBool::new(false),
            parent: Some(Arc::clone(parent)),
        })
    }

    /// Marks this node itself as cut off -- the reference's `node->abort =
    /// true`, set once a beta cutoff or a time abort has been found.
    pub fn set(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// The reference's `parallel_parent_aborted`: true if any ancestor (not
    /// this node itself) has been cut off, meaning whatever this node is
    /// still computing is moot and its result can be thrown away.
    pub fn parent_aborted(&self) -> bool {
        let mut cur = self.parent.as_ref();
        while let Some(p) = cur {
            if p.is_set() {
                return true;
            }
            cur = p.parent.as_ref();
        }
        false
    }
}

/// Wall-clock budget for a single search call. `expired` is polled from
/// `should_abort_check` rather than driving a timer thread, matching the
/// reference's `should_abort_check`/`milliseconds() >= timeout` poll.
#[derive(Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn in_millis(millis: u64) -> Deadline {
        Deadline {
            at: Instant::now() + Duration::from_millis(millis),
        }
    }

    /// A deadline that never expires, for tests and fixed-depth searches
    /// that aren't time-bounded.
    pub fn never() -> Deadline {
        Deadline {
            at: Instant::now() + Duration::from_secs(3600 * 24 * 365),
        }
    }

    pub fn expired(&self) -> bool {
        Instant::now() >= self.at
    }
}

/// Message an external caller can send while a search is in flight. Mirrors
/// the teacher's `SearchControl`, narrowed to the one control a cooperative
/// search actually reacts to mid-flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchControl {
    Stop,
}

/// What a finished top-level search hands back to its caller. Mirrors the
/// shape of the teacher's `SearchReport::Finished` variant, narrowed to this
/// crate's single fixed-depth search (no iterative-deepening summaries).
#[derive(Debug, Clone, Copy)]
pub struct SearchReport {
    pub best_move: Option<Move>,
    pub score: i32,
    pub node_count: u64,
    /// Set if the deadline or an external stop request tripped before the
    /// search finished exploring this depth. Per the cooperative-abort
    /// contract, a caller must discard `score`/`best_move` in that case and
    /// fall back to the last depth that completed without aborting.
    pub aborted: bool,
}

/// Bumps the shared tic counter and, every `ABORT_CHECK_PERIOD` tics, checks
/// the deadline and the external stop channel. Mirrors `should_abort_check`
/// exactly, including the bitmask-gated polling frequency; sets `abort_root`
/// and returns `true` the first time either condition trips.
pub fn should_abort_check(
    tics: &AtomicU64,
    deadline: &Deadline,
    stop_rx: &crossbeam_channel::Receiver<SearchControl>,
    abort_root: &AbortChain,
) -> bool {
    let t = tics.fetch_add(1, Ordering::Relaxed) + 1;
    if t & ABORT_CHECK_PERIOD == 0 {
        if deadline.expired() || stop_rx.try_recv().is_ok() {
            abort_root.set();
            return true;
        }
    }
    false
}
