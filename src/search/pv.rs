//! Full-window ("principal variation") search. No reference source exists
//! for this half of the engine -- `search_scout.c` is the only search driver
//! that shipped with the pack, and it only ever recurses into scout nodes of
//! its own kind. A full-window sibling is still needed wherever the
//! principal variation actually has to be proven exactly rather than merely
//! refuted against a null window, so `search_pv` is authored fresh here,
//! sharing the same `evaluate_as_leaf`/`evaluate_move`/`process_score`
//! building blocks `scout_search` uses.
//!
//! Unlike `scout_search`, this node type is never fanned out across
//! `std::thread::scope`: in the reference's own young-brothers-wait scheme,
//! only scout nodes are parallelized, since a PV node only ever appears
//! along the single best line currently being proven and splitting it would
//! mean speculatively widening several children's windows at once with
//! nothing to cut off against. `evaluate_move` already implements the
//! PVS pattern for `NodeType::Pv` -- null-window probe first, full re-search
//! only if the probe beats alpha -- so this driver's own loop just needs to
//! walk every move in order and fold each result in.

use crate::board::Move;
use crate::defs::ErrFatal;

use super::defs::{score_to_tt, should_abort_check};
use super::node::{evaluate_as_leaf, evaluate_move, process_score, LeafResult, MoveEval, SearchNode};
use super::ordering::{get_sortable_move_list, sort_incremental_new};
use super::transposition::{HashFlag, TTEntry};
use super::{SearchShared, ThreadLocal};

/// Searches `node` with its full alpha-beta window, returning its score from
/// `node`'s own point of view (the caller negates it, per negamax
/// convention).
pub fn search_pv<'a>(node: &SearchNode<'a>, shared: &SearchShared, local: &mut ThreadLocal) -> i32 {
    if should_abort_check(&shared.tics, &shared.deadline, &shared.stop_rx, &shared.abort_root)
        || node.abort.is_set()
        || node.abort.parent_aborted()
    {
        return 0;
    }

    let pre_evaluation = evaluate_as_leaf(node, shared, local);
    let hash_table_move = match pre_evaluation {
        LeafResult::Settled(score) => return score,
        LeafResult::Continue { hash_table_move, .. } => hash_table_move,
    };

    let original_alpha = node.alpha();

    let (killer_a, killer_b) = shared
        .killer
        .lock()
        .expect(ErrFatal::LOCK)
        .get(node.ply as usize);

    let mut move_list = {
        let history = shared.history.lock().expect(ErrFatal::LOCK);
        get_sortable_move_list(
            &node.position,
            node.fake_color_to_move,
            hash_table_move,
            killer_a,
            killer_b,
            &history,
        )
    };
    let num_of_moves = move_list.len();

    for i in 0..num_of_moves {
        if node.abort.is_set() || node.abort.parent_aborted() {
            break;
        }

        sort_incremental_new(&mut move_list, i);
        let mv = Move::from_sortable(move_list[i]);

        if shared.config.trace_moves {
            trace_move(mv, node.ply);
        }
        shared.node_count.fetch_add(1, std::sync::atomic::Ordering::Relaxed);

        let result = evaluate_move(node, mv, killer_a, killer_b, shared, local);

        if node.abort.parent_aborted() {
            continue;
        }

        match result {
            MoveEval::Illegal | MoveEval::Ignore => continue,
            MoveEval::Evaluated { score, child_pv } => {
                if process_score(node, mv, score, child_pv, true, shared) {
                    node.abort.set();
                    break;
                }
            }
            MoveEval::GameOver { score } => {
                if process_score(node, mv, score, Vec::new(), false, shared) {
                    node.abort.set();
                    break;
                }
            }
        }
    }

    // See the matching comment in `scout_search`: the root's own abort link
    // *is* `shared.abort_root`, so `parent_aborted()` alone can't see a
    // timeout that tripped while searching one of the root's descendants.
    if shared.abort_root.is_set() || node.abort.parent_aborted() {
        return 0;
    }

    if !node.quiescence() && shared.config.enable_tables {
        update_best_move_history(node, shared);
    }

    let best_score = node.best_score();
    let flag = if best_score >= node.beta {
        HashFlag::Lower
    } else if best_score <= original_alpha {
        HashFlag::Upper
    } else {
        HashFlag::Exact
    };
    local.tt_batch.push(
        &shared.tt,
        TTEntry {
            key: node.position.key,
            depth: node.depth,
            score: score_to_tt(best_score, node.ply),
            flag,
            best_move: node.best_move(),
        },
    );

    best_score
}

fn trace_move(mv: Move, ply: i32) {
    print!("info");
    for _ in 0..ply {
        print!(" ----");
    }
    println!(" {}", crate::board::move_to_str(mv));
}

/// Rewards the move that ended up best at this node and penalizes every
/// other move actually tried here, so the history table keeps favoring
/// buckets that keep winning and drifts away from ones that keep losing.
fn update_best_move_history(node: &SearchNode, shared: &SearchShared) {
    let best = node.best_move();
    let tried = node.tried_moves();
    if tried.is_empty() {
        return;
    }
    let mut history = shared.history.lock().expect(ErrFatal::LOCK);
    for mv in tried {
        let from_piece = node.position.board[mv.from_sq() as usize];
        let ori = from_piece.rotated(mv.rotation() as u8).ori();
        if Some(mv) == best {
            history.update(node.fake_color_to_move, mv.ptype(), mv.to_sq(), ori, node.depth);
        } else {
            history.penalize(node.fake_color_to_move, mv.ptype(), mv.to_sq(), ori, node.depth);
        }
    }
}
