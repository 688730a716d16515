//! Parallel null-window ("scout") search. Grounded on `search_scout.c`'s
//! `scout_search`: a serial prefix of up to `YOUNG_BROTHERS_WAIT` moves,
//! followed by a parallel fan-out over whatever's left once no cutoff has
//! been found. The reference parallelizes the tail with `cilk_for`; this
//! crate has no Cilk runtime, so the same "spawn one task per remaining
//! move, join them all" shape is built on `std::thread::scope`, the same
//! primitive `board::perft::perft_parallel` already uses for its own
//! embarrassingly-parallel fan-out.
//!
//! Every move's search result is folded into `node` through
//! `process_score`, which locks `node`'s own `Mutex<NodeAgg>` -- so each
//! spawned task only ever needs a shared `&SearchNode`, never an exclusive
//! one, and several tasks can be in flight against the same node at once.

use crate::board::Move;
use crate::defs::ErrFatal;

use super::defs::{score_to_tt, should_abort_check, YOUNG_BROTHERS_WAIT};
use super::node::{evaluate_as_leaf, evaluate_move, process_score, LeafResult, MoveEval, SearchNode};
use super::ordering::{get_sortable_move_list, sort_incremental, sort_incremental_new};
use super::transposition::{HashFlag, TTEntry};
use super::{SearchShared, ThreadLocal};

/// Searches `node` with a one-point null window, returning its score from
/// `node`'s own point of view (the caller negates it, per negamax
/// convention). Mirrors `scout_search` move for move.
pub fn scout_search<'a>(node: &SearchNode<'a>, shared: &SearchShared, local: &mut ThreadLocal) -> i32 {
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

    let mut number_of_moves_evaluated = 0usize;

    // Serial prefix: searched one move at a time so a fast cutoff doesn't
    // pay for spinning up threads for moves that never get looked at.
    for _ in 0..num_of_moves {
        if node.legal_move_count() > YOUNG_BROTHERS_WAIT {
            break;
        }

        sort_incremental_new(&mut move_list, number_of_moves_evaluated);
        let local_index = number_of_moves_evaluated;
        number_of_moves_evaluated += 1;
        let mv = Move::from_sortable(move_list[local_index]);

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

    if node.abort.parent_aborted() {
        return 0;
    }

    if !node.abort.is_set() {
        let start_value = number_of_moves_evaluated;
        sort_incremental(&mut move_list, number_of_moves_evaluated);
        let move_list_ref = &move_list;

        std::thread::scope(|scope| {
            let handles: Vec<_> = (start_value..num_of_moves)
                .map(|local_index| {
                    let mv = Move::from_sortable(move_list_ref[local_index]);
                    scope.spawn(move || {
                        if node.abort.is_set() || node.abort.parent_aborted() {
                            return;
                        }

                        if shared.config.trace_moves {
                            trace_move(mv, node.ply);
                        }
                        shared.node_count.fetch_add(1, std::sync::atomic::Ordering::Relaxed);

                        let mut worker_local = ThreadLocal::default();
                        let result = evaluate_move(node, mv, killer_a, killer_b, shared, &mut worker_local);
                        worker_local.flush(&shared.tt);

                        if node.abort.parent_aborted() {
                            return;
                        }

                        match result {
                            MoveEval::Illegal | MoveEval::Ignore => {}
                            MoveEval::Evaluated { score, child_pv } => {
                                if process_score(node, mv, score, child_pv, true, shared) {
                                    node.abort.set();
                                }
                            }
                            MoveEval::GameOver { score } => {
                                if process_score(node, mv, score, Vec::new(), false, shared) {
                                    node.abort.set();
                                }
                            }
                        }
                    })
                })
                .collect();
            for handle in handles {
                let _ = handle.join();
            }
        });
    }

    // `node.abort.parent_aborted()` alone misses the root: its own abort
    // link *is* `shared.abort_root`, so a timeout tripped while searching
    // one of its descendants sets that flag directly rather than an
    // ancestor's, and `parent_aborted()` never looks at the node's own
    // flag. Checking `abort_root` here too closes that gap for every node.
    if shared.abort_root.is_set() || node.abort.parent_aborted() {
        return 0;
    }

    if !node.quiescence() && shared.config.enable_tables {
        update_best_move_history(node, shared);
    }

    let best_score = node.best_score();
    local.tt_batch.push(
        &shared.tt,
        TTEntry {
            key: node.position.key,
            depth: node.depth,
            score: score_to_tt(best_score, node.ply),
            flag: if best_score >= node.beta {
                HashFlag::Lower
            } else {
                HashFlag::Upper
            },
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
