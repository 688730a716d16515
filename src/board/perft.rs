//! Move-count-only search used to validate the move generator and make-move
//! logic against known node counts. Grounded on the reference
//! `perft_search`/`do_perft`: it bypasses the Ko check entirely and inlines
//! its own stomp/zap bookkeeping rather than calling the full `make_move`.

use super::defs::PType;
use super::laser::fire;
use super::movegen::generate_all;
use super::mv::Move;
use super::piece::Piece;
use super::position::Position;
use super::zobrist::ZobristTable;

/// Counts leaf positions at `depth` plies from `position`. Depth 0 is a
/// single leaf; depth 1 returns the move count directly without descending
/// into any of them (mirroring the reference's early-return at depth 1).
pub fn perft(position: &Position, zob: &ZobristTable, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = generate_all(position);
    if depth == 1 {
        return moves.len() as u64;
    }

    let mut count = 0u64;
    for word in moves {
        let mv = Move::from_sortable(word);
        count += perft_one_move(position, zob, mv, depth);
    }
    count
}

fn perft_one_move(position: &Position, zob: &ZobristTable, mv: Move, depth: u32) -> u64 {
    let (mut next, stomped_sq) =
        super::makemove::low_level_make_move(position, zob, mv);

    if stomped_sq != 0 {
        remove_piece(&mut next, zob, stomped_sq);
    }

    // The shooter is whoever just moved, the opposite of whoever moves next.
    let shooter = next.color_to_move().opp();
    let shooter_king_sq = next.kloc[shooter.as_index()];
    if let Some(zapped_sq) = fire(&next.board, shooter_king_sq) {
        let zapped_ptype = next.board[zapped_sq as usize].ptype();
        remove_piece(&mut next, zob, zapped_sq);
        if zapped_ptype == PType::King {
            // A King zap ends the game right here; perft does not descend
            // further, matching the reference's early return at this leaf.
            return 1;
        }
    }

    perft(&next, zob, depth - 1)
}

fn remove_piece(p: &mut Position, zob: &ZobristTable, sq: super::geometry::Square) {
    let piece = p.board[sq as usize];
    let color = piece.color();
    p.key ^= zob.piece_key(sq as usize, piece);
    p.board[sq as usize] = Piece::EMPTY;
    p.key ^= zob.piece_key(sq as usize, Piece::EMPTY);
    for slot in p.plocs[color.as_index()].iter_mut() {
        if *slot == sq {
            *slot = 0;
        }
    }
}

/// Same count, computed by fanning each root move out to its own thread.
/// Used to test that move-count results don't depend on how much parallelism
/// the caller throws at the search.
pub fn perft_parallel(position: &Position, zob: &ZobristTable, depth: u32) -> u64 {
    if depth <= 1 {
        return perft(position, zob, depth);
    }
    let moves = generate_all(position);
    std::thread::scope(|scope| {
        let handles: Vec<_> = moves
            .into_iter()
            .map(|word| {
                scope.spawn(move || {
                    let mv = Move::from_sortable(word);
                    perft_one_move(position, zob, mv, depth)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).sum()
    })
}
