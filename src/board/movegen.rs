//! Legal move generation. Grounded on the reference `generate_all` (not the
//! older full-board-scan `old_generate_all`): build the enemy laser's pin map
//! first, then walk `plocs`/`kloc` directly instead of scanning all 256
//! squares.

use super::defs::{Color, PType, Rotation};
use super::geometry::{dir_of, step, Square};
use super::laser::mark_laser_path;
use super::mv::Move;
use super::piece::Piece;
use super::position::Position;
use crate::defs::{ARR_SIZE, MAX_NUM_MOVES};

const ROTATIONS: [Rotation; 3] = [Rotation::Right, Rotation::UTurn, Rotation::Left];

/// Every legal move for `position.color_to_move()`, packed as sortable words
/// (move in the low bits, sort key left zero for the caller to fill in).
pub fn generate_all(position: &Position) -> Vec<u64> {
    let mut moves = Vec::with_capacity(MAX_NUM_MOVES);
    let color = position.color_to_move();
    let enemy_king_sq = position.kloc[color.opp().as_index()];

    // A pawn under the enemy king's laser is pinned in place: it cannot
    // translate or rotate at all, and is simply skipped below.
    let mut laser_map = [0u8; ARR_SIZE];
    mark_laser_path(&position.board, enemy_king_sq, &mut laser_map, 1);

    for &loc in position.plocs[color.as_index()].iter() {
        if loc == 0 || laser_map[loc as usize] == 1 {
            continue;
        }
        for d in 0..8 {
            let dest = step(loc, dir_of(d));
            let occupant = position.board[dest as usize];
            if is_legal_pawn_destination(occupant, color) {
                moves.push(Move::new(PType::Pawn, Rotation::None, loc, dest).to_sortable());
            }
        }
        for &rot in ROTATIONS.iter() {
            moves.push(Move::new(PType::Pawn, rot, loc, loc).to_sortable());
        }
    }

    let king_sq = position.kloc[color.as_index()];
    for d in 0..8 {
        let dest = step(king_sq, dir_of(d));
        if position.board[dest as usize].ptype() == PType::Empty {
            moves.push(Move::new(PType::King, Rotation::None, king_sq, dest).to_sortable());
        }
    }
    for &rot in ROTATIONS.iter() {
        moves.push(Move::new(PType::King, rot, king_sq, king_sq).to_sortable());
    }
    // The null move: always legal, appended last regardless of pin state.
    moves.push(Move::new(PType::King, Rotation::None, king_sq, king_sq).to_sortable());

    moves
}

fn is_legal_pawn_destination(occupant: Piece, mover_color: Color) -> bool {
    match occupant.ptype() {
        PType::Invalid | PType::King => false,
        PType::Pawn => occupant.color() != mover_color, // stomping an enemy pawn is legal
        PType::Empty => true,
    }
}
