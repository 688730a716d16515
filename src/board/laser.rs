//! The laser engine. The reference implementation has three near-identical
//! traversals (mark-only for pin maps, heuristic-accumulating for the
//! evaluator, kill for make-move); here they share one `fire_laser` walk and
//! differ only in what a per-square callback does with what it sees, which is
//! the natural Rust-native unification of "same physics, different visitor".

use super::defs::{Color, PType};
use super::geometry::{beam_of, dir_of, fil_of, reflect_of, rnk_of, step, Square};
use super::piece::Piece;
use crate::defs::ARR_SIZE;

/// Walks the laser from `king_sq` (which must hold a King) until it is
/// absorbed by a Pawn's back, hits a King, or runs off the board. Calls
/// `on_square` for every square entered, including the starting King square.
/// Returns the square the beam stopped on and the piece type found there.
pub fn fire_laser<F: FnMut(Square, Piece)>(
    board: &[Piece; ARR_SIZE],
    king_sq: Square,
    mut on_square: F,
) -> (Square, PType) {
    let king_piece = board[king_sq as usize];
    debug_assert_eq!(king_piece.ptype(), PType::King);
    on_square(king_sq, king_piece);

    let mut bdir = king_piece.ori();
    let mut beam = beam_of(bdir);
    let mut sq = king_sq;

    loop {
        sq = step(sq, beam);
        let piece = board[sq as usize];
        on_square(sq, piece);

        match piece.ptype() {
            PType::Empty => {}
            PType::Pawn => {
                let new_dir = reflect_of(bdir, piece.ori());
                if new_dir < 0 {
                    return (sq, PType::Pawn); // absorbed by the Pawn's back
                }
                bdir = new_dir as u8;
                beam = beam_of(bdir);
            }
            PType::King => return (sq, PType::King),
            PType::Invalid => return (sq, PType::Invalid),
        }
    }
}

/// Marks every square the laser from `king_sq` passes through (mark mode).
/// Used to build the enemy pin map ahead of move generation.
pub fn mark_laser_path(board: &[Piece; ARR_SIZE], king_sq: Square, laser_map: &mut [u8; ARR_SIZE], mark_mask: u8) {
    fire_laser(board, king_sq, |sq, _piece| {
        laser_map[sq as usize] |= mark_mask;
    });
}

/// The square whose occupant is zapped by firing from `king_sq`, or `None`
/// if the beam ran off the board without hitting anything.
pub fn fire(board: &[Piece; ARR_SIZE], king_sq: Square) -> Option<Square> {
    let (stop_sq, stop_ptype) = fire_laser(board, king_sq, |_, _| {});
    match stop_ptype {
        PType::Pawn | PType::King => Some(stop_sq),
        _ => None,
    }
}

/// Harmonic-ish distance used by `h_attackable`: `1/(|df|+1) + 1/(|dr|+1)`.
pub fn h_dist(a: Square, b: Square) -> f32 {
    let df = (fil_of(a) - fil_of(b)).unsigned_abs() as f32 + 1.0;
    let dr = (rnk_of(a) - rnk_of(b)).unsigned_abs() as f32 + 1.0;
    (df + dr) / (df * dr)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Heuristics {
    pub pawnpin: i32,
    pub h_attackable: f32,
    pub mobility: i32,
}

/// Fires `shooter`'s laser and accumulates mobility/pawnpin/h_attackable
/// heuristics against `shooter`'s opponent's King. `mobility` starts at 9 (the
/// King's own square plus its eight neighbors) per the reference evaluator's
/// initialization at the call site.
pub fn mark_laser_path_heuristics(
    board: &[Piece; ARR_SIZE],
    shooter_king_sq: Square,
    shooter: Color,
    target_king_sq: Square,
) -> Heuristics {
    let mut heur = Heuristics {
        pawnpin: 0,
        h_attackable: 0.0,
        mobility: 9,
    };

    let right = fil_of(target_king_sq) + 1;
    let left = fil_of(target_king_sq) - 1;
    let top = rnk_of(target_king_sq) + 1;
    let bottom = rnk_of(target_king_sq) - 1;
    let in_box = |sq: Square| {
        let f = fil_of(sq);
        let r = rnk_of(sq);
        f <= right && f >= left && r >= bottom && r <= top
    };

    if in_box(shooter_king_sq) {
        heur.mobility -= 1;
    }
    for d in 0..8 {
        let neighbor = step(target_king_sq, dir_of(d));
        if board[neighbor as usize].ptype() == PType::Invalid {
            heur.mobility -= 1;
        }
    }

    fire_laser(board, shooter_king_sq, |sq, piece| {
        if sq != shooter_king_sq && in_box(sq) && piece.ptype() != PType::Invalid {
            heur.mobility -= 1;
        }
        match piece.ptype() {
            PType::Empty | PType::King => {
                heur.h_attackable += h_dist(sq, target_king_sq);
            }
            PType::Pawn => {
                heur.h_attackable += h_dist(sq, target_king_sq);
                if piece.color() != shooter {
                    heur.pawnpin += 1;
                }
            }
            PType::Invalid => {}
        }
    });

    heur
}
