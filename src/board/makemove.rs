//! Two-phase make-move: relocate/rotate a piece, then fire the mover's laser.
//! Grounded verbatim on the reference `low_level_make_move`/`make_move`/
//! `fire`, including the Ko-detection branch.

use super::defs::{Color, PType};
use super::geometry::Square;
use super::laser::fire;
use super::mv::Move;
use super::piece::Piece;
use super::position::{Position, Victims};
use super::zobrist::ZobristTable;
use crate::defs::NUMBER_PAWNS;

const NO_SQUARE: Square = 0;

/// Phase 1: move or rotate the named piece. Returns the new position plus
/// the square of a stomped Pawn (0 if this move did not stomp anything) --
/// the caller removes that piece from the board, mirroring the reference
/// implementation's split between `low_level_make_move` and `make_move`.
pub fn low_level_make_move<'a>(
    old: &'a Position<'a>,
    zob: &ZobristTable,
    mv: Move,
) -> (Position<'a>, Square) {
    let mut p = Position {
        board: old.board,
        history: Some(old),
        key: old.key,
        ply: old.ply,
        last_move: Some(mv),
        victims: Victims::NONE,
        kloc: old.kloc,
        plocs: old.plocs,
    };

    p.key ^= zob.zob_color;

    let from_sq = mv.from_sq();
    let to_sq = mv.to_sq();
    let rot = mv.rotation();

    let from_piece = p.board[from_sq as usize];
    let to_piece = p.board[to_sq as usize];

    let mut stomped_sq: Square = NO_SQUARE;

    if to_sq != from_sq {
        if from_piece.ptype() == PType::Pawn
            && to_piece.ptype() == PType::Pawn
            && to_piece.color() == from_piece.color().opp()
        {
            // Stomping: the displaced piece ends up sitting at `from_sq`
            // once the swap below runs; the caller clears it from there.
            stomped_sq = from_sq;
        }

        p.key ^= zob.piece_key(from_sq as usize, from_piece);
        p.key ^= zob.piece_key(to_sq as usize, to_piece);

        p.board[to_sq as usize] = from_piece;
        p.board[from_sq as usize] = to_piece;

        p.key ^= zob.piece_key(to_sq as usize, from_piece);
        p.key ^= zob.piece_key(from_sq as usize, to_piece);

        if from_piece.ptype() == PType::King {
            p.kloc[from_piece.color().as_index()] = to_sq;
        }
        if to_piece.ptype() == PType::King {
            p.kloc[to_piece.color().as_index()] = from_sq;
        }
        if from_piece.ptype() == PType::Pawn {
            relocate_ploc(&mut p.plocs[from_piece.color().as_index()], from_sq, to_sq);
        }
        if to_piece.ptype() == PType::Pawn {
            relocate_ploc(&mut p.plocs[to_piece.color().as_index()], to_sq, from_sq);
        }
    } else {
        p.key ^= zob.piece_key(from_sq as usize, from_piece);
        let rotated = from_piece.rotated(rot as u8);
        p.board[from_sq as usize] = rotated;
        p.key ^= zob.piece_key(from_sq as usize, rotated);
    }

    p.ply += 1;
    (p, stomped_sq)
}

fn relocate_ploc(plocs: &mut [Square; NUMBER_PAWNS], from: Square, to: Square) {
    for slot in plocs.iter_mut() {
        if *slot == from {
            *slot = to;
        }
    }
}

fn clear_square(p: &mut Position, zob: &ZobristTable, sq: Square, color: Color) {
    let piece = p.board[sq as usize];
    p.key ^= zob.piece_key(sq as usize, piece);
    p.board[sq as usize] = Piece::EMPTY;
    p.key ^= zob.piece_key(sq as usize, Piece::EMPTY);
    for slot in p.plocs[color.as_index()].iter_mut() {
        if *slot == sq {
            *slot = NO_SQUARE;
        }
    }
}

/// Full make-move: relocation/rotation, then laser fire, then Ko detection.
/// `use_ko` threads the `USE_KO` tunable rather than reading a global.
pub fn make_move<'a>(
    old: &'a Position<'a>,
    zob: &ZobristTable,
    mv: Move,
    use_ko: bool,
) -> (Position<'a>, Victims) {
    let (mut p, stomped_sq) = low_level_make_move(old, zob, mv);

    if stomped_sq == NO_SQUARE {
        p.victims.stomped = Piece::EMPTY;
    } else {
        let stomped_piece = p.board[stomped_sq as usize];
        let stomped_color = stomped_piece.color();
        p.victims.stomped = stomped_piece;
        clear_square(&mut p, zob, stomped_sq, stomped_color);
    }

    // `color_to_move` now names whoever moves *next*, because `ply` was just
    // incremented -- the shooter is the other color, the one who just moved.
    let shooter = p.color_to_move().opp();
    let shooter_king_sq = p.kloc[shooter.as_index()];
    let victim_sq = fire(&p.board, shooter_king_sq);

    match victim_sq {
        None => {
            p.victims.zapped = Piece::EMPTY;
            if use_ko && p.victims.is_zero() && p.key == (old.key ^ zob.zob_color) {
                let victims = Victims::ko_or_illegal();
                return (p, victims);
            }
        }
        Some(sq) => {
            let zapped_piece = p.board[sq as usize];
            let zapped_color = zapped_piece.color();
            p.victims.zapped = zapped_piece;
            clear_square(&mut p, zob, sq, zapped_color);
        }
    }

    let victims = p.victims;
    (p, victims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::defs::Rotation;
    use crate::board::geometry::square_of;
    use crate::defs::{ARR_SIZE, BOARD_WIDTH};

    fn empty_position<'a>() -> Position<'a> {
        let mut board = [Piece::INVALID; ARR_SIZE];
        for f in 0..BOARD_WIDTH {
            for r in 0..BOARD_WIDTH {
                board[square_of(f, r) as usize] = Piece::EMPTY;
            }
        }
        Position {
            board,
            history: None,
            key: 0,
            ply: 0,
            last_move: None,
            victims: Victims::NONE,
            kloc: [0, 0],
            plocs: [[0; NUMBER_PAWNS]; 2],
        }
    }

    #[test]
    fn rotation_does_not_move_the_piece() {
        let zob = ZobristTable::default();
        let mut pos = empty_position();
        let king_sq = square_of(5, 5);
        pos.board[king_sq as usize] = Piece::new(PType::King, Color::White, 0);
        pos.kloc[0] = king_sq;
        pos.board[square_of(0, 0) as usize] = Piece::new(PType::King, Color::Black, 2);
        pos.kloc[1] = square_of(0, 0);
        pos.key = crate::board::zobrist::compute_zob_key(&zob, &pos.board, Color::White);

        let mv = Move::new(PType::King, Rotation::Right, king_sq, king_sq);
        let (next, victims) = make_move(&pos, &zob, mv, true);
        assert_eq!(next.board[king_sq as usize].ori(), 1);
        assert!(!victims.is_sentinel());
        assert_eq!(
            next.key,
            crate::board::zobrist::compute_zob_key(&zob, &next.board, next.color_to_move())
        );
    }

    #[test]
    fn pawn_stomps_enemy_pawn() {
        let zob = ZobristTable::default();
        let mut pos = empty_position();
        pos.board[square_of(9, 9) as usize] = Piece::new(PType::King, Color::White, 0);
        pos.kloc[0] = square_of(9, 9);
        pos.board[square_of(0, 9) as usize] = Piece::new(PType::King, Color::Black, 0);
        pos.kloc[1] = square_of(0, 9);

        let from = square_of(2, 2);
        let to = square_of(2, 3);
        pos.board[from as usize] = Piece::new(PType::Pawn, Color::White, 0);
        pos.board[to as usize] = Piece::new(PType::Pawn, Color::Black, 0);
        pos.plocs[0][0] = from;
        pos.plocs[1][0] = to;
        pos.key = crate::board::zobrist::compute_zob_key(&zob, &pos.board, Color::White);

        let mv = Move::new(PType::Pawn, Rotation::None, from, to);
        let (next, victims) = make_move(&pos, &zob, mv, true);
        assert_eq!(victims.stomped.ptype(), PType::Pawn);
        assert_eq!(victims.stomped.color(), Color::Black);
        assert_eq!(next.board[from as usize], Piece::EMPTY);
        assert_eq!(next.board[to as usize].ptype(), PType::Pawn);
        assert!(next.plocs[1].iter().all(|&sq| sq != to || sq == 0));
    }

    #[test]
    fn laser_reflects_twice_off_pawns_then_zaps_the_enemy_king() {
        let zob = ZobristTable::default();
        let mut pos = empty_position();

        // White king at (0,0) facing East; its move is a harmless rotation
        // of a Pawn far out of the beam's path.
        let white_king = square_of(0, 0);
        pos.board[white_king as usize] = Piece::new(PType::King, Color::White, 1);
        pos.kloc[0] = white_king;

        // Beam travels East from the king and hits a NW-oriented Pawn at
        // (3,0), which turns an eastbound beam north.
        let bounce_one = square_of(3, 0);
        pos.board[bounce_one as usize] = Piece::new(PType::Pawn, Color::White, 0); // NW

        // Beam now travels North from (3,0); an SE-oriented Pawn at (3,4)
        // turns a northbound beam east.
        let bounce_two = square_of(3, 4);
        pos.board[bounce_two as usize] = Piece::new(PType::Pawn, Color::Black, 2); // SE

        // Beam now travels East from (3,4) and reaches the Black king.
        let black_king = square_of(7, 4);
        pos.board[black_king as usize] = Piece::new(PType::King, Color::Black, 0);
        pos.kloc[1] = black_king;

        let mover_sq = square_of(8, 8);
        pos.board[mover_sq as usize] = Piece::new(PType::Pawn, Color::White, 0);
        pos.plocs[0][0] = mover_sq;
        pos.plocs[0][1] = bounce_one;
        pos.plocs[1][0] = bounce_two;

        pos.key = crate::board::zobrist::compute_zob_key(&zob, &pos.board, Color::White);

        let mv = Move::new(PType::Pawn, Rotation::Right, mover_sq, mover_sq);
        let (next, victims) = make_move(&pos, &zob, mv, true);

        assert_eq!(victims.zapped.ptype(), PType::King);
        assert_eq!(victims.zapped.color(), Color::Black);
        assert_eq!(next.board[black_king as usize], Piece::EMPTY);
    }

    #[test]
    fn a_null_king_move_with_no_victim_is_flagged_as_ko() {
        let zob = ZobristTable::default();
        let mut pos = empty_position();
        let white_king = square_of(0, 0);
        let black_king = square_of(9, 9);
        pos.board[white_king as usize] = Piece::new(PType::King, Color::White, 1);
        pos.kloc[0] = white_king;
        pos.board[black_king as usize] = Piece::new(PType::King, Color::Black, 3);
        pos.kloc[1] = black_king;
        pos.key = crate::board::zobrist::compute_zob_key(&zob, &pos.board, Color::White);

        // A null move: White's king rotates by `Rotation::None`, i.e. stays
        // exactly as it was, from == to with no actual change.
        let mv = Move::new(PType::King, Rotation::None, white_king, white_king);
        let (_next, victims) = make_move(&pos, &zob, mv, true);
        assert!(victims.is_sentinel());
    }

    #[test]
    fn stomping_and_zapping_can_both_happen_on_the_same_move() {
        let zob = ZobristTable::default();
        let mut pos = empty_position();
        let white_king = square_of(9, 0);
        let black_king = square_of(0, 9);
        pos.board[white_king as usize] = Piece::new(PType::King, Color::White, 0);
        pos.kloc[0] = white_king;
        pos.board[black_king as usize] = Piece::new(PType::King, Color::Black, 0);
        pos.kloc[1] = black_king;

        // White Pawn stomps a Black Pawn by moving onto it...
        let from = square_of(2, 2);
        let to = square_of(2, 3);
        pos.board[from as usize] = Piece::new(PType::Pawn, Color::White, 0);
        pos.board[to as usize] = Piece::new(PType::Pawn, Color::Black, 0);
        pos.plocs[0][0] = from;
        pos.plocs[1][0] = to;

        // ...and the same move's beam, fired afterward from White's king,
        // travels straight south and zaps a second Black pawn sitting
        // directly below it with no reflection involved.
        let doomed_sq = square_of(9, 1);
        pos.board[doomed_sq as usize] = Piece::new(PType::Pawn, Color::Black, 0);
        pos.plocs[1][1] = doomed_sq;

        pos.key = crate::board::zobrist::compute_zob_key(&zob, &pos.board, Color::White);

        let mv = Move::new(PType::Pawn, Rotation::None, from, to);
        let (next, victims) = make_move(&pos, &zob, mv, true);

        assert_eq!(victims.stomped.ptype(), PType::Pawn);
        assert_eq!(victims.stomped.color(), Color::Black);
        assert_eq!(victims.zapped.ptype(), PType::Pawn);
        assert_eq!(victims.zapped.color(), Color::Black);
        assert_eq!(next.board[doomed_sq as usize], Piece::EMPTY);
    }

    #[test]
    fn key_matches_a_from_scratch_recomputation_after_every_ply_of_a_sequence() {
        use crate::board::zobrist::compute_zob_key;

        let zob = ZobristTable::default();
        let mut pos0 = empty_position();
        let white_king = square_of(0, 0);
        let black_king = square_of(9, 9);
        pos0.board[white_king as usize] = Piece::new(PType::King, Color::White, 1); // E
        pos0.kloc[0] = white_king;
        pos0.board[black_king as usize] = Piece::new(PType::King, Color::Black, 3); // W
        pos0.kloc[1] = black_king;
        let pawn_sq = square_of(4, 4);
        pos0.board[pawn_sq as usize] = Piece::new(PType::Pawn, Color::White, 0);
        pos0.plocs[0][0] = pawn_sq;
        pos0.key = compute_zob_key(&zob, &pos0.board, Color::White);

        // A short sequence mixing a rotation, a King translation and a Pawn
        // translation, replayed one ply at a time (each position kept alive
        // as its own binding, since every ply borrows its predecessor) so
        // every intermediate key can be checked against an independent
        // from-scratch recomputation.
        let mv1 = Move::new(PType::Pawn, Rotation::Right, pawn_sq, pawn_sq);
        let (pos1, v1) = make_move(&pos0, &zob, mv1, true);
        assert!(!v1.is_sentinel());
        assert_eq!(pos1.key, compute_zob_key(&zob, &pos1.board, pos1.color_to_move()));

        let mv2 = Move::new(PType::King, Rotation::None, black_king, square_of(8, 9));
        let (pos2, v2) = make_move(&pos1, &zob, mv2, true);
        assert!(!v2.is_sentinel());
        assert_eq!(pos2.key, compute_zob_key(&zob, &pos2.board, pos2.color_to_move()));

        let mv3 = Move::new(PType::Pawn, Rotation::None, pawn_sq, square_of(4, 5));
        let (pos3, v3) = make_move(&pos2, &zob, mv3, true);
        assert!(!v3.is_sentinel());
        assert_eq!(pos3.key, compute_zob_key(&zob, &pos3.board, pos3.color_to_move()));
    }
}
