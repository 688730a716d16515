//! Static positional evaluation. Grounded verbatim on the reference `eval`,
//! `pcentral`, `kface`, `kaggressive` and the min/max-tracked PBETWEEN code
//! path actually taken inside `eval()` (the standalone `pbetween()` helper
//! is dead code there and has no counterpart here).

use std::cell::RefCell;

use rand::{Rng, SeedableRng};
use rand::rngs::SmallRng;

use crate::board::defs::{Color, KingOri, PType};
use crate::board::geometry::{fil_of, rnk_of, square_of};
use crate::board::laser::mark_laser_path_heuristics;
use crate::board::position::Position;
use crate::defs::BOARD_WIDTH;
use crate::search::defs::{king_ori, SearchConfig};

// `10 / sqrt(2)` and its reciprocal, as used by the reference `pcentral`.
const BONUS_MULTIPLIER: f64 = std::f64::consts::SQRT_2 / 10.0;

thread_local! {
    /// Per-thread randomization source for `eval`'s optional noise term,
    /// matching the reference's `static __thread unsigned int seed = 1`.
    static EVAL_RNG: RefCell<SmallRng> = RefCell::new(SmallRng::seed_from_u64(1));
}

/// Bonus for a Pawn's nearness to the board's center, highest in the middle
/// and falling off toward the edges.
pub fn pcentral(cfg: &SearchConfig, f: i32, r: i32) -> i32 {
    let half = BOARD_WIDTH / 2;
    let mut df = half - f - 1;
    if df < 0 {
        df = f - half;
    }
    let mut dr = half - r - 1;
    if dr < 0 {
        dr = r - half;
    }
    let bonus = 1.0 - ((df * df + dr * dr) as f64).sqrt() * BONUS_MULTIPLIER;
    (cfg.pcentral as f64 * bonus) as i32
}

/// Bonus (or penalty) for a King facing toward the opposing King, scaled
/// down the farther apart the two Kings are.
fn kface(cfg: &SearchConfig, position: &Position, f: i32, r: i32) -> i32 {
    let sq = square_of(f, r);
    let piece = position.board[sq as usize];
    let opp_sq = position.kloc[piece.color().opp().as_index()];
    let delta_fil = fil_of(opp_sq) - f;
    let delta_rnk = rnk_of(opp_sq) - r;
    let bonus = match king_ori(piece.ori()) {
        KingOri::N => delta_rnk,
        KingOri::E => delta_fil,
        KingOri::S => -delta_rnk,
        KingOri::W => -delta_fil,
    };
    (bonus * cfg.kface) / (delta_rnk.abs() + delta_fil.abs())
}

/// Bonus for a King that commands more board space behind it than the
/// opposing King does, measured as the area of the rectangle running from
/// the board's near edge (on each axis) out to the King's own square.
fn kaggressive(cfg: &SearchConfig, position: &Position, f: i32, r: i32) -> i32 {
    let sq = square_of(f, r);
    let piece = position.board[sq as usize];
    let opp_sq = position.kloc[piece.color().opp().as_index()];
    let of = fil_of(opp_sq);
    let or_ = rnk_of(opp_sq);

    let mut bonus = if of >= f { f + 1 } else { BOARD_WIDTH - f };
    bonus *= if or_ >= r { r + 1 } else { BOARD_WIDTH - r };

    (cfg.kaggressive * bonus) / (BOARD_WIDTH * BOARD_WIDTH)
}

/// Static evaluation of `position`, from the point of view of the side to
/// move, scaled back down by `ev_score_ratio` at the end.
pub fn eval(position: &Position, cfg: &SearchConfig) -> i32 {
    let mut score = [0i32; 2];
    let mut number_pawns = [0i32; 2];
    let mut king_max_rnk = 0;
    let mut king_min_rnk = BOARD_WIDTH;
    let mut king_max_fil = 0;
    let mut king_min_fil = BOARD_WIDTH;

    for &color in &[Color::White, Color::Black] {
        let ci = color.as_index();
        let sq = position.kloc[ci];
        let f = fil_of(sq);
        let r = rnk_of(sq);
        king_max_rnk = king_max_rnk.max(r);
        king_min_rnk = king_min_rnk.min(r);
        king_max_fil = king_max_fil.max(f);
        king_min_fil = king_min_fil.min(f);

        score[ci] += kface(cfg, position, f, r);
        score[ci] += kaggressive(cfg, position, f, r);
    }

    for &color in &[Color::White, Color::Black] {
        let ci = color.as_index();
        for &sq in position.plocs[ci].iter() {
            if sq == 0 {
                continue;
            }
            let f = fil_of(sq);
            let r = rnk_of(sq);
            number_pawns[ci] += 1;

            score[ci] += cfg.pawn_ev_value();

            let in_kings_box = (king_min_rnk..=king_max_rnk).contains(&r)
                && (king_min_fil..=king_max_fil).contains(&f);
            if in_kings_box {
                score[ci] += cfg.pbetween;
            }

            score[ci] += pcentral(cfg, f, r);
        }
    }

    // Fire each side's laser once and read off both sides' heuristics from
    // the two traversals. Naming follows the reference: `w_heuristics` is
    // the result of Black's laser fired at White's King box, `b_heuristics`
    // is White's laser fired at Black's King box.
    let w_heuristics = mark_laser_path_heuristics(
        &position.board,
        position.kloc[Color::Black.as_index()],
        Color::Black,
        position.kloc[Color::White.as_index()],
    );
    let b_heuristics = mark_laser_path_heuristics(
        &position.board,
        position.kloc[Color::White.as_index()],
        Color::White,
        position.kloc[Color::Black.as_index()],
    );

    score[Color::White.as_index()] += (cfg.hattack as f32 * b_heuristics.h_attackable) as i32;
    score[Color::Black.as_index()] += (cfg.hattack as f32 * w_heuristics.h_attackable) as i32;

    score[Color::White.as_index()] += cfg.mobility * w_heuristics.mobility;
    score[Color::Black.as_index()] += cfg.mobility * b_heuristics.mobility;

    score[Color::White.as_index()] +=
        cfg.pawnpin * (number_pawns[Color::White.as_index()] - w_heuristics.pawnpin);
    score[Color::Black.as_index()] +=
        cfg.pawnpin * (number_pawns[Color::Black.as_index()] - b_heuristics.pawnpin);

    let mut total = score[Color::White.as_index()] - score[Color::Black.as_index()];

    if cfg.randomize > 0 {
        let span = (cfg.randomize * 2 + 1) as u32;
        let z = EVAL_RNG.with(|rng| rng.borrow_mut().gen_range(0..span)) as i32;
        total = total + z - cfg.randomize;
    }

    if position.color_to_move() == Color::Black {
        total = -total;
    }

    total / cfg.ev_score_ratio
}
