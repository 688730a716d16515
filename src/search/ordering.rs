//! Move ordering: building the sortable move list with hash/killer moves
//! pushed to the front and history-table scores filling in the rest, plus
//! the two incremental sorts search nodes use to pull the next move to try.
//! Grounded on the reference `get_sortable_move_list`, `sort_incremental` and
//! `sort_incremental_new`.

use crate::board::defs::{Color, PType};
use crate::board::generate_all;
use crate::board::mv::{set_sort_key, sort_key, Move, SORT_MASK};
use crate::board::position::Position;
use crate::search::defs::HistoryTable;

/// Builds the move list for `position`, sorting the hash-table move and both
/// killer slots to the front (in that priority order) and scoring every
/// other move by its history-table bucket.
///
/// `fake_color_to_move` is the color the history table indexes under; it is
/// passed in rather than derived from `position` so a negated (scout) node
/// can still look its moves up under the color actually making them.
pub fn get_sortable_move_list(
    position: &Position,
    fake_color_to_move: Color,
    hash_table_move: Option<Move>,
    killer_a: Option<Move>,
    killer_b: Option<Move>,
    history: &HistoryTable,
) -> Vec<u64> {
    let mut move_list = generate_all(position);

    for word in move_list.iter_mut() {
        let mv = Move::from_sortable(*word);
        if Some(mv) == hash_table_move {
            set_sort_key(word, SORT_MASK as u32);
        } else if Some(mv) == killer_a {
            set_sort_key(word, (SORT_MASK - 1) as u32);
        } else if Some(mv) == killer_b {
            set_sort_key(word, (SORT_MASK - 2) as u32);
        } else {
            let ptype = mv.ptype();
            let from_piece = position.board[mv.from_sq() as usize];
            let ori = from_piece.rotated(mv.rotation() as u8).ori();
            let score = history.get(fake_color_to_move, ptype, mv.to_sq(), ori);
            set_sort_key(word, score.min(SORT_MASK as u32 - 3));
        }
    }

    move_list
}

/// Full descending insertion sort of the whole list. `mv_index` is accepted
/// only so call sites look symmetric with `sort_incremental_new`; the
/// reference ignores it too, always sorting from the front.
pub fn sort_incremental(move_list: &mut [u64], _mv_index: usize) {
    for j in 1..move_list.len() {
        let insert = move_list[j];
        let mut hole = j;
        while hole > 0 && insert > move_list[hole - 1] {
            move_list[hole] = move_list[hole - 1];
            hole -= 1;
        }
        move_list[hole] = insert;
    }
}

/// Partial selection sort: finds the best-scoring move anywhere at or past
/// `mv_index` and swaps it into `mv_index`, leaving everything else
/// unordered. Cheaper per call than a full sort and still finds the next
/// move to try, which is all a node doing serial YBW search needs before it
/// has searched enough moves to fan out in parallel.
pub fn sort_incremental_new(move_list: &mut [u64], mv_index: usize) {
    let mut best = move_list[mv_index];
    let mut hole = mv_index;
    for j in (mv_index + 1)..move_list.len() {
        if move_list[j] > best {
            best = move_list[j];
            hole = j;
        }
    }
    move_list[hole] = move_list[mv_index];
    move_list[mv_index] = best;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::mv::Move;
    use crate::board::defs::Rotation;
    use crate::board::geometry::square_of;

    fn word(key: u32, mv: Move) -> u64 {
        let mut w = mv.to_sortable();
        set_sort_key(&mut w, key);
        w
    }

    #[test]
    fn sort_incremental_orders_descending_by_key() {
        let mv = Move::new(PType::Pawn, Rotation::None, square_of(1, 1), square_of(1, 2));
        let mut list = vec![word(3, mv), word(9, mv), word(1, mv), word(5, mv)];
        sort_incremental(&mut list, 0);
        let keys: Vec<u32> = list.iter().map(|&w| sort_key(w)).collect();
        assert_eq!(keys, vec![9, 5, 3, 1]);
    }

    #[test]
    fn sort_incremental_new_only_fixes_up_to_mv_index() {
        let mv = Move::new(PType::Pawn, Rotation::None, square_of(1, 1), square_of(1, 2));
        let mut list = vec![word(1, mv), word(9, mv), word(2, mv), word(7, mv)];
        sort_incremental_new(&mut list, 1);
        let keys: Vec<u32> = list.iter().map(|&w| sort_key(w)).collect();
        // index 0 untouched; best among [1..] (which is 9) swapped into index 1.
        assert_eq!(keys[0], 1);
        assert_eq!(keys[1], 9);
    }

    #[test]
    fn hash_table_move_sorts_to_the_front() {
        let from = square_of(2, 2);
        let hash_mv = Move::new(PType::Pawn, Rotation::None, from, square_of(2, 3));
        let other_mv = Move::new(PType::Pawn, Rotation::Right, from, from);
        let mut list = vec![word(0, other_mv), word(0, hash_mv)];
        for w in list.iter_mut() {
            let mv = Move::from_sortable(*w);
            if mv == hash_mv {
                set_sort_key(w, SORT_MASK as u32);
            }
        }
        sort_incremental(&mut list, 0);
        assert_eq!(Move::from_sortable(list[0]), hash_mv);
    }
}
