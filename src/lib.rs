//! Core of a Leiserchess engine: board representation and move mechanics,
//! static evaluation, and a parallel null-window scout search. FEN parsing,
//! a UCI-like protocol, the top-level iterative-deepening driver, and option
//! plumbing are external collaborators and live outside this crate.

pub mod board;
pub mod defs;
pub mod evaluation;
pub mod search;

pub use board::{make_move, generate_all, move_to_str, Move, Piece, Position, Square, Victims};
pub use evaluation::eval;
