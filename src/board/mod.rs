//! Board representation: a 16x16 mailbox array holding a 10x10 playing area,
//! packed pieces and moves, Zobrist hashing, the laser engine, move
//! generation, make-move and perft. Kept as one module the way the teacher
//! keeps its own board concerns together, even though the internals here
//! (mailbox + laser physics) are unrelated to the teacher's bitboard design.

pub mod defs;
pub mod geometry;
pub mod laser;
pub mod makemove;
pub mod movegen;
pub mod mv;
pub mod perft;
pub mod piece;
pub mod position;
pub mod zobrist;

pub use defs::{Color, KingOri, PType, PawnOri, Rotation};
pub use geometry::{square_to_str, Square};
pub use makemove::make_move;
pub use movegen::generate_all;
pub use mv::{move_to_str, Move};
pub use perft::{perft, perft_parallel};
pub use piece::Piece;
pub use position::{Position, Victims};
pub use zobrist::ZobristTable;
