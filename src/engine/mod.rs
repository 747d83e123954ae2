//! Chess rules: board representation, move generation, move application,
//! result detection and notation.

pub mod apply;
pub mod attacks;
pub mod board;
pub mod game;
pub mod movegen;
pub mod san;
pub mod types;
pub mod zobrist;

pub use apply::{CastlingSquares, castling_squares};
pub use attacks::is_attacked;
pub use board::{Board, Position, STARTING_FEN};
pub use game::{MoveRecord, is_insufficient_material};
pub use movegen::{legal_moves, legal_moves_for, pseudo_legal_moves};
pub use san::{find_legal_move_by_uci, move_to_san, move_to_uci, parse_san};
pub use types::*;
