//! Zobrist hashing of the repetition-relevant part of a position.
//!
//! A key covers FEN fields 1–4 only: placement, side to move, castling rights
//! and the en-passant file. Clocks are excluded, so two positions reached by
//! different move orders hash equal exactly when they repeat for the
//! threefold/fivefold rules. The same key identifies positions in the
//! search's best-move table.

use std::sync::OnceLock;

use crate::engine::board::Board;
use crate::engine::types::{CastlingRights, Color, PieceType, Square};

/// 16 possible castling-rights bitmasks (0..15).
const CASTLING_KEYS: usize = 16;
/// One key per en-passant file.
const EP_KEYS: usize = 8;

/// Random keys, generated once from a fixed seed.
pub struct ZobristKeys {
    /// piece\[color\]\[piece_type\]\[square\]
    pub piece: [[[u64; 64]; 6]; 2],
    /// XORed in when Black is to move.
    pub side_to_move: u64,
    pub castling: [u64; CASTLING_KEYS],
    pub en_passant: [u64; EP_KEYS],
}

pub fn keys() -> &'static ZobristKeys {
    static ZOBRIST: OnceLock<ZobristKeys> = OnceLock::new();
    ZOBRIST.get_or_init(ZobristKeys::init)
}

impl ZobristKeys {
    fn init() -> Self {
        let mut rng = Xorshift64::new(0x3243_F6A8_885A_308D);

        let mut piece = [[[0u64; 64]; 6]; 2];
        for by_kind in &mut piece {
            for by_square in by_kind {
                for key in by_square {
                    *key = rng.next_u64();
                }
            }
        }
        let side_to_move = rng.next_u64();
        let castling = std::array::from_fn(|_| rng.next_u64());
        let en_passant = std::array::from_fn(|_| rng.next_u64());

        ZobristKeys {
            piece,
            side_to_move,
            castling,
            en_passant,
        }
    }

    #[inline]
    pub fn piece_key(&self, color: Color, piece: PieceType, sq: Square) -> u64 {
        self.piece[color.index()][piece.index()][sq.index()]
    }

    #[inline]
    pub fn ep_key(&self, file: u8) -> u64 {
        self.en_passant[file as usize]
    }

    #[inline]
    pub fn castling_key(&self, rights: CastlingRights) -> u64 {
        self.castling[(rights.0 & 0x0F) as usize]
    }
}

/// Repetition key for the given FEN fields 1–4.
pub fn hash(
    board: &Board,
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
) -> u64 {
    let zk = keys();
    let mut h = board
        .pieces()
        .fold(0u64, |acc, (sq, p)| acc ^ zk.piece_key(p.color, p.kind, sq));
    if side_to_move == Color::Black {
        h ^= zk.side_to_move;
    }
    h ^= zk.castling_key(castling);
    if let Some(ep) = en_passant {
        h ^= zk.ep_key(ep.file());
    }
    h
}

/// xorshift64; deterministic so keys are stable across runs.
struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    fn new(seed: u64) -> Self {
        Xorshift64 {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}
