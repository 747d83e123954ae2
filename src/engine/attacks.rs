//! Pre-computed attack tables and square-attack detection.
//!
//! Tables are initialised once (via `OnceLock`) and live for the lifetime of
//! the process: leaper targets per square, pawn capture targets per colour,
//! and the eight sliding rays per square ordered outward from the origin.
//!
//! [`is_attacked`] works on a bare [`Board`], so the legality filter and the
//! search can ask about hypothetical boards without building a `Position`.

use std::sync::OnceLock;

use crate::engine::board::Board;
use crate::engine::types::{Color, PieceType, Square};

// =========================================================================
// Directions
// =========================================================================

/// Knight jumps as (file, rank) deltas.
pub const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// King steps as (file, rank) deltas.
pub const KING_DELTAS: [(i8, i8); 8] = [
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
];

/// Ray directions. The first four are orthogonal (rook), the last four
/// diagonal (bishop); the queen uses all eight.
pub const RAY_DELTAS: [(i8, i8); 8] = [
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, -1),
    (-1, 1),
];

pub const ORTHOGONAL: std::ops::Range<usize> = 0..4;
pub const DIAGONAL: std::ops::Range<usize> = 4..8;

/// Ray index range a slider walks.
pub fn slider_directions(piece: PieceType) -> std::ops::Range<usize> {
    match piece {
        PieceType::Bishop => DIAGONAL,
        PieceType::Rook => ORTHOGONAL,
        PieceType::Queen => 0..8,
        _ => 0..0,
    }
}

// =========================================================================
// Tables
// =========================================================================

/// Get a reference to the global attack tables.
pub fn tables() -> &'static AttackTables {
    static TABLES: OnceLock<AttackTables> = OnceLock::new();
    TABLES.get_or_init(AttackTables::init)
}

/// Pre-computed target lists for every square.
pub struct AttackTables {
    knight: [Vec<Square>; 64],
    king: [Vec<Square>; 64],
    /// `pawn[color][square]`: squares a pawn of `color` on `square` attacks.
    pawn: [[Vec<Square>; 64]; 2],
    /// `rays[square][direction]`: squares along a ray, nearest first.
    rays: [[Vec<Square>; 8]; 64],
}

impl AttackTables {
    fn init() -> Self {
        let leaper = |deltas: &[(i8, i8)], sq: usize| -> Vec<Square> {
            deltas
                .iter()
                .filter_map(|&(df, dr)| Square(sq as u8).offset(df, dr))
                .collect()
        };
        let pawn_for = |color: Color, sq: usize| -> Vec<Square> {
            let forward = match color {
                Color::White => 1,
                Color::Black => -1,
            };
            leaper(&[(-1, forward), (1, forward)], sq)
        };

        AttackTables {
            knight: std::array::from_fn(|sq| leaper(&KNIGHT_DELTAS, sq)),
            king: std::array::from_fn(|sq| leaper(&KING_DELTAS, sq)),
            pawn: [
                std::array::from_fn(|sq| pawn_for(Color::White, sq)),
                std::array::from_fn(|sq| pawn_for(Color::Black, sq)),
            ],
            rays: std::array::from_fn(|sq| {
                std::array::from_fn(|dir| {
                    let (df, dr) = RAY_DELTAS[dir];
                    std::iter::successors(Square(sq as u8).offset(df, dr), |s| s.offset(df, dr))
                        .collect()
                })
            }),
        }
    }

    /// Knight targets from a square.
    #[inline]
    pub fn knight_targets(&self, sq: Square) -> &[Square] {
        &self.knight[sq.index()]
    }

    /// King targets from a square.
    #[inline]
    pub fn king_targets(&self, sq: Square) -> &[Square] {
        &self.king[sq.index()]
    }

    /// Squares a pawn of `color` standing on `sq` attacks.
    #[inline]
    pub fn pawn_attacks(&self, color: Color, sq: Square) -> &[Square] {
        &self.pawn[color.index()][sq.index()]
    }

    /// One ray from `sq`, nearest square first.
    #[inline]
    pub fn ray(&self, sq: Square, direction: usize) -> &[Square] {
        &self.rays[sq.index()][direction]
    }
}

// =========================================================================
// Attack detection
// =========================================================================

/// Is `sq` attacked by any piece of colour `by` on `board`?
pub fn is_attacked(board: &Board, sq: Square, by: Color) -> bool {
    let t = tables();

    // A `by` pawn attacks `sq` from the squares an enemy pawn on `sq` would attack.
    let pawn_hit = t
        .pawn_attacks(!by, sq)
        .iter()
        .any(|&s| board.is(s, by, PieceType::Pawn));
    if pawn_hit {
        return true;
    }

    if t
        .knight_targets(sq)
        .iter()
        .any(|&s| board.is(s, by, PieceType::Knight))
    {
        return true;
    }

    if t
        .king_targets(sq)
        .iter()
        .any(|&s| board.is(s, by, PieceType::King))
    {
        return true;
    }

    for dir in 0..8 {
        let straight = ORTHOGONAL.contains(&dir);
        for &s in t.ray(sq, dir) {
            let Some(piece) = board.get(s) else {
                continue;
            };
            if piece.color == by {
                let hits = match piece.kind {
                    PieceType::Queen => true,
                    PieceType::Rook => straight,
                    PieceType::Bishop => !straight,
                    _ => false,
                };
                if hits {
                    return true;
                }
            }
            break;
        }
    }

    false
}

// =========================================================================
// Tests
// =========================================================================
