//! Static position evaluation.
//!
//! Scores are centipawns relative to a root colour: positive means the root
//! side stands better. Terminal positions short-circuit to mate or draw
//! scores.
//!
//! Components:
//!   1. Material balance
//!   2. Piece-square tables (king blended by game phase)
//!   3. Endgame pawn advancement
//!   4. Rook file bonuses and bishop pair
//!   5. Check penalty and mobility for the side to move

use crate::engine::board::{Board, Position};
use crate::engine::types::{Color, GameResult, PieceType, Square};

/// Infinity sentinel. Larger than any reachable score.
pub const INF: i32 = 1_000_000;

/// Checkmate score base. Actual mate scores are `MATE - ply` so closer mates
/// score higher.
pub const MATE: i32 = 100_000;

/// Is this score a forced-mate score?
#[inline]
pub fn is_mate_score(score: i32) -> bool {
    score.abs() >= MATE - 1_000
}

const BISHOP_PAIR_BONUS: i32 = 30;
const ROOK_OPEN_FILE_BONUS: i32 = 20;
const ROOK_HALF_OPEN_FILE_BONUS: i32 = 10;
const CHECK_PENALTY: i32 = 30;
const MOBILITY_WEIGHT: i32 = 4;
/// Per-rank pawn advancement bonus at full endgame weight.
const PAWN_ADVANCE_BONUS: i32 = 6;

/// Phase contribution per piece type; 24 is the full opening complement.
const PHASE_WEIGHT: [i32; 6] = [0, 1, 1, 2, 4, 0];
const MAX_PHASE: i32 = 24;

// =========================================================================
// Piece-Square Tables (from White's perspective)
//
// Laid out like the board as seen from White: first row is rank 8, so a
// white piece on `sq` reads `table[sq]` and a black one reads
// `table[sq.flip()]`.
// =========================================================================

#[rustfmt::skip]
const PAWN_PST: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
    50, 50, 50, 50, 50, 50, 50, 50,
    10, 10, 20, 30, 30, 20, 10, 10,
     5,  5, 10, 25, 25, 10,  5,  5,
     0,  0,  0, 20, 20,  0,  0,  0,
     5, -5,-10,  0,  0,-10, -5,  5,
     5, 10, 10,-20,-20, 10, 10,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT_PST: [i32; 64] = [
   -50,-40,-30,-30,-30,-30,-40,-50,
   -40,-20,  0,  0,  0,  0,-20,-40,
   -30,  0, 10, 15, 15, 10,  0,-30,
   -30,  5, 15, 20, 20, 15,  5,-30,
   -30,  0, 15, 20, 20, 15,  0,-30,
   -30,  5, 10, 15, 15, 10,  5,-30,
   -40,-20,  0,  5,  5,  0,-20,-40,
   -50,-40,-30,-30,-30,-30,-40,-50,
];

#[rustfmt::skip]
const BISHOP_PST: [i32; 64] = [
   -20,-10,-10,-10,-10,-10,-10,-20,
   -10,  0,  0,  0,  0,  0,  0,-10,
   -10,  0,  5, 10, 10,  5,  0,-10,
   -10,  5,  5, 10, 10,  5,  5,-10,
   -10,  0, 10, 10, 10, 10,  0,-10,
   -10, 10, 10, 10, 10, 10, 10,-10,
   -10,  5,  0,  0,  0,  0,  5,-10,
   -20,-10,-10,-10,-10,-10,-10,-20,
];

#[rustfmt::skip]
const ROOK_PST: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10, 10, 10, 10, 10,  5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     0,  0,  0,  5,  5,  0,  0,  0,
];

#[rustfmt::skip]
const QUEEN_PST: [i32; 64] = [
   -20,-10,-10, -5, -5,-10,-10,-20,
   -10,  0,  0,  0,  0,  0,  0,-10,
   -10,  0,  5,  5,  5,  5,  0,-10,
    -5,  0,  5,  5,  5,  5,  0, -5,
     0,  0,  5,  5,  5,  5,  0, -5,
   -10,  5,  5,  5,  5,  5,  0,-10,
   -10,  0,  5,  0,  0,  0,  0,-10,
   -20,-10,-10, -5, -5,-10,-10,-20,
];

/// King middle-game: stay behind the pawn shield.
#[rustfmt::skip]
const KING_MG_PST: [i32; 64] = [
   -30,-40,-40,-50,-50,-40,-40,-30,
   -30,-40,-40,-50,-50,-40,-40,-30,
   -30,-40,-40,-50,-50,-40,-40,-30,
   -30,-40,-40,-50,-50,-40,-40,-30,
   -20,-30,-30,-40,-40,-30,-30,-20,
   -10,-20,-20,-20,-20,-20,-20,-10,
    20, 20,  0,  0,  0,  0, 20, 20,
    20, 30, 10,  0,  0, 10, 30, 20,
];

/// King endgame: walk to the centre.
#[rustfmt::skip]
const KING_EG_PST: [i32; 64] = [
   -50,-40,-30,-20,-20,-30,-40,-50,
   -30,-20,-10,  0,  0,-10,-20,-30,
   -30,-10, 20, 30, 30, 20,-10,-30,
   -30,-10, 30, 40, 40, 30,-10,-30,
   -30,-10, 30, 40, 40, 30,-10,-30,
   -30,-10, 20, 30, 30, 20,-10,-30,
   -30,-30,  0,  0,  0,  0,-30,-30,
   -50,-30,-30,-30,-30,-30,-30,-50,
];

/// PST lookup by piece type; the king entry is unused (blended separately).
const PST: [[i32; 64]; 6] = [
    PAWN_PST,
    KNIGHT_PST,
    BISHOP_PST,
    ROOK_PST,
    QUEEN_PST,
    KING_MG_PST,
];

// =========================================================================
// Evaluation
// =========================================================================

/// Evaluate `pos` for `root`, `ply` half-moves below the search root.
pub fn evaluate(pos: &Position, root: Color, ply: u32) -> i32 {
    if let Some(result) = pos.result() {
        return match result {
            GameResult::Checkmate { winner } if winner == root => MATE - ply as i32,
            GameResult::Checkmate { .. } => -(MATE - ply as i32),
            GameResult::Draw(_) => 0,
        };
    }

    let mut score = static_eval(pos.board());

    // Side-to-move terms.
    let stm_sign = pos.side_to_move().sign();
    if pos.in_check() {
        score -= CHECK_PENALTY * stm_sign;
    }
    score += MOBILITY_WEIGHT * pos.legal_moves().len() as i32 * stm_sign;

    score * root.sign()
}

/// Game phase in `0..=MAX_PHASE`; `MAX_PHASE` is the full middlegame.
pub fn game_phase(board: &Board) -> i32 {
    board
        .pieces()
        .map(|(_, p)| PHASE_WEIGHT[p.kind.index()])
        .sum::<i32>()
        .min(MAX_PHASE)
}

/// Board-only terms, from White's perspective.
fn static_eval(board: &Board) -> i32 {
    let phase = game_phase(board);
    let endgame = MAX_PHASE - phase;

    let mut pawns_on_file = [[0u8; 8]; 2];
    for (sq, p) in board.pieces() {
        if p.kind == PieceType::Pawn {
            pawns_on_file[p.color.index()][sq.file() as usize] += 1;
        }
    }

    let mut score = 0i32;
    let mut bishops = [0u32; 2];

    for (sq, piece) in board.pieces() {
        let color = piece.color;
        let idx = pst_index(sq, color);
        let mut s = piece.kind.value();

        match piece.kind {
            PieceType::King => {
                s += (KING_MG_PST[idx] * phase + KING_EG_PST[idx] * endgame) / MAX_PHASE;
            }
            PieceType::Pawn => {
                s += PAWN_PST[idx];
                let advanced = match color {
                    Color::White => sq.rank() as i32 - 1,
                    Color::Black => 6 - sq.rank() as i32,
                };
                s += advanced * PAWN_ADVANCE_BONUS * endgame / MAX_PHASE;
            }
            PieceType::Rook => {
                s += PST[PieceType::Rook.index()][idx];
                let file = sq.file() as usize;
                if pawns_on_file[color.index()][file] == 0 {
                    s += if pawns_on_file[(!color).index()][file] == 0 {
                        ROOK_OPEN_FILE_BONUS
                    } else {
                        ROOK_HALF_OPEN_FILE_BONUS
                    };
                }
            }
            PieceType::Bishop => {
                bishops[color.index()] += 1;
                s += PST[PieceType::Bishop.index()][idx];
            }
            kind => s += PST[kind.index()][idx],
        }

        score += s * color.sign();
    }

    for color in Color::BOTH {
        if bishops[color.index()] >= 2 {
            score += BISHOP_PAIR_BONUS * color.sign();
        }
    }

    score
}

/// Index into a White-perspective table for a piece of `color` on `sq`.
#[inline]
fn pst_index(sq: Square, color: Color) -> usize {
    match color {
        Color::White => sq.index(),
        Color::Black => sq.flip().index(),
    }
}

// =========================================================================
// Tests
// =========================================================================
