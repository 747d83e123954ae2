//! Game-result rules: checkmate, stalemate, automatic draws and draw claims.
//!
//! Results are computed once, when a position is assembled. Claimable draws
//! (threefold repetition, fifty-move rule) are only reported as available in
//! [`DrawClaims`]; a player turns them into a result with
//! [`Position::claim_draw`]. Fivefold repetition, the seventy-five-move rule
//! and insufficient material end the game on their own.

use serde::Serialize;
use tracing::debug;

use crate::engine::board::{Board, Position};
use crate::engine::types::{
    ChessError, Color, DrawClaim, DrawClaims, DrawReason, GameResult, Move, PieceType, Square,
};

/// Plies without pawn move or capture after which a draw may be claimed.
pub const FIFTY_MOVE_PLIES: u16 = 100;
/// Plies without pawn move or capture after which the game is drawn.
pub const SEVENTY_FIVE_MOVE_PLIES: u16 = 150;
pub const THREEFOLD: u32 = 3;
pub const FIVEFOLD: u32 = 5;

// =========================================================================
// MoveRecord
// =========================================================================

/// A move played in the game, as stored in the history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    #[serde(rename = "move")]
    pub mv: Move,
    /// SAN including the `+` / `#` suffix.
    pub san: String,
    pub from: Square,
    pub to: Square,
    pub check: bool,
    pub checkmate: bool,
    pub fen_after: String,
}

// =========================================================================
// Result evaluation
// =========================================================================

/// Outcome of evaluating a freshly assembled position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Verdict {
    pub result: Option<GameResult>,
    pub claims: DrawClaims,
}

/// Decide the result of `pos` given its generated legal moves.
///
/// `repetition_count` is `None` for search positions, which do not track
/// repetitions; repetition rules are then skipped.
pub(crate) fn evaluate_result(
    pos: &Position,
    legal: &[Move],
    repetition_count: Option<u32>,
) -> Verdict {
    if legal.is_empty() {
        let result = if pos.in_check() {
            GameResult::Checkmate {
                winner: !pos.side_to_move(),
            }
        } else {
            GameResult::Draw(DrawReason::Stalemate)
        };
        return Verdict {
            result: Some(result),
            claims: DrawClaims::default(),
        };
    }

    let automatic = if is_insufficient_material(pos.board()) {
        Some(DrawReason::InsufficientMaterial)
    } else if repetition_count.is_some_and(|n| n >= FIVEFOLD) {
        Some(DrawReason::FivefoldRepetition)
    } else if pos.halfmove_clock() >= SEVENTY_FIVE_MOVE_PLIES {
        Some(DrawReason::SeventyFiveMoveRule)
    } else {
        None
    };
    if let Some(reason) = automatic {
        return Verdict {
            result: Some(GameResult::Draw(reason)),
            claims: DrawClaims::default(),
        };
    }

    Verdict {
        result: None,
        claims: DrawClaims {
            threefold: repetition_count.is_some_and(|n| n >= THREEFOLD),
            fifty_move: pos.halfmove_clock() >= FIFTY_MOVE_PLIES,
        },
    }
}

/// Neither side can possibly mate.
///
/// Draws: K vs K, K+minor vs K, K+B+B vs K with both bishops on one square
/// colour, K+N+N vs K. Any pawn, rook or queen means mate is still possible.
pub fn is_insufficient_material(board: &Board) -> bool {
    let mut knights = [0u32; 2];
    let mut bishop_squares: [Vec<Square>; 2] = [Vec::new(), Vec::new()];

    for (sq, piece) in board.pieces() {
        match piece.kind {
            PieceType::King => {}
            PieceType::Pawn | PieceType::Rook | PieceType::Queen => return false,
            PieceType::Knight => knights[piece.color.index()] += 1,
            PieceType::Bishop => bishop_squares[piece.color.index()].push(sq),
        }
    }

    let minors = |c: Color| knights[c.index()] as usize + bishop_squares[c.index()].len();
    let (strong, weak) = if minors(Color::White) >= minors(Color::Black) {
        (Color::White, Color::Black)
    } else {
        (Color::Black, Color::White)
    };
    if minors(weak) > 0 {
        return false;
    }

    let knights = knights[strong.index()];
    let bishops = &bishop_squares[strong.index()];
    match (knights, bishops.len()) {
        (0, 0) | (1, 0) | (0, 1) => true,
        (2, 0) => true,
        (0, 2) => bishops[0].is_light() == bishops[1].is_light(),
        _ => false,
    }
}

// =========================================================================
// Draw claims
// =========================================================================

impl Position {
    /// Can `claim` be made in this position?
    pub fn can_claim(&self, claim: DrawClaim) -> bool {
        match claim {
            DrawClaim::Threefold => self.draw_claims.threefold,
            DrawClaim::FiftyMove => self.draw_claims.fifty_move,
        }
    }

    /// End the game by claiming an available draw.
    ///
    /// Returns a copy of this position with the draw recorded as its result
    /// and no legal moves.
    pub fn claim_draw(&self, claim: DrawClaim) -> Result<Position, ChessError> {
        if let Some(result) = self.result {
            return Err(ChessError::GameOver(result.to_string()));
        }
        if !self.can_claim(claim) {
            return Err(ChessError::DrawNotClaimable(format!(
                "{} is not available",
                claim.reason()
            )));
        }

        debug!(reason = %claim.reason(), fen = %self.to_fen(), "draw claimed");
        let mut claimed = self.clone();
        claimed.result = Some(GameResult::Draw(claim.reason()));
        claimed.legal_moves = Vec::new();
        claimed.draw_claims = DrawClaims::default();
        Ok(claimed)
    }
}

// =========================================================================
// Tests
// =========================================================================
