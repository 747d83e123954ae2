//! Playing moves: board mutation and successor positions.
//!
//! [`Board::apply_move`] performs the raw piece movement and is shared by the
//! legality filter and by position construction. [`Position::apply_move`] is
//! the game path: it validates the move, tracks repetitions and appends a
//! history record. [`Position::play_for_search`] builds the same successor
//! without touching repetition counts or history.

use std::sync::Arc;

use tracing::trace;

use crate::engine::board::{Board, Position};
use crate::engine::game::MoveRecord;
use crate::engine::san;
use crate::engine::types::{
    CastleSide, CastlingRights, ChessError, Color, GameResult, Move, Piece, PieceType, Square,
};

// ---------------------------------------------------------------------------
// Castling geometry
// ---------------------------------------------------------------------------

/// King and rook squares involved in one castling move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CastlingSquares {
    pub king_from: Square,
    pub king_to: Square,
    pub rook_from: Square,
    pub rook_to: Square,
}

impl CastlingSquares {
    /// Squares strictly between king and rook.
    pub fn must_be_empty(&self) -> impl Iterator<Item = Square> {
        let rank = self.king_from.rank();
        let (lo, hi) = ordered(self.king_from.file(), self.rook_from.file());
        (lo + 1..hi).map(move |f| Square::from_file_rank(f, rank))
    }

    /// Squares the king stands on or crosses, origin included.
    pub fn king_path(&self) -> impl Iterator<Item = Square> {
        let rank = self.king_from.rank();
        let (lo, hi) = ordered(self.king_from.file(), self.king_to.file());
        (lo..=hi).map(move |f| Square::from_file_rank(f, rank))
    }
}

fn ordered(a: u8, b: u8) -> (u8, u8) {
    if a <= b { (a, b) } else { (b, a) }
}

pub fn castling_squares(color: Color, side: CastleSide) -> CastlingSquares {
    let rank = match color {
        Color::White => 0,
        Color::Black => 7,
    };
    let (king_to, rook_from, rook_to) = match side {
        CastleSide::King => (6, 7, 5),
        CastleSide::Queen => (2, 0, 3),
    };
    CastlingSquares {
        king_from: Square::from_file_rank(4, rank),
        king_to: Square::from_file_rank(king_to, rank),
        rook_from: Square::from_file_rank(rook_from, rank),
        rook_to: Square::from_file_rank(rook_to, rank),
    }
}

/// Mask table indexed by square index. When a move touches a square, AND the
/// castling rights with this mask: a king leaving home loses both rights, a
/// rook leaving (or being captured on) its corner loses that side.
#[rustfmt::skip]
const CASTLING_MASK: [u8; 64] = {
    let mut mask = [0b1111u8; 64];
    // a8 (0), e8 (4), h8 (7)
    mask[0]  = 0b1111 & !CastlingRights::BLACK_QUEENSIDE;
    mask[4]  = 0b1111 & !(CastlingRights::BLACK_KINGSIDE | CastlingRights::BLACK_QUEENSIDE);
    mask[7]  = 0b1111 & !CastlingRights::BLACK_KINGSIDE;
    // a1 (56), e1 (60), h1 (63)
    mask[56] = 0b1111 & !CastlingRights::WHITE_QUEENSIDE;
    mask[60] = 0b1111 & !(CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE);
    mask[63] = 0b1111 & !CastlingRights::WHITE_KINGSIDE;
    mask
};

// ---------------------------------------------------------------------------
// Board mutation
// ---------------------------------------------------------------------------

impl Board {
    /// Move pieces for `mv`: vacate the origin, remove an en-passant victim,
    /// relocate the castling rook and place the (possibly promoted) piece.
    ///
    /// No legality check; `mv` must come from the generator.
    pub fn apply_move(&mut self, mv: &Move) {
        self.set(mv.from, None);

        if mv.is_en_passant() {
            // The captured pawn sits beside the origin, on the target file.
            self.set(Square::from_file_rank(mv.to.file(), mv.from.rank()), None);
        }

        if let Some(side) = mv.castle {
            let cs = castling_squares(mv.color, side);
            let rook = self.take(cs.rook_from);
            self.set(cs.rook_to, rook);
        }

        let kind = mv.promotion.unwrap_or(mv.piece);
        self.set(mv.to, Some(Piece::new(mv.color, kind)));
    }
}

// ---------------------------------------------------------------------------
// Successor positions
// ---------------------------------------------------------------------------

impl Position {
    /// Play a legal move and return the resulting position.
    ///
    /// Returns `None` when `mv` is not in this position's legal move list,
    /// which includes every move once the game is over.
    pub fn apply_move(&self, mv: &Move) -> Option<Position> {
        if !self.legal_moves.contains(mv) {
            trace!(%mv, fen = %self.to_fen(), "rejected move not in legal list");
            return None;
        }

        let mut child = self.successor(mv, true);

        let mut notation = san::move_to_san(self, mv, &self.legal_moves);
        match child.result {
            Some(GameResult::Checkmate { .. }) => notation.push('#'),
            _ if child.in_check => notation.push('+'),
            _ => {}
        }

        let record = MoveRecord {
            mv: *mv,
            san: notation,
            from: mv.from,
            to: mv.to,
            check: child.in_check,
            checkmate: matches!(child.result, Some(GameResult::Checkmate { .. })),
            fen_after: child.to_fen(),
        };
        trace!(san = %record.san, fen = %record.fen_after, "move applied");

        Arc::make_mut(&mut child.move_history).push(record.clone());
        child.last_move = Some(record);
        Some(child)
    }

    /// Parse a UCI string (`e2e4`, `e7e8q`) and play it.
    pub fn apply_uci(&self, uci: &str) -> Result<Position, ChessError> {
        if let Some(result) = self.result {
            return Err(ChessError::GameOver(result.to_string()));
        }
        let mv = san::find_legal_move_by_uci(self, uci).ok_or_else(|| ChessError::InvalidMove {
            from: uci.get(0..2).unwrap_or_default().to_string(),
            to: uci.get(2..4).unwrap_or_default().to_string(),
            reason: format!("'{uci}' is not a legal move"),
        })?;
        self.apply_move(&mv).ok_or_else(|| ChessError::InvalidMove {
            from: mv.from.to_algebraic(),
            to: mv.to.to_algebraic(),
            reason: "move not legal".to_string(),
        })
    }

    /// Parse a SAN string (`Nf3`, `exd5`, `O-O`) and play it.
    pub fn apply_san(&self, notation: &str) -> Result<Position, ChessError> {
        if let Some(result) = self.result {
            return Err(ChessError::GameOver(result.to_string()));
        }
        let mv = san::parse_san(self, notation)?;
        self.apply_move(&mv).ok_or_else(|| ChessError::InvalidMove {
            from: mv.from.to_algebraic(),
            to: mv.to.to_algebraic(),
            reason: "move not legal".to_string(),
        })
    }

    /// Successor used inside the search tree.
    ///
    /// Skips the legality lookup, repetition tracking and history; the
    /// caller must pass a move from [`Position::legal_moves`].
    pub fn play_for_search(&self, mv: &Move) -> Position {
        self.successor(mv, false)
    }

    fn successor(&self, mv: &Move, track_repetition: bool) -> Position {
        let us = self.side_to_move;
        let mut raw = self.raw();

        raw.board.apply_move(mv);

        raw.castling_rights.0 &= CASTLING_MASK[mv.from.index()] & CASTLING_MASK[mv.to.index()];

        raw.en_passant = if mv.is_double_push() {
            Some(Square::from_file_rank(
                mv.from.file(),
                (mv.from.rank() + mv.to.rank()) / 2,
            ))
        } else {
            None
        };

        if mv.piece == PieceType::Pawn || mv.is_capture() {
            raw.halfmove_clock = 0;
        } else {
            raw.halfmove_clock = raw.halfmove_clock.saturating_add(1);
        }

        if us == Color::Black {
            raw.fullmove_number = raw.fullmove_number.saturating_add(1);
        }

        if mv.piece == PieceType::King {
            raw.king_squares[us.index()] = mv.to;
        }

        raw.side_to_move = !us;

        Position::assemble(
            raw,
            Arc::clone(&self.repetitions),
            Arc::clone(&self.move_history),
            track_repetition,
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    fn play(p: &Position, uci: &str) -> Position {
        p.apply_uci(uci)
            .unwrap_or_else(|e| panic!("{uci} failed: {e}"))
    }

    #[test]
    fn castling_geometry() {
        let wk = castling_squares(Color::White, CastleSide::King);
        assert_eq!(wk.king_from, sq("e1"));
        assert_eq!(wk.king_to, sq("g1"));
        assert_eq!(wk.rook_from, sq("h1"));
        assert_eq!(wk.rook_to, sq("f1"));
        assert_eq!(wk.must_be_empty().collect::<Vec<_>>(), vec![sq("f1"), sq("g1")]);

        let bq = castling_squares(Color::Black, CastleSide::Queen);
        assert_eq!(bq.rook_from, sq("a8"));
        assert_eq!(
            bq.must_be_empty().collect::<Vec<_>>(),
            vec![sq("b8"), sq("c8"), sq("d8")]
        );
        assert_eq!(
            bq.king_path().collect::<Vec<_>>(),
            vec![sq("c8"), sq("d8"), sq("e8")]
        );
    }

    #[test]
    fn double_push_sets_en_passant() {
        let p = play(&Position::starting(), "e2e4");
        assert_eq!(p.en_passant(), Some(sq("e3")));
        assert_eq!(p.side_to_move(), Color::Black);
        assert_eq!(p.halfmove_clock(), 0);
        assert_eq!(p.fullmove_number(), 1);
        let p = play(&p, "g8f6");
        assert_eq!(p.en_passant(), None);
        assert_eq!(p.halfmove_clock(), 1);
        assert_eq!(p.fullmove_number(), 2);
    }

    #[test]
    fn en_passant_removes_captured_pawn() {
        let mut p = Position::starting();
        for uci in ["e2e4", "a7a6", "e4e5", "d7d5"] {
            p = play(&p, uci);
        }
        assert_eq!(p.en_passant(), Some(sq("d6")));
        let p = play(&p, "e5d6");
        assert_eq!(p.piece_at(sq("d5")), None);
        assert_eq!(
            p.piece_at(sq("d6")),
            Some(Piece::new(Color::White, PieceType::Pawn))
        );
        assert_eq!(p.last_move().unwrap().san, "exd6");
    }

    #[test]
    fn castling_moves_rook_and_clears_rights() {
        let p = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let p = play(&p, "e1g1");
        assert!(p.board().is(sq("g1"), Color::White, PieceType::King));
        assert!(p.board().is(sq("f1"), Color::White, PieceType::Rook));
        assert_eq!(p.piece_at(sq("h1")), None);
        assert!(!p.castling_rights().can_castle_kingside(Color::White));
        assert!(!p.castling_rights().can_castle_queenside(Color::White));
        assert!(p.castling_rights().can_castle_kingside(Color::Black));
        assert_eq!(p.king_square(Color::White), sq("g1"));
        assert_eq!(p.last_move().unwrap().san, "O-O");

        let p = play(&p, "e8c8");
        assert!(p.board().is(sq("d8"), Color::Black, PieceType::Rook));
        assert_eq!(p.castling_rights(), CastlingRights::NONE);
        assert_eq!(p.last_move().unwrap().san, "O-O-O");
    }

    #[test]
    fn rook_capture_clears_opponent_right() {
        let p = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let p = play(&p, "a1a8");
        assert!(!p.castling_rights().can_castle_queenside(Color::Black));
        assert!(!p.castling_rights().can_castle_queenside(Color::White));
        assert!(p.castling_rights().can_castle_kingside(Color::Black));
        assert_eq!(p.last_move().unwrap().san, "Rxa8+");
    }

    #[test]
    fn capture_resets_halfmove_clock() {
        let p = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 7 1");
        assert_eq!(play(&p, "a1a8").halfmove_clock(), 0);
        assert_eq!(play(&p, "a1a2").halfmove_clock(), 8);
    }

    #[test]
    fn king_step_revokes_both_rights() {
        let p = pos("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let p = play(&p, "e1e2");
        assert_eq!(p.castling_rights().to_fen(), "kq");
        // Walking back home does not restore them.
        let p = play(&play(&p, "a8b8"), "e2e1");
        assert_eq!(p.castling_rights().to_fen(), "k");
    }

    #[test]
    fn promotion_places_new_piece() {
        let p = pos("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        let queen = play(&p, "a7a8q");
        assert!(queen.board().is(sq("a8"), Color::White, PieceType::Queen));
        assert_eq!(queen.last_move().unwrap().san, "a8=Q+");
        let knight = play(&p, "a7a8n");
        assert!(knight.board().is(sq("a8"), Color::White, PieceType::Knight));
    }

    #[test]
    fn illegal_move_returns_none() {
        let p = Position::starting();
        let bogus = Move::new(sq("e2"), sq("e5"), PieceType::Pawn, Color::White);
        assert!(p.apply_move(&bogus).is_none());
        assert!(p.apply_uci("e2e5").is_err());
        assert!(p.apply_uci("zz").is_err());
    }

    #[test]
    fn parent_is_not_modified() {
        let p = Position::starting();
        let before = p.to_fen();
        let child = play(&p, "e2e4");
        assert_eq!(p.to_fen(), before);
        assert!(p.move_history().is_empty());
        assert_eq!(child.move_history().len(), 1);
        assert_eq!(p.repetition_count(), 1);
    }

    #[test]
    fn search_successor_skips_history() {
        let p = Position::starting();
        let mv = p.legal_moves()[0];
        let child = p.play_for_search(&mv);
        assert!(child.move_history().is_empty());
        assert!(child.last_move().is_none());
        assert_eq!(child.repetition_count(), 0);
        assert_eq!(
            child.to_fen(),
            p.apply_move(&mv).unwrap().to_fen()
        );
    }

    #[test]
    fn history_records_fen_after() {
        let p = play(&Position::starting(), "g1f3");
        let rec = p.last_move().unwrap();
        assert_eq!(rec.san, "Nf3");
        assert_eq!(rec.from, sq("g1"));
        assert_eq!(rec.to, sq("f3"));
        assert!(!rec.check);
        assert_eq!(rec.fen_after, p.to_fen());
    }

    #[test]
    fn apply_san_parses_notation() {
        let p = Position::starting().apply_san("Nf3").unwrap();
        assert!(p.board().is(sq("f3"), Color::White, PieceType::Knight));
        assert!(Position::starting().apply_san("Nf4").is_err());
    }
}
