//! Mailbox board and immutable chess position.
//!
//! `Board` is a plain 64-slot array indexed row-major from a8, so it can be
//! copied cheaply onto hypothetical boards during legality checks and search.
//! `Position` wraps a board with the rest of the FEN state plus everything
//! derived from it: legal moves, check, result, draw claims, repetition
//! counts and move history. A position is never mutated once built; every
//! move produces a new one (see `engine::apply`).

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::attacks;
use crate::engine::game::{self, MoveRecord};
use crate::engine::movegen;
use crate::engine::types::{
    CastlingRights, ChessError, Color, DrawClaims, GameResult, Move, Piece, PieceType, Square,
};
use crate::engine::zobrist;

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// 64 squares, each empty or holding a piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [Option<Piece>; 64],
}

impl Board {
    pub const fn empty() -> Self {
        Board {
            squares: [None; 64],
        }
    }

    #[inline]
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()]
    }

    #[inline]
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.squares[sq.index()] = piece;
    }

    /// Remove and return whatever stands on `sq`.
    #[inline]
    pub fn take(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()].take()
    }

    #[inline]
    pub fn is_empty(&self, sq: Square) -> bool {
        self.squares[sq.index()].is_none()
    }

    /// Does `sq` hold a piece of exactly this colour and type?
    #[inline]
    pub fn is(&self, sq: Square, color: Color, kind: PieceType) -> bool {
        self.squares[sq.index()] == Some(Piece::new(color, kind))
    }

    /// Occupied squares in index order (a8 first).
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.map(|p| (Square(i as u8), p)))
    }

    pub fn count(&self, color: Color, kind: PieceType) -> usize {
        self.pieces()
            .filter(|(_, p)| p.color == color && p.kind == kind)
            .count()
    }

    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, p)| p.color == color && p.kind == PieceType::King)
            .map(|(sq, _)| sq)
    }

    /// Parse FEN field 1 (piece placement).
    pub fn from_fen_placement(placement: &str) -> Result<Self, ChessError> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::InvalidFen(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        let mut board = Board::empty();
        for (row, rank_str) in ranks.iter().enumerate() {
            let rank_no = 8 - row;
            let mut file: u8 = 0;
            for ch in rank_str.chars() {
                if file > 7 {
                    return Err(ChessError::InvalidFen(format!(
                        "too many squares in rank {rank_no}"
                    )));
                }
                if let Some(digit) = ch.to_digit(10) {
                    if !(1..=8).contains(&digit) {
                        return Err(ChessError::InvalidFen(format!(
                            "invalid empty count '{ch}' in rank {rank_no}"
                        )));
                    }
                    file += digit as u8;
                } else if let Some(piece) = Piece::from_char(ch) {
                    board.set(Square(row as u8 * 8 + file), Some(piece));
                    file += 1;
                } else {
                    return Err(ChessError::InvalidFen(format!(
                        "invalid character '{ch}' in piece placement"
                    )));
                }
            }
            if file != 8 {
                return Err(ChessError::InvalidFen(format!(
                    "rank {rank_no} has {file} squares instead of 8"
                )));
            }
        }
        Ok(board)
    }

    /// Render FEN field 1.
    pub fn fen_placement(&self) -> String {
        let mut fen = String::with_capacity(64);
        for row in 0..8u8 {
            let mut empty_count = 0u8;
            for file in 0..8u8 {
                match self.squares[(row * 8 + file) as usize] {
                    Some(piece) => {
                        if empty_count > 0 {
                            fen.push((b'0' + empty_count) as char);
                            empty_count = 0;
                        }
                        fen.push(piece.to_char());
                    }
                    None => empty_count += 1,
                }
            }
            if empty_count > 0 {
                fen.push((b'0' + empty_count) as char);
            }
            if row < 7 {
                fen.push('/');
            }
        }
        fen
    }
}

/// Back-rank order from the a file.
const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

impl Board {
    /// Standard initial setup.
    pub fn starting() -> Self {
        let mut board = Board::empty();
        for (file, kind) in (0u8..).zip(BACK_RANK) {
            let mut put = |rank, color, kind| {
                board.set(Square::from_file_rank(file, rank), Some(Piece::new(color, kind)));
            };
            put(0, Color::White, kind);
            put(1, Color::White, PieceType::Pawn);
            put(6, Color::Black, PieceType::Pawn);
            put(7, Color::Black, kind);
        }
        board
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::empty()
    }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// FEN-level state of a position, before derived fields are computed.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RawState {
    pub board: Board,
    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
    pub king_squares: [Square; 2],
}

/// An immutable chess position with its derived game state.
#[derive(Clone, Debug)]
pub struct Position {
    pub(crate) board: Board,
    pub(crate) side_to_move: Color,
    pub(crate) castling_rights: CastlingRights,
    /// En-passant target square (the square *behind* the double-pushed pawn).
    pub(crate) en_passant: Option<Square>,
    /// Plies since the last pawn move or capture.
    pub(crate) halfmove_clock: u16,
    pub(crate) fullmove_number: u16,
    pub(crate) king_squares: [Square; 2],
    /// Hash of placement, side, castling and en-passant (FEN fields 1–4).
    pub(crate) zobrist_hash: u64,

    pub(crate) legal_moves: Vec<Move>,
    pub(crate) in_check: bool,
    pub(crate) result: Option<GameResult>,
    pub(crate) draw_claims: DrawClaims,

    /// Occurrences of each repetition key in the real game so far.
    /// Shared between successive positions; copied when a game move appends.
    pub(crate) repetitions: Arc<HashMap<u64, u32>>,
    pub(crate) move_history: Arc<Vec<MoveRecord>>,
    pub(crate) last_move: Option<MoveRecord>,
}

impl Position {
    /// Standard starting position.
    pub fn starting() -> Self {
        let raw = RawState {
            board: Board::starting(),
            side_to_move: Color::White,
            castling_rights: CastlingRights::ALL,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            king_squares: [Square(60), Square(4)],
        };
        Position::assemble(raw, Arc::default(), Arc::default(), true)
    }

    /// Fill in every derived field for `raw`.
    ///
    /// With `track_repetition` the current key is appended to the repetition
    /// counts (copying the shared map); search positions skip that and leave
    /// the parent's map untouched.
    pub(crate) fn assemble(
        raw: RawState,
        repetitions: Arc<HashMap<u64, u32>>,
        move_history: Arc<Vec<MoveRecord>>,
        track_repetition: bool,
    ) -> Self {
        debug_assert!(raw.board.is(raw.king_squares[0], Color::White, PieceType::King));
        debug_assert!(raw.board.is(raw.king_squares[1], Color::Black, PieceType::King));

        let mut pos = Position {
            board: raw.board,
            side_to_move: raw.side_to_move,
            castling_rights: raw.castling_rights,
            en_passant: raw.en_passant,
            halfmove_clock: raw.halfmove_clock,
            fullmove_number: raw.fullmove_number,
            king_squares: raw.king_squares,
            zobrist_hash: 0,
            legal_moves: Vec::new(),
            in_check: false,
            result: None,
            draw_claims: DrawClaims::default(),
            repetitions,
            move_history,
            last_move: None,
        };
        pos.zobrist_hash = pos.compute_zobrist();

        let repetition_count = if track_repetition {
            let counts = Arc::make_mut(&mut pos.repetitions);
            let count = counts.entry(pos.zobrist_hash).or_insert(0);
            *count += 1;
            Some(*count)
        } else {
            None
        };

        let us = pos.side_to_move;
        pos.in_check = attacks::is_attacked(&pos.board, pos.king_square(us), !us);

        let legal = movegen::legal_moves_for(&pos, us);
        let verdict = game::evaluate_result(&pos, &legal, repetition_count);
        pos.result = verdict.result;
        pos.draw_claims = verdict.claims;
        if pos.result.is_none() {
            pos.legal_moves = legal;
        }
        pos
    }

    pub(crate) fn raw(&self) -> RawState {
        RawState {
            board: self.board,
            side_to_move: self.side_to_move,
            castling_rights: self.castling_rights,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            king_squares: self.king_squares,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board.get(sq)
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.king_squares[color.index()]
    }

    #[inline]
    pub fn zobrist_hash(&self) -> u64 {
        self.zobrist_hash
    }

    /// Legal moves for the side to move. Empty once the game is over.
    #[inline]
    pub fn legal_moves(&self) -> &[Move] {
        &self.legal_moves
    }

    #[inline]
    pub fn in_check(&self) -> bool {
        self.in_check
    }

    #[inline]
    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.result.is_some()
    }

    #[inline]
    pub fn draw_claims(&self) -> DrawClaims {
        self.draw_claims
    }

    /// How often the current position has occurred in the game so far.
    pub fn repetition_count(&self) -> u32 {
        self.repetitions
            .get(&self.zobrist_hash)
            .copied()
            .unwrap_or(0)
    }

    pub fn move_history(&self) -> &[MoveRecord] {
        &self.move_history
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.last_move.as_ref()
    }

    /// Compute the repetition key (FEN fields 1–4) from scratch.
    pub fn compute_zobrist(&self) -> u64 {
        zobrist::hash(
            &self.board,
            self.side_to_move,
            self.castling_rights,
            self.en_passant,
        )
    }
}

// ---------------------------------------------------------------------------
// FEN parsing & generation
// ---------------------------------------------------------------------------

impl Position {
    /// Parse a FEN string into a `Position`.
    ///
    /// Accepts 4 to 6 fields; a missing halfmove clock defaults to 0 and a
    /// missing fullmove number to 1. Requires exactly one king per side and no
    /// pawns on the back ranks.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(ChessError::InvalidFen(format!(
                "expected 4 to 6 fields, got {}",
                fields.len()
            )));
        }

        // ----- Field 1: Piece placement -----
        let board = Board::from_fen_placement(fields[0])?;

        let mut king_squares = [Square(0); 2];
        for color in Color::BOTH {
            let king_count = board.count(color, PieceType::King);
            if king_count != 1 {
                return Err(ChessError::InvalidFen(format!(
                    "{color} has {king_count} kings (expected 1)"
                )));
            }
            if let Some(sq) = board.find_king(color) {
                king_squares[color.index()] = sq;
            }
        }

        if let Some((sq, _)) = board
            .pieces()
            .find(|(sq, p)| p.kind == PieceType::Pawn && (sq.rank() == 0 || sq.rank() == 7))
        {
            return Err(ChessError::InvalidFen(format!(
                "pawn on back rank square {sq}"
            )));
        }

        // ----- Field 2: Side to move -----
        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(ChessError::InvalidFen(format!(
                    "invalid side to move: '{other}'"
                )));
            }
        };

        // ----- Field 3: Castling availability -----
        let castling_rights = CastlingRights::from_fen(fields[2]).ok_or_else(|| {
            ChessError::InvalidFen(format!("invalid castling string: '{}'", fields[2]))
        })?;

        // ----- Field 4: En passant target square -----
        let en_passant = if fields[3] == "-" {
            None
        } else {
            let ep_sq = Square::from_algebraic(fields[3]).ok_or_else(|| {
                ChessError::InvalidFen(format!("invalid en passant square: '{}'", fields[3]))
            })?;
            let expected_rank = match side_to_move {
                Color::White => 5,
                Color::Black => 2,
            };
            if ep_sq.rank() != expected_rank {
                return Err(ChessError::InvalidFen(format!(
                    "en passant square {} does not fit side to move",
                    fields[3]
                )));
            }
            Some(ep_sq)
        };

        // ----- Field 5: Halfmove clock -----
        let halfmove_clock = match fields.get(4) {
            Some(s) => s.parse::<u16>().map_err(|_| {
                ChessError::InvalidFen(format!("invalid halfmove clock: '{s}'"))
            })?,
            None => 0,
        };

        // ----- Field 6: Fullmove number -----
        let fullmove_number = match fields.get(5) {
            Some(s) => s.parse::<u16>().map_err(|_| {
                ChessError::InvalidFen(format!("invalid fullmove number: '{s}'"))
            })?,
            None => 1,
        };
        if fullmove_number == 0 {
            return Err(ChessError::InvalidFen(
                "fullmove number must be >= 1".to_string(),
            ));
        }

        let raw = RawState {
            board,
            side_to_move,
            castling_rights,
            en_passant,
            halfmove_clock,
            fullmove_number,
            king_squares,
        };
        Ok(Position::assemble(raw, Arc::default(), Arc::default(), true))
    }

    /// Export the position as a six-field FEN string.
    pub fn to_fen(&self) -> String {
        let ep = self
            .en_passant
            .map(|sq| sq.to_algebraic())
            .unwrap_or_else(|| "-".to_string());
        let side = match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        };
        format!(
            "{} {side} {} {ep} {} {}",
            self.board.fen_placement(),
            self.castling_rights.to_fen(),
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::starting()
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
