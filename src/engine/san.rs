//! Move notation: Standard Algebraic Notation (SAN) and UCI coordinates.
//!
//! SAN examples: `e4`, `Nf3`, `Bxe5`, `O-O`, `e8=Q+`, `Raxd1#`.
//! UCI examples: `e2e4`, `e1g1`, `a7a8q`.

use crate::engine::board::Position;
use crate::engine::types::{CastleSide, ChessError, Move, PieceType, Square};

// =========================================================================
// SAN generation
// =========================================================================

/// Convert a move to SAN notation.
///
/// `legal_moves` should be the full list of legal moves in the position
/// (passed in to avoid redundant generation).
///
/// Does not append `+` or `#`; those depend on the position after the move
/// and are added by [`Position::apply_move`].
pub fn move_to_san(pos: &Position, mv: &Move, legal_moves: &[Move]) -> String {
    match mv.castle {
        Some(CastleSide::King) => return "O-O".into(),
        Some(CastleSide::Queen) => return "O-O-O".into(),
        None => {}
    }

    let mut san = String::with_capacity(8);

    if mv.piece == PieceType::Pawn {
        if mv.is_capture() {
            san.push(file_char(mv.from));
            san.push('x');
        }
        san.push_str(&mv.to.to_algebraic());
        if let Some(promo) = mv.promotion {
            san.push('=');
            san.push(piece_letter(promo));
        }
    } else {
        san.push(piece_letter(mv.piece));
        san.push_str(&disambiguation(pos, mv, legal_moves));
        if mv.is_capture() {
            san.push('x');
        }
        san.push_str(&mv.to.to_algebraic());
    }

    san
}

/// File, rank or both, whichever is needed to tell `mv` apart from other
/// moves of the same piece type to the same square.
fn disambiguation(pos: &Position, mv: &Move, legal_moves: &[Move]) -> String {
    let rivals: Vec<&Move> = legal_moves
        .iter()
        .filter(|m| {
            m.to == mv.to
                && m.from != mv.from
                && m.piece == mv.piece
                && m.color == pos.side_to_move()
                && !m.is_castle()
        })
        .collect();

    if rivals.is_empty() {
        return String::new();
    }

    let same_file = rivals.iter().any(|m| m.from.file() == mv.from.file());
    let same_rank = rivals.iter().any(|m| m.from.rank() == mv.from.rank());

    match (same_file, same_rank) {
        (false, _) => file_char(mv.from).to_string(),
        (true, false) => rank_char(mv.from).to_string(),
        (true, true) => mv.from.to_algebraic(),
    }
}

fn file_char(sq: Square) -> char {
    (b'a' + sq.file()) as char
}

fn rank_char(sq: Square) -> char {
    (b'1' + sq.rank()) as char
}

fn piece_letter(pt: PieceType) -> char {
    match pt {
        PieceType::Pawn => 'P',
        PieceType::Knight => 'N',
        PieceType::Bishop => 'B',
        PieceType::Rook => 'R',
        PieceType::Queen => 'Q',
        PieceType::King => 'K',
    }
}

// =========================================================================
// SAN parsing
// =========================================================================

fn san_error(san: &str, reason: impl Into<String>) -> ChessError {
    ChessError::InvalidMove {
        from: String::new(),
        to: san.to_string(),
        reason: reason.into(),
    }
}

/// Parse a SAN string and return the matching legal move.
///
/// Accepts standard SAN: `e4`, `Nf3`, `Bxe5`, `O-O`, `O-O-O`, `e8=Q`, etc.
/// Check/checkmate suffixes and annotation marks are ignored.
pub fn parse_san(pos: &Position, san: &str) -> Result<Move, ChessError> {
    let legal = pos.legal_moves();
    let san = san.trim().trim_end_matches(['+', '#', '!', '?']);

    let castle = match san {
        "O-O" | "0-0" => Some(CastleSide::King),
        "O-O-O" | "0-0-0" => Some(CastleSide::Queen),
        _ => None,
    };
    if let Some(side) = castle {
        return legal
            .iter()
            .find(|m| m.castle == Some(side))
            .copied()
            .ok_or_else(|| san_error(san, format!("castling '{san}' is not legal")));
    }

    let chars: Vec<char> = san.chars().collect();
    if chars.is_empty() {
        return Err(san_error(san, "empty SAN string"));
    }

    // Promotion suffix: "=Q" (or a bare trailing piece letter, "e8Q").
    let (chars, promotion) = match chars.as_slice() {
        [head @ .., '=', p] => {
            let promo = PieceType::from_promotion_char(*p)
                .ok_or_else(|| ChessError::InvalidPromotion(p.to_string()))?;
            (head, Some(promo))
        }
        [head @ .., p] if head.len() >= 2 && "QRBN".contains(*p) => {
            (head, PieceType::from_promotion_char(*p))
        }
        all => (all, None),
    };

    let (piece, rest) = match chars.split_first() {
        Some((&c, rest)) if "NBRQK".contains(c) => {
            let pt = match c {
                'N' => PieceType::Knight,
                'B' => PieceType::Bishop,
                'R' => PieceType::Rook,
                'Q' => PieceType::Queen,
                _ => PieceType::King,
            };
            (pt, rest)
        }
        _ => (PieceType::Pawn, chars),
    };

    let rest: Vec<char> = rest.iter().copied().filter(|&c| c != 'x').collect();
    if rest.len() < 2 {
        return Err(san_error(san, "SAN too short"));
    }

    let dest_str: String = rest[rest.len() - 2..].iter().collect();
    let dest = Square::parse(&dest_str)?;

    let hint = &rest[..rest.len() - 2];
    let hint_file: Option<u8> = hint
        .iter()
        .find(|c| ('a'..='h').contains(*c))
        .map(|&c| c as u8 - b'a');
    let hint_rank: Option<u8> = hint
        .iter()
        .find(|c| ('1'..='8').contains(*c))
        .map(|&c| c as u8 - b'1');

    let candidates: Vec<&Move> = legal
        .iter()
        .filter(|m| {
            m.to == dest
                && m.piece == piece
                && !m.is_castle()
                && hint_file.is_none_or(|f| m.from.file() == f)
                && hint_rank.is_none_or(|r| m.from.rank() == r)
                && m.promotion == promotion
        })
        .collect();

    match candidates.as_slice() {
        [] => Err(san_error(san, format!("no legal move matches SAN '{san}'"))),
        [only] => Ok(**only),
        many => Err(san_error(
            san,
            format!("ambiguous SAN '{san}': {} candidates", many.len()),
        )),
    }
}

// =========================================================================
// UCI
// =========================================================================

/// UCI text for a move (`e2e4`, `e7e8q`).
pub fn move_to_uci(mv: &Move) -> String {
    mv.to_uci()
}

/// Find the legal move written as `uci` in `pos`.
///
/// A promotion without a piece letter (`e7e8`) is taken as a queen
/// promotion. Returns `None` for malformed text or a move that is not legal.
pub fn find_legal_move_by_uci(pos: &Position, uci: &str) -> Option<Move> {
    let uci = uci.trim();
    if !(4..=5).contains(&uci.len()) || !uci.is_ascii() {
        return None;
    }
    let from = Square::from_algebraic(&uci[0..2])?;
    let to = Square::from_algebraic(&uci[2..4])?;
    let promotion = match uci[4..].chars().next() {
        Some(c) => Some(PieceType::from_promotion_char(c)?),
        None => None,
    };

    pos.legal_moves()
        .iter()
        .filter(|m| m.from == from && m.to == to)
        .find(|m| match (m.promotion, promotion) {
            (None, None) => true,
            (Some(p), Some(wanted)) => p == wanted,
            (Some(p), None) => p == PieceType::Queen,
            (None, Some(_)) => false,
        })
        .copied()
}

// =========================================================================
// Tests
// =========================================================================
