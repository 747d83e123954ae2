//! Legal move generation.
//!
//! Pipeline:
//!   1. Generate pseudo-legal moves (ignoring pins / check evasion).
//!   2. Filter: play each move on a copy of the board and keep it only if the
//!      mover's king is not attacked afterwards.
//!
//! Castling is checked fully while generating (rights, home squares, empty
//! path, no attacked square on the king's path), so the filter never has to
//! reason about it.

use crate::engine::apply::castling_squares;
use crate::engine::attacks::{self, slider_directions};
use crate::engine::board::Position;
use crate::engine::types::{CastleSide, Color, Move, MoveFlags, PieceType, Square};

// =========================================================================
// Public API
// =========================================================================

/// Generate all legal moves for the side to move.
///
/// Unlike [`Position::legal_moves`] this always runs the generator and does
/// not look at the game result, so it also works on terminal positions.
pub fn legal_moves(pos: &Position) -> Vec<Move> {
    legal_moves_for(pos, pos.side_to_move())
}

/// Generate all legal moves for `color`.
///
/// En-passant captures are only produced for the side to move, since the
/// target square is only valid for that side. Kings are never captured, even
/// in a loaded position where the enemy king is already attacked.
pub fn legal_moves_for(pos: &Position, color: Color) -> Vec<Move> {
    let own_king = pos.king_square(color);
    pseudo_legal_moves(pos, color)
        .into_iter()
        .filter(|mv| mv.capture != Some(PieceType::King))
        .filter(|mv| {
            let mut board = *pos.board();
            board.apply_move(mv);
            let king = if mv.piece == PieceType::King {
                mv.to
            } else {
                own_king
            };
            !attacks::is_attacked(&board, king, !color)
        })
        .collect()
}

/// Pseudo-legal moves for `color`: piece movement rules only, king safety
/// ignored (except for castling, which is generated fully checked).
pub fn pseudo_legal_moves(pos: &Position, color: Color) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    for (from, piece) in pos.board().pieces() {
        if piece.color != color {
            continue;
        }
        match piece.kind {
            PieceType::Pawn => generate_pawn_moves(pos, color, from, &mut moves),
            PieceType::Knight => generate_leaper_moves(
                pos,
                color,
                from,
                PieceType::Knight,
                attacks::tables().knight_targets(from),
                &mut moves,
            ),
            PieceType::King => generate_leaper_moves(
                pos,
                color,
                from,
                PieceType::King,
                attacks::tables().king_targets(from),
                &mut moves,
            ),
            kind => generate_slider_moves(pos, color, from, kind, &mut moves),
        }
    }
    generate_castling_moves(pos, color, &mut moves);
    moves
}

// =========================================================================
// Pawn moves
// =========================================================================

fn generate_pawn_moves(pos: &Position, us: Color, from: Square, moves: &mut Vec<Move>) {
    let board = pos.board();
    let (forward, start_rank, promo_rank): (i8, u8, u8) = match us {
        Color::White => (1, 1, 7),
        Color::Black => (-1, 6, 0),
    };

    // --- Pushes ---
    if let Some(one) = from.offset(0, forward)
        && board.is_empty(one)
    {
        let mv = Move::new(from, one, PieceType::Pawn, us);
        if one.rank() == promo_rank {
            add_promotions(mv, moves);
        } else {
            moves.push(mv);
            if from.rank() == start_rank
                && let Some(two) = one.offset(0, forward)
                && board.is_empty(two)
            {
                moves.push(
                    Move::new(from, two, PieceType::Pawn, us).with_flags(MoveFlags::DOUBLE_PUSH),
                );
            }
        }
    }

    // --- Captures ---
    for &to in attacks::tables().pawn_attacks(us, from) {
        if let Some(target) = board.get(to) {
            if target.color != us {
                let mv = Move::new(from, to, PieceType::Pawn, us).with_capture(target.kind);
                if to.rank() == promo_rank {
                    add_promotions(mv, moves);
                } else {
                    moves.push(mv);
                }
            }
        } else if pos.en_passant() == Some(to) && pos.side_to_move() == us {
            moves.push(
                Move::new(from, to, PieceType::Pawn, us)
                    .with_capture(PieceType::Pawn)
                    .with_flags(MoveFlags::EN_PASSANT),
            );
        }
    }
}

/// Add all four promotion variants (Q, R, B, N).
fn add_promotions(base: Move, moves: &mut Vec<Move>) {
    moves.extend(PieceType::PROMOTIONS.iter().map(|&p| base.with_promotion(p)));
}

// =========================================================================
// Knight / King / sliders
// =========================================================================

fn generate_leaper_moves(
    pos: &Position,
    us: Color,
    from: Square,
    kind: PieceType,
    targets: &[Square],
    moves: &mut Vec<Move>,
) {
    for &to in targets {
        match pos.board().get(to) {
            None => moves.push(Move::new(from, to, kind, us)),
            Some(p) if p.color != us => moves.push(Move::new(from, to, kind, us).with_capture(p.kind)),
            Some(_) => {}
        }
    }
}

fn generate_slider_moves(
    pos: &Position,
    us: Color,
    from: Square,
    kind: PieceType,
    moves: &mut Vec<Move>,
) {
    let t = attacks::tables();
    for dir in slider_directions(kind) {
        for &to in t.ray(from, dir) {
            match pos.board().get(to) {
                None => moves.push(Move::new(from, to, kind, us)),
                Some(p) => {
                    if p.color != us {
                        moves.push(Move::new(from, to, kind, us).with_capture(p.kind));
                    }
                    break;
                }
            }
        }
    }
}

// =========================================================================
// Castling
// =========================================================================

fn generate_castling_moves(pos: &Position, us: Color, moves: &mut Vec<Move>) {
    let board = pos.board();
    let them = !us;

    for side in [CastleSide::King, CastleSide::Queen] {
        if !pos.castling_rights().can_castle(us, side) {
            continue;
        }
        let squares = castling_squares(us, side);
        if !board.is(squares.king_from, us, PieceType::King)
            || !board.is(squares.rook_from, us, PieceType::Rook)
        {
            continue;
        }
        if !squares.must_be_empty().all(|sq| board.is_empty(sq)) {
            continue;
        }
        // The king may not castle out of, through, or into check.
        if squares
            .king_path()
            .any(|sq| attacks::is_attacked(board, sq, them))
        {
            continue;
        }
        moves.push(
            Move::new(squares.king_from, squares.king_to, PieceType::King, us).with_castle(side),
        );
    }
}

// =========================================================================
// Tests
// =========================================================================
