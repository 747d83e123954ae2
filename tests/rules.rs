//! End-to-end rules checks through the public API: FEN in, moves played by
//! UCI string, results and draw claims out.

use rust_chess_engine::engine::{
    Color, DrawClaim, DrawReason, GameResult, Piece, PieceType, Position, STARTING_FEN, Square,
    find_legal_move_by_uci, legal_moves, move_to_uci,
};

fn sq(name: &str) -> Square {
    Square::parse(name).unwrap()
}

fn play(pos: &Position, moves: &[&str]) -> Position {
    moves.iter().fold(pos.clone(), |p, uci| {
        p.apply_uci(uci)
            .unwrap_or_else(|e| panic!("{uci} rejected in {}: {e}", p.to_fen()))
    })
}

#[test]
fn starting_position_has_twenty_moves() {
    let pos = Position::starting();
    assert_eq!(pos.legal_moves().len(), 20);
    assert_eq!(pos.to_fen(), STARTING_FEN);
}

#[test]
fn en_passant_capture() {
    let pos = play(&Position::starting(), &["e2e4", "a7a6", "e4e5", "d7d5"]);
    let ep = find_legal_move_by_uci(&pos, "e5d6").expect("e5d6 should be legal");
    assert!(ep.is_en_passant());

    let after = pos.apply_move(&ep).unwrap();
    assert_eq!(after.piece_at(sq("d5")), None);
    assert_eq!(
        after.piece_at(sq("d6")),
        Some(Piece::new(Color::White, PieceType::Pawn))
    );
    assert_eq!(after.last_move().map(|r| r.san.as_str()), Some("exd6"));
}

#[test]
fn en_passant_expires_after_one_move() {
    let pos = play(
        &Position::starting(),
        &["e2e4", "a7a6", "e4e5", "d7d5", "h2h3", "h7h6"],
    );
    assert!(find_legal_move_by_uci(&pos, "e5d6").is_none());
}

#[test]
fn castling_both_sides() {
    let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    assert!(find_legal_move_by_uci(&pos, "e1g1").is_some());
    assert!(find_legal_move_by_uci(&pos, "e1c1").is_some());

    let after = pos.apply_uci("e1g1").unwrap();
    assert_eq!(after.piece_at(sq("g1")), Some(Piece::new(Color::White, PieceType::King)));
    assert_eq!(after.piece_at(sq("f1")), Some(Piece::new(Color::White, PieceType::Rook)));
    assert_eq!(after.piece_at(sq("h1")), None);
    assert_eq!(after.castling_rights().to_fen(), "kq");
    assert_eq!(after.last_move().map(|r| r.san.as_str()), Some("O-O"));
}

#[test]
fn no_castling_through_attacked_square() {
    // Black rook on f8 covers f1.
    let pos = Position::from_fen("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
    assert!(find_legal_move_by_uci(&pos, "e1g1").is_none());
    assert!(find_legal_move_by_uci(&pos, "e1c1").is_some());
}

#[test]
fn promotion_to_queen() {
    let pos = Position::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let after = pos.apply_uci("a7a8q").unwrap();
    assert_eq!(after.piece_at(sq("a8")), Some(Piece::new(Color::White, PieceType::Queen)));
    assert_eq!(after.piece_at(sq("a7")), None);
    assert!(after.in_check());
}

#[test]
fn underpromotion_keeps_chosen_piece() {
    let pos = Position::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let mv = find_legal_move_by_uci(&pos, "a7a8n").unwrap();
    assert_eq!(mv.promotion, Some(PieceType::Knight));
    assert_eq!(move_to_uci(&mv), "a7a8n");
}

#[test]
fn fools_mate() {
    let pos = play(&Position::starting(), &["f2f3", "e7e5", "g2g4", "d8h4"]);
    let result = pos.result().expect("game should be over");
    assert_eq!(result.reason(), "checkmate");
    assert_eq!(result.winner(), Some(Color::Black));
    assert!(pos.legal_moves().is_empty());
    let last = pos.last_move().unwrap();
    assert!(last.checkmate);
    assert_eq!(last.san, "Qh4#");
}

#[test]
fn bare_kings_are_drawn() {
    let pos = Position::from_fen("8/8/8/8/8/8/2k5/3K4 w - - 0 1").unwrap();
    assert_eq!(
        pos.result(),
        Some(GameResult::Draw(DrawReason::InsufficientMaterial))
    );
    assert!(pos.legal_moves().is_empty());
}

#[test]
fn bishop_and_knight_can_still_mate() {
    let pos = Position::from_fen("k7/8/8/8/8/8/8/2BKN3 w - - 0 1").unwrap();
    assert_eq!(pos.result(), None);
    assert!(!pos.legal_moves().is_empty());
}

#[test]
fn two_knights_are_drawn() {
    let pos = Position::from_fen("k7/8/8/8/8/8/8/3KNN2 w - - 0 1").unwrap();
    assert_eq!(pos.result().map(|r| r.reason()), Some("insufficient_material"));
}

#[test]
fn threefold_needs_a_claim() {
    let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
    let once = play(&Position::starting(), &shuffle);
    assert!(!once.draw_claims().threefold);

    let twice = play(&once, &shuffle);
    assert_eq!(twice.repetition_count(), 3);
    assert!(twice.draw_claims().threefold);
    assert_eq!(twice.result(), None);
    assert!(!twice.legal_moves().is_empty());

    let claimed = twice.claim_draw(DrawClaim::Threefold).unwrap();
    assert_eq!(claimed.result().map(|r| r.reason()), Some("threefold_repetition"));
    assert!(claimed.legal_moves().is_empty());
    assert!(claimed.claim_draw(DrawClaim::Threefold).is_err());
}

#[test]
fn fivefold_is_automatic() {
    let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
    let pos = (0..4).fold(Position::starting(), |p, _| play(&p, &shuffle));
    assert_eq!(pos.repetition_count(), 5);
    assert_eq!(
        pos.result(),
        Some(GameResult::Draw(DrawReason::FivefoldRepetition))
    );
}

#[test]
fn fifty_and_seventy_five_move_rules() {
    let claimable = Position::from_fen("4k3/8/8/8/8/8/8/1R2K3 w - - 100 80").unwrap();
    assert!(claimable.draw_claims().fifty_move);
    assert_eq!(claimable.result(), None);
    let claimed = claimable.claim_draw(DrawClaim::FiftyMove).unwrap();
    assert_eq!(claimed.result().map(|r| r.reason()), Some("fifty_move_rule"));

    let forced = Position::from_fen("4k3/8/8/8/8/8/8/1R2K3 w - - 150 100").unwrap();
    assert_eq!(
        forced.result(),
        Some(GameResult::Draw(DrawReason::SeventyFiveMoveRule))
    );
}

#[test]
fn illegal_moves_are_sentinels() {
    let pos = Position::starting();
    assert!(find_legal_move_by_uci(&pos, "e2e5").is_none());
    assert!(find_legal_move_by_uci(&pos, "zz99").is_none());
    assert!(pos.apply_uci("e2e5").is_err());
    // The input position is untouched.
    assert_eq!(pos.to_fen(), STARTING_FEN);
}

#[test]
fn generation_is_pure() {
    let pos = Position::from_fen(
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    )
    .unwrap();
    let first = legal_moves(&pos);
    let second = legal_moves(&pos);
    assert_eq!(first, second);
    assert_eq!(first.as_slice(), pos.legal_moves());
}

#[test]
fn fen_round_trip_through_play() {
    let pos = play(&Position::starting(), &["e2e4", "c7c5", "g1f3"]);
    let fen = pos.to_fen();
    assert_eq!(fen, "rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2");
    assert_eq!(Position::from_fen(&fen).unwrap().to_fen(), fen);
}

#[test]
fn malformed_fen_is_rejected() {
    for fen in [
        "",
        "8/8/8/8 w - -",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX w KQkq - 0 1",
        "rnbq1bnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQ - 0 1",
    ] {
        assert!(Position::from_fen(fen).is_err(), "{fen:?} accepted");
    }
}
