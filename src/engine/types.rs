use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const BOTH: [Color; 2] = [Color::White, Color::Black];

    /// White = 0, Black = 1.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// +1 for White, -1 for Black. Handy for white-relative scores.
    #[inline]
    pub const fn sign(self) -> i32 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

impl std::ops::Not for Color {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        Color::BOTH[1 - self.index()]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PieceType / Piece
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// Lowercase FEN letters, in `PieceType::index` order.
const PIECE_LETTERS: [char; 6] = ['p', 'n', 'b', 'r', 'q', 'k'];

impl PieceType {
    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    /// Pieces a pawn may promote to, strongest first.
    pub const PROMOTIONS: [PieceType; 4] = [
        PieceType::Queen,
        PieceType::Rook,
        PieceType::Bishop,
        PieceType::Knight,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Centipawns. The king has no material value.
    pub fn value(self) -> i32 {
        match self {
            PieceType::Pawn => 100,
            PieceType::Knight => 320,
            PieceType::Bishop => 330,
            PieceType::Rook => 500,
            PieceType::Queen => 900,
            PieceType::King => 0,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PieceType::Pawn => "pawn",
            PieceType::Knight => "knight",
            PieceType::Bishop => "bishop",
            PieceType::Rook => "rook",
            PieceType::Queen => "queen",
            PieceType::King => "king",
        }
    }

    /// FEN letter: uppercase for White.
    pub fn to_char(self, color: Color) -> char {
        let letter = PIECE_LETTERS[self.index()];
        if color == Color::White {
            letter.to_ascii_uppercase()
        } else {
            letter
        }
    }

    /// Inverse of [`PieceType::to_char`].
    pub fn from_char(c: char) -> Option<(Color, PieceType)> {
        let lower = c.to_ascii_lowercase();
        let idx = PIECE_LETTERS.iter().position(|&l| l == lower)?;
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some((color, PieceType::ALL[idx]))
    }

    /// Promotion piece from a UCI suffix letter (`q`, `r`, `b`, `n`).
    pub fn from_promotion_char(c: char) -> Option<PieceType> {
        PieceType::from_char(c)
            .map(|(_, kind)| kind)
            .filter(|kind| PieceType::PROMOTIONS.contains(kind))
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A coloured piece occupying a board slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Piece {
    #[serde(rename = "type")]
    pub kind: PieceType,
    pub color: Color,
}

impl Piece {
    #[inline]
    pub const fn new(color: Color, kind: PieceType) -> Self {
        Piece { kind, color }
    }

    pub fn to_char(self) -> char {
        self.kind.to_char(self.color)
    }

    pub fn from_char(c: char) -> Option<Self> {
        PieceType::from_char(c).map(|(color, kind)| Piece::new(color, kind))
    }
}

// ---------------------------------------------------------------------------
// Square
// ---------------------------------------------------------------------------

/// Board square, indexed row-major from the top-left: a8 = 0, h8 = 7,
/// a1 = 56, h1 = 63. This is the order ranks appear in FEN.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(pub u8);

impl Square {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// 0 = a file, 7 = h file.
    #[inline]
    pub const fn file(self) -> u8 {
        self.0 & 7
    }

    /// Array row; 0 is rank 8.
    #[inline]
    pub const fn row(self) -> u8 {
        self.0 >> 3
    }

    /// 0 = rank 1, 7 = rank 8.
    #[inline]
    pub const fn rank(self) -> u8 {
        7 - self.row()
    }

    #[inline]
    pub fn from_file_rank(file: u8, rank: u8) -> Self {
        debug_assert!(file < 8 && rank < 8, "off-board file {file} rank {rank}");
        Square((7 - rank) * 8 + file)
    }

    /// Step by a (file, rank) delta, or `None` when it leaves the board.
    #[inline]
    pub fn offset(self, file_delta: i8, rank_delta: i8) -> Option<Self> {
        let file = self.file() as i8 + file_delta;
        let rank = self.rank() as i8 + rank_delta;
        if (0..8).contains(&file) && (0..8).contains(&rank) {
            Some(Square::from_file_rank(file as u8, rank as u8))
        } else {
            None
        }
    }

    /// Vertical mirror (a1 <-> a8). Lets white-oriented tables serve Black.
    #[inline]
    pub const fn flip(self) -> Self {
        Square(self.0 ^ 56)
    }

    /// Light squares are those where file + rank is odd (h1 is light).
    #[inline]
    pub const fn is_light(self) -> bool {
        (self.file() + self.rank()) & 1 == 1
    }

    /// `"e4"` to a square; `None` for anything else.
    pub fn from_algebraic(s: &str) -> Option<Self> {
        match s.as_bytes() {
            &[f @ b'a'..=b'h', r @ b'1'..=b'8'] => Some(Square::from_file_rank(f - b'a', r - b'1')),
            _ => None,
        }
    }

    /// Like [`Square::from_algebraic`], but reports a descriptive error.
    pub fn parse(s: &str) -> Result<Self, ChessError> {
        Square::from_algebraic(s).ok_or_else(|| ChessError::InvalidSquare(s.to_string()))
    }

    pub fn to_algebraic(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.file()) as char;
        write!(f, "{file}{}", self.rank() + 1)
    }
}

impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_algebraic())
    }
}

// ---------------------------------------------------------------------------
// MoveFlags
// ---------------------------------------------------------------------------

/// Flags for special pawn moves packed in a single byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MoveFlags(pub u8);

impl MoveFlags {
    pub const NONE: MoveFlags = MoveFlags(0);
    pub const EN_PASSANT: MoveFlags = MoveFlags(1);
    pub const DOUBLE_PUSH: MoveFlags = MoveFlags(2);

    #[inline]
    pub fn is_en_passant(self) -> bool {
        self.0 & Self::EN_PASSANT.0 != 0
    }

    #[inline]
    pub fn is_double_push(self) -> bool {
        self.0 & Self::DOUBLE_PUSH.0 != 0
    }
}

impl std::ops::BitOr for MoveFlags {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        MoveFlags(self.0 | rhs.0)
    }
}

// ---------------------------------------------------------------------------
// CastleSide
// ---------------------------------------------------------------------------

/// Which rook the king castles with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CastleSide {
    King,
    Queen,
}

impl CastleSide {
    /// `'K'` or `'Q'`, as in FEN castling fields.
    pub fn as_char(self) -> char {
        match self {
            CastleSide::King => 'K',
            CastleSide::Queen => 'Q',
        }
    }
}

impl Serialize for CastleSide {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(self.as_char())
    }
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// A fully described chess move.
///
/// Moves are produced by the generator, so every field is consistent with the
/// position they were generated from; two moves from the same position compare
/// equal exactly when they are the same move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    /// Type of the piece being moved (a pawn for promotions).
    pub piece: PieceType,
    pub color: Color,
    pub capture: Option<PieceType>,
    pub promotion: Option<PieceType>,
    pub castle: Option<CastleSide>,
    pub flags: MoveFlags,
}

impl Move {
    pub fn new(from: Square, to: Square, piece: PieceType, color: Color) -> Self {
        Move {
            from,
            to,
            piece,
            color,
            capture: None,
            promotion: None,
            castle: None,
            flags: MoveFlags::NONE,
        }
    }

    pub fn with_capture(mut self, captured: PieceType) -> Self {
        self.capture = Some(captured);
        self
    }

    pub fn with_promotion(mut self, promotion: PieceType) -> Self {
        self.promotion = Some(promotion);
        self
    }

    pub fn with_flags(mut self, flags: MoveFlags) -> Self {
        self.flags = self.flags | flags;
        self
    }

    pub fn with_castle(mut self, side: CastleSide) -> Self {
        self.castle = Some(side);
        self
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.capture.is_some()
    }

    #[inline]
    pub fn is_en_passant(&self) -> bool {
        self.flags.is_en_passant()
    }

    #[inline]
    pub fn is_double_push(&self) -> bool {
        self.flags.is_double_push()
    }

    #[inline]
    pub fn is_castle(&self) -> bool {
        self.castle.is_some()
    }

    /// UCI-style text: `e2e4`, `a7a8q`.
    pub fn to_uci(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(promo) = self.promotion {
            write!(f, "{}", promo.to_char(Color::Black))?;
        }
        Ok(())
    }
}

impl Serialize for Move {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Move", 10)?;
        s.serialize_field("from", &self.from)?;
        s.serialize_field("to", &self.to)?;
        s.serialize_field("movingPieceType", &self.piece)?;
        s.serialize_field("color", &self.color)?;
        s.serialize_field("capture", &self.capture)?;
        s.serialize_field("promotion", &self.promotion)?;
        s.serialize_field("isCastle", &self.castle)?;
        s.serialize_field("isEnPassant", &self.is_en_passant())?;
        s.serialize_field("isDoublePawnPush", &self.is_double_push())?;
        s.serialize_field("uci", &self.to_uci())?;
        s.end()
    }
}

// ---------------------------------------------------------------------------
// CastlingRights
// ---------------------------------------------------------------------------

/// Castling availability bitfield: bits 0-3 = WK, WQ, BK, BQ.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CastlingRights(pub u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 1;
    pub const WHITE_QUEENSIDE: u8 = 2;
    pub const BLACK_KINGSIDE: u8 = 4;
    pub const BLACK_QUEENSIDE: u8 = 8;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// The single flag bit for one colour and side.
    #[inline]
    pub const fn flag(color: Color, side: CastleSide) -> u8 {
        match (color, side) {
            (Color::White, CastleSide::King) => Self::WHITE_KINGSIDE,
            (Color::White, CastleSide::Queen) => Self::WHITE_QUEENSIDE,
            (Color::Black, CastleSide::King) => Self::BLACK_KINGSIDE,
            (Color::Black, CastleSide::Queen) => Self::BLACK_QUEENSIDE,
        }
    }

    #[inline]
    pub fn has(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    #[inline]
    pub fn remove(&mut self, flag: u8) {
        self.0 &= !flag;
    }

    #[inline]
    pub fn can_castle(self, color: Color, side: CastleSide) -> bool {
        self.has(Self::flag(color, side))
    }

    #[inline]
    pub fn can_castle_kingside(self, color: Color) -> bool {
        self.can_castle(color, CastleSide::King)
    }

    #[inline]
    pub fn can_castle_queenside(self, color: Color) -> bool {
        self.can_castle(color, CastleSide::Queen)
    }

    /// Parse FEN castling string (e.g. "KQkq", "-", "Kq").
    pub fn from_fen(s: &str) -> Option<Self> {
        if s == "-" {
            return Some(CastlingRights::NONE);
        }
        if s.is_empty() {
            return None;
        }
        let mut rights = 0u8;
        for c in s.chars() {
            match c {
                'K' => rights |= Self::WHITE_KINGSIDE,
                'Q' => rights |= Self::WHITE_QUEENSIDE,
                'k' => rights |= Self::BLACK_KINGSIDE,
                'q' => rights |= Self::BLACK_QUEENSIDE,
                _ => return None,
            }
        }
        Some(CastlingRights(rights))
    }

    /// Convert to FEN castling string.
    pub fn to_fen(self) -> String {
        if self.0 == 0 {
            return "-".to_string();
        }
        let mut s = String::with_capacity(4);
        if self.has(Self::WHITE_KINGSIDE) {
            s.push('K');
        }
        if self.has(Self::WHITE_QUEENSIDE) {
            s.push('Q');
        }
        if self.has(Self::BLACK_KINGSIDE) {
            s.push('k');
        }
        if self.has(Self::BLACK_QUEENSIDE) {
            s.push('q');
        }
        s
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_fen())
    }
}

// ---------------------------------------------------------------------------
// GameResult, draws
// ---------------------------------------------------------------------------

/// Why a game ended in a draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawReason {
    Stalemate,
    InsufficientMaterial,
    ThreefoldRepetition,
    FivefoldRepetition,
    FiftyMoveRule,
    SeventyFiveMoveRule,
}

impl DrawReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrawReason::Stalemate => "stalemate",
            DrawReason::InsufficientMaterial => "insufficient_material",
            DrawReason::ThreefoldRepetition => "threefold_repetition",
            DrawReason::FivefoldRepetition => "fivefold_repetition",
            DrawReason::FiftyMoveRule => "fifty_move_rule",
            DrawReason::SeventyFiveMoveRule => "seventy_five_move_rule",
        }
    }
}

impl fmt::Display for DrawReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome of a position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameResult {
    Checkmate { winner: Color },
    Draw(DrawReason),
}

impl GameResult {
    /// `"checkmate"` or the draw reason.
    pub fn reason(&self) -> &'static str {
        match self {
            GameResult::Checkmate { .. } => "checkmate",
            GameResult::Draw(reason) => reason.as_str(),
        }
    }

    pub fn winner(&self) -> Option<Color> {
        match self {
            GameResult::Checkmate { winner } => Some(*winner),
            GameResult::Draw(_) => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        matches!(self, GameResult::Draw(_))
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Checkmate { winner } => write!(f, "checkmate ({winner} wins)"),
            GameResult::Draw(reason) => write!(f, "draw ({reason})"),
        }
    }
}

impl Serialize for GameResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("GameResult", 3)?;
        s.serialize_field("type", if self.is_draw() { "draw" } else { "win" })?;
        s.serialize_field("reason", self.reason())?;
        s.serialize_field("winner", &self.winner())?;
        s.end()
    }
}

/// Draws that are available but only happen when a player claims them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawClaims {
    pub threefold: bool,
    pub fifty_move: bool,
}

/// A draw a player can claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawClaim {
    Threefold,
    FiftyMove,
}

impl DrawClaim {
    pub fn reason(self) -> DrawReason {
        match self {
            DrawClaim::Threefold => DrawReason::ThreefoldRepetition,
            DrawClaim::FiftyMove => DrawReason::FiftyMoveRule,
        }
    }
}

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

/// AI difficulty levels, weakest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Beginner,
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Expert,
    ];

    /// Parse from string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Some(Difficulty::Beginner),
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            "expert" => Some(Difficulty::Expert),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
        }
    }
}

impl FromStr for Difficulty {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::from_str_loose(s).ok_or_else(|| ChessError::UnknownDifficulty(s.to_string()))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ChessError
// ---------------------------------------------------------------------------

/// Domain errors for the chess engine.
#[derive(Debug, thiserror::Error)]
pub enum ChessError {
    #[error("invalid move: {from} -> {to}: {reason}")]
    InvalidMove {
        from: String,
        to: String,
        reason: String,
    },

    #[error("invalid FEN string: {0}")]
    InvalidFen(String),

    #[error("invalid square notation: {0}")]
    InvalidSquare(String),

    #[error("game is already over: {0}")]
    GameOver(String),

    #[error("invalid promotion piece: {0}")]
    InvalidPromotion(String),

    #[error("draw cannot be claimed: {0}")]
    DrawNotClaimable(String),

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
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

    #[test]
    fn color_toggle() {
        assert_eq!(!Color::White, Color::Black);
        assert_eq!(!Color::Black, Color::White);
    }

    #[test]
    fn color_display() {
        assert_eq!(Color::White.to_string(), "white");
        assert_eq!(Color::Black.to_string(), "black");
    }

    #[test]
    fn piece_type_values() {
        assert_eq!(PieceType::Pawn.value(), 100);
        assert_eq!(PieceType::Knight.value(), 320);
        assert_eq!(PieceType::Bishop.value(), 330);
        assert_eq!(PieceType::Rook.value(), 500);
        assert_eq!(PieceType::Queen.value(), 900);
        assert_eq!(PieceType::King.value(), 0);
    }

    #[test]
    fn piece_char_round_trip() {
        for pt in PieceType::ALL {
            for color in Color::BOTH {
                let piece = Piece::new(color, pt);
                assert_eq!(Piece::from_char(piece.to_char()), Some(piece));
            }
        }
        assert_eq!(Piece::from_char('x'), None);
        assert_eq!(Piece::from_char('1'), None);
    }

    #[test]
    fn square_layout_is_rank_eight_first() {
        assert_eq!(sq("a8"), Square(0));
        assert_eq!(sq("h8"), Square(7));
        assert_eq!(sq("a1"), Square(56));
        assert_eq!(sq("h1"), Square(63));
        assert_eq!(sq("e4"), Square(36));
    }

    #[test]
    fn square_algebraic_round_trip() {
        for i in 0..64 {
            let s = Square(i);
            assert_eq!(Square::from_algebraic(&s.to_algebraic()), Some(s));
        }
    }

    #[test]
    fn square_file_rank_row() {
        let e4 = sq("e4");
        assert_eq!(e4.file(), 4);
        assert_eq!(e4.rank(), 3);
        assert_eq!(e4.row(), 4);
        assert_eq!(Square::from_file_rank(4, 3), e4);
    }

    #[test]
    fn square_parse_errors() {
        assert!(Square::parse("e4").is_ok());
        for bad in ["", "a", "a9", "i1", "abc"] {
            assert!(
                matches!(Square::parse(bad), Err(ChessError::InvalidSquare(_))),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn square_offset_stays_on_board() {
        assert_eq!(sq("e4").offset(1, 2), Some(sq("f6")));
        assert_eq!(sq("a1").offset(-1, 0), None);
        assert_eq!(sq("h8").offset(0, 1), None);
    }

    #[test]
    fn square_colors() {
        assert!(!sq("a1").is_light());
        assert!(sq("h1").is_light());
        assert!(sq("a8").is_light());
        assert_eq!(sq("c1").is_light(), sq("f8").is_light());
    }

    #[test]
    fn move_uci_text() {
        let push = Move::new(sq("e2"), sq("e4"), PieceType::Pawn, Color::White)
            .with_flags(MoveFlags::DOUBLE_PUSH);
        assert_eq!(push.to_uci(), "e2e4");
        assert!(push.is_double_push());
        assert!(!push.is_capture());

        let promo = Move::new(sq("a7"), sq("a8"), PieceType::Pawn, Color::White)
            .with_promotion(PieceType::Queen);
        assert_eq!(promo.to_string(), "a7a8q");
    }

    #[test]
    fn move_serializes_ui_fields() {
        let ep = Move::new(sq("e5"), sq("d6"), PieceType::Pawn, Color::White)
            .with_capture(PieceType::Pawn)
            .with_flags(MoveFlags::EN_PASSANT);
        let json = serde_json::to_value(ep).unwrap();
        assert_eq!(json["from"], "e5");
        assert_eq!(json["movingPieceType"], "pawn");
        assert_eq!(json["capture"], "pawn");
        assert_eq!(json["isEnPassant"], true);
        assert_eq!(json["isCastle"], serde_json::Value::Null);
    }

    #[test]
    fn castling_rights_fen_round_trip() {
        for s in ["-", "K", "Kq", "KQkq", "kq", "Q"] {
            let cr = CastlingRights::from_fen(s).unwrap();
            assert_eq!(cr.to_fen(), s);
        }
    }

    #[test]
    fn castling_rights_flags() {
        let mut cr = CastlingRights::ALL;
        cr.remove(CastlingRights::WHITE_KINGSIDE);
        assert!(!cr.can_castle_kingside(Color::White));
        assert!(cr.can_castle_queenside(Color::White));
        assert!(cr.can_castle(Color::Black, CastleSide::King));
        assert_eq!(CastlingRights::from_fen("X"), None);
        assert_eq!(CastlingRights::from_fen(""), None);
    }

    #[test]
    fn game_result_strings() {
        let mate = GameResult::Checkmate {
            winner: Color::Black,
        };
        assert_eq!(mate.reason(), "checkmate");
        assert_eq!(mate.winner(), Some(Color::Black));
        let draw = GameResult::Draw(DrawReason::ThreefoldRepetition);
        assert_eq!(draw.reason(), "threefold_repetition");
        assert!(draw.is_draw());
        assert_eq!(draw.winner(), None);

        let json = serde_json::to_value(mate).unwrap();
        assert_eq!(json["type"], "win");
        assert_eq!(json["winner"], "black");
    }

    #[test]
    fn difficulty_from_str() {
        assert_eq!(
            Difficulty::from_str_loose("Medium"),
            Some(Difficulty::Medium)
        );
        assert_eq!("EXPERT".parse::<Difficulty>().unwrap(), Difficulty::Expert);
        assert!("godlike".parse::<Difficulty>().is_err());
        for d in Difficulty::ALL {
            assert_eq!(Difficulty::from_str_loose(d.as_str()), Some(d));
        }
    }
}
