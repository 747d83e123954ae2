//! AI Engine: trait definition and the alpha-beta search behind it.
//!
//! The search is iterative-deepening negamax with alpha-beta pruning and a
//! capture-only quiescence extension. Every iteration shares one deadline and
//! one node budget; an iteration that runs out is thrown away and the last
//! completed one is used. At the root every move gets a score (searched with
//! a window slightly below the best so far) so the difficulty policy can rank
//! alternatives, not only pick the top move.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use crate::config::AppConfig;
use crate::engine::board::Position;
use crate::engine::types::{ChessError, Difficulty, Move};

use super::difficulty::{self, LevelSettings};
use super::evaluation::{INF, evaluate, is_mate_score};

/// Extra plies of captures/promotions searched below the nominal depth.
pub const QUIESCENCE_DEPTH: u32 = 4;

/// Root moves within this many centipawns of the best are searched with a
/// window wide enough to get an exact score.
const RANK_MARGIN: i32 = 200;

// =========================================================================
// AiEngine trait
// =========================================================================

/// The AI engine interface.
pub trait AiEngine: Send + Sync {
    /// Select a move for the side to move at the given difficulty.
    fn best_move(&self, pos: &Position, difficulty: Difficulty) -> Result<Move, ChessError>;

    /// Human-readable name for this engine.
    fn name(&self) -> &str;
}

// =========================================================================
// Limits & results
// =========================================================================

/// Bounds for one search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchLimits {
    pub max_depth: u32,
    pub time_limit: Duration,
    pub max_nodes: u64,
}

/// Outcome of a search.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub best_move: Option<Move>,
    /// Score of `best_move` for the side to move.
    pub score: i32,
    /// Deepest fully completed iteration (0 if none completed).
    pub depth: u32,
    pub nodes: u64,
    pub elapsed_ms: u64,
    /// Root moves with scores, best first.
    #[serde(skip)]
    pub ranked: Vec<(Move, i32)>,
}

// =========================================================================
// Move ordering (MVV-LVA)
// =========================================================================

const HASH_MOVE_BONUS: i32 = 1_000_000;
const CAPTURE_BASE: i32 = 10_000;
const PROMOTION_BASE: i32 = 8_000;
const CASTLE_BONUS: i32 = 500;

/// Score a move for ordering. Higher = searched first.
fn move_order_score(mv: &Move) -> i32 {
    let mut score = 0i32;

    // Most valuable victim, least valuable attacker.
    if let Some(victim) = mv.capture {
        score += CAPTURE_BASE + victim.value() * 12 - mv.piece.value();
    }
    if let Some(promo) = mv.promotion {
        score += PROMOTION_BASE + promo.value();
    }
    if mv.is_castle() {
        score += CASTLE_BONUS;
    }

    score
}

/// Sort moves best-first. `hash_move` (the best move found here by an earlier
/// iteration) goes to the front.
fn order_moves(moves: &mut [Move], hash_move: Option<Move>) {
    moves.sort_by_key(|m| {
        let bonus = if Some(*m) == hash_move {
            HASH_MOVE_BONUS
        } else {
            0
        };
        Reverse(bonus + move_order_score(m))
    });
}

/// Root ordering: previous iteration's scores first, static order as tiebreak.
fn order_root_moves(moves: &mut [Move], previous: &HashMap<Move, i32>) {
    moves.sort_by_key(|m| {
        let prev = previous.get(m).copied().unwrap_or(-INF);
        (Reverse(prev), Reverse(move_order_score(m)))
    });
}

// =========================================================================
// Search
// =========================================================================

struct SearchContext {
    deadline: Instant,
    max_nodes: u64,
    nodes: u64,
    aborted: bool,
    /// Best move per position hash, carried across iterations.
    best_moves: HashMap<u64, Move>,
}

impl SearchContext {
    fn new(limits: &SearchLimits) -> Self {
        Self {
            deadline: Instant::now() + limits.time_limit,
            max_nodes: limits.max_nodes,
            nodes: 0,
            aborted: false,
            best_moves: HashMap::new(),
        }
    }

    /// Count a node and check the budget (clock every 64 nodes).
    #[inline]
    fn visit(&mut self) -> bool {
        self.nodes += 1;
        if self.nodes >= self.max_nodes
            || (self.nodes & 63 == 0 && Instant::now() >= self.deadline)
        {
            self.aborted = true;
        }
        !self.aborted
    }
}

/// Run an iterative-deepening search from `pos`.
///
/// Always returns a move when `pos` has legal moves.
pub fn search(pos: &Position, limits: &SearchLimits) -> SearchResult {
    let start = Instant::now();
    let mut ctx = SearchContext::new(limits);
    let root = pos.side_to_move();

    let mut moves = pos.legal_moves().to_vec();
    if moves.is_empty() {
        return SearchResult {
            best_move: None,
            score: 0,
            depth: 0,
            nodes: 0,
            elapsed_ms: 0,
            ranked: Vec::new(),
        };
    }
    order_root_moves(&mut moves, &HashMap::new());

    let mut completed: Option<(u32, Vec<(Move, i32)>)> = None;
    let mut previous: HashMap<Move, i32> = HashMap::new();

    for depth in 1..=limits.max_depth.max(1) {
        if Instant::now() >= ctx.deadline {
            break;
        }
        order_root_moves(&mut moves, &previous);

        let mut alpha = -INF;
        let mut scored = Vec::with_capacity(moves.len());
        for mv in &moves {
            let child = pos.play_for_search(mv);
            let floor = if alpha == -INF { -INF } else { alpha - RANK_MARGIN };
            let score = -negamax(&child, depth - 1, 1, -INF, -floor, &mut ctx);
            if ctx.aborted {
                break;
            }
            scored.push((*mv, score));
            alpha = alpha.max(score);
        }

        if ctx.aborted {
            debug!(depth, nodes = ctx.nodes, "search iteration aborted");
            break;
        }

        // Stable sort keeps ordering among equal scores.
        scored.sort_by_key(|&(_, s)| Reverse(s));
        let (best, best_score) = scored[0];
        ctx.best_moves.insert(pos.zobrist_hash(), best);
        debug!(
            depth,
            nodes = ctx.nodes,
            best = %best,
            score = best_score,
            color = %root,
            "search iteration complete"
        );

        previous = scored.iter().copied().collect();
        completed = Some((depth, scored));

        if is_mate_score(best_score) && best_score > 0 {
            break;
        }
    }

    let (depth, ranked) = match completed {
        Some(done) => done,
        None => (0, vec![(moves[0], 0)]),
    };
    SearchResult {
        best_move: Some(ranked[0].0),
        score: ranked[0].1,
        depth,
        nodes: ctx.nodes,
        elapsed_ms: start.elapsed().as_millis() as u64,
        ranked,
    }
}

/// Negamax with alpha-beta pruning.
///
/// Returns score from side-to-move's perspective.
fn negamax(
    pos: &Position,
    depth: u32,
    ply: u32,
    mut alpha: i32,
    beta: i32,
    ctx: &mut SearchContext,
) -> i32 {
    if !ctx.visit() {
        return 0;
    }

    // Terminal positions are leaves at any depth.
    if pos.is_game_over() {
        return evaluate(pos, pos.side_to_move(), ply);
    }

    if depth == 0 {
        return quiescence(pos, ply, alpha, beta, QUIESCENCE_DEPTH, ctx);
    }

    let hash = pos.zobrist_hash();
    let mut moves = pos.legal_moves().to_vec();
    order_moves(&mut moves, ctx.best_moves.get(&hash).copied());

    let mut best_score = -INF;
    let mut best_move = moves[0];

    for mv in &moves {
        let child = pos.play_for_search(mv);
        let score = -negamax(&child, depth - 1, ply + 1, -beta, -alpha, ctx);
        if ctx.aborted {
            return 0;
        }

        if score > best_score {
            best_score = score;
            best_move = *mv;
        }
        if score > alpha {
            alpha = score;
        }
        if alpha >= beta {
            break; // Beta cutoff.
        }
    }

    ctx.best_moves.insert(hash, best_move);
    best_score
}

/// Capture/promotion-only search with a stand-pat lower bound.
fn quiescence(
    pos: &Position,
    ply: u32,
    mut alpha: i32,
    beta: i32,
    depth_left: u32,
    ctx: &mut SearchContext,
) -> i32 {
    if !ctx.visit() {
        return 0;
    }

    let stand_pat = evaluate(pos, pos.side_to_move(), ply);
    if pos.is_game_over() || depth_left == 0 || stand_pat >= beta {
        return stand_pat;
    }
    alpha = alpha.max(stand_pat);

    let mut tactical: Vec<Move> = pos
        .legal_moves()
        .iter()
        .filter(|m| m.is_capture() || m.promotion.is_some())
        .copied()
        .collect();
    order_moves(&mut tactical, None);

    for mv in &tactical {
        let child = pos.play_for_search(mv);
        let score = -quiescence(&child, ply + 1, -beta, -alpha, depth_left - 1, ctx);
        if ctx.aborted {
            return 0;
        }
        if score >= beta {
            return score;
        }
        alpha = alpha.max(score);
    }

    alpha
}

// =========================================================================
// SearchAi
// =========================================================================

/// Alpha-beta engine driven by the difficulty policy.
pub struct SearchAi {
    /// Upper bound on search time regardless of level.
    time_cap: Option<Duration>,
}

impl SearchAi {
    pub fn new() -> Self {
        Self { time_cap: None }
    }

    pub fn with_time_limit(time_limit: Duration) -> Self {
        Self {
            time_cap: Some(time_limit),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::with_time_limit(Duration::from_millis(config.ai_timeout_ms))
    }

    /// Level settings with this engine's time cap applied.
    pub fn settings_for(&self, difficulty: Difficulty) -> LevelSettings {
        let settings = difficulty.settings();
        match self.time_cap {
            Some(cap) => settings.with_time_cap(cap),
            None => settings,
        }
    }
}

impl Default for SearchAi {
    fn default() -> Self {
        Self::new()
    }
}

impl AiEngine for SearchAi {
    fn best_move(&self, pos: &Position, difficulty: Difficulty) -> Result<Move, ChessError> {
        let settings = self.settings_for(difficulty);
        let mut rng = rand::thread_rng();
        difficulty::choose_ai_move_with_rng(pos, &settings, &mut rng).ok_or_else(|| {
            let reason = pos
                .result()
                .map(|r| r.to_string())
                .unwrap_or_else(|| "no legal moves".to_string());
            ChessError::GameOver(reason)
        })
    }

    fn name(&self) -> &str {
        "SearchAi"
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{Color, GameResult, PieceType, Square};

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    fn limits(depth: u32) -> SearchLimits {
        SearchLimits {
            max_depth: depth,
            time_limit: Duration::from_secs(30),
            max_nodes: u64::MAX,
        }
    }

    #[test]
    fn captures_ordered_before_quiet_moves() {
        let p = pos("r1bqkb1r/pppppppp/2n2n2/4P3/8/8/PPPP1PPP/RNBQKBNR w KQkq - 1 3");
        let mut moves = p.legal_moves().to_vec();
        order_moves(&mut moves, None);
        let first_quiet = moves.iter().position(|m| !m.is_capture()).unwrap();
        assert!(moves[..first_quiet].iter().all(|m| m.is_capture()));
        assert!(moves[first_quiet..].iter().all(|m| !m.is_capture()));
    }

    #[test]
    fn mvv_lva_prefers_cheap_attacker() {
        let sq = |s: &str| Square::from_algebraic(s).unwrap();
        let pawn_takes_queen = Move::new(sq("e4"), sq("d5"), PieceType::Pawn, Color::White)
            .with_capture(PieceType::Queen);
        let queen_takes_queen = Move::new(sq("d1"), sq("d5"), PieceType::Queen, Color::White)
            .with_capture(PieceType::Queen);
        let pawn_takes_pawn = Move::new(sq("e4"), sq("f5"), PieceType::Pawn, Color::White)
            .with_capture(PieceType::Pawn);
        assert!(move_order_score(&pawn_takes_queen) > move_order_score(&queen_takes_queen));
        assert!(move_order_score(&queen_takes_queen) > move_order_score(&pawn_takes_pawn));
    }

    #[test]
    fn hash_move_goes_first() {
        let p = Position::starting();
        let mut moves = p.legal_moves().to_vec();
        let pick = *moves.last().unwrap();
        order_moves(&mut moves, Some(pick));
        assert_eq!(moves[0], pick);
    }

    #[test]
    fn finds_mate_in_one_white() {
        // Qxf7# is available.
        let p = pos("r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4");
        let result = search(&p, &limits(2));
        let mv = result.best_move.unwrap();
        assert_eq!(mv.to, Square::from_algebraic("f7").unwrap());
        assert!(is_mate_score(result.score));
    }

    #[test]
    fn finds_mate_in_one_black() {
        let p = pos("rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq g3 0 2");
        let mv = search(&p, &limits(2)).best_move.unwrap();
        let after = p.apply_move(&mv).unwrap();
        assert_eq!(
            after.result(),
            Some(GameResult::Checkmate {
                winner: Color::Black
            })
        );
    }

    #[test]
    fn captures_hanging_rook() {
        let p = pos("4k3/8/8/3r4/8/8/3Q4/4K3 w - - 0 1");
        let mv = search(&p, &limits(3)).best_move.unwrap();
        assert_eq!(mv.to, Square::from_algebraic("d5").unwrap());
    }

    #[test]
    fn quiescence_sees_recapture() {
        // Qxd5 loses the queen to exd5's recapture; depth 1 alone would miss it.
        let p = pos("4k3/8/4p3/3p4/8/8/3Q4/4K3 w - - 0 1");
        let mv = search(&p, &limits(1)).best_move.unwrap();
        assert_ne!(mv.to, Square::from_algebraic("d5").unwrap());
    }

    #[test]
    fn ranked_list_is_sorted_and_complete() {
        let p = Position::starting();
        let result = search(&p, &limits(2));
        assert_eq!(result.depth, 2);
        assert_eq!(result.ranked.len(), 20);
        assert!(result.ranked.windows(2).all(|w| w[0].1 >= w[1].1));
        assert_eq!(result.best_move, Some(result.ranked[0].0));
    }

    #[test]
    fn node_budget_still_returns_a_move() {
        let p = Position::starting();
        let result = search(
            &p,
            &SearchLimits {
                max_depth: 10,
                time_limit: Duration::from_secs(30),
                max_nodes: 5,
            },
        );
        let mv = result.best_move.unwrap();
        assert!(p.legal_moves().contains(&mv));
        assert_eq!(result.depth, 0);
        assert!(result.nodes <= 5);
    }

    #[test]
    fn time_budget_is_respected() {
        let p = pos("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
        let start = Instant::now();
        let result = search(
            &p,
            &SearchLimits {
                max_depth: 20,
                time_limit: Duration::from_millis(100),
                max_nodes: u64::MAX,
            },
        );
        assert!(result.best_move.is_some());
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn terminal_position_has_no_move() {
        let p = pos("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
        assert!(search(&p, &limits(3)).best_move.is_none());
        assert!(matches!(
            SearchAi::new().best_move(&p, Difficulty::Easy),
            Err(ChessError::GameOver(_))
        ));
    }

    #[test]
    fn engine_returns_legal_move() {
        let engine = SearchAi::with_time_limit(Duration::from_millis(200));
        assert_eq!(engine.name(), "SearchAi");
        let p = Position::starting();
        let mv = engine.best_move(&p, Difficulty::Beginner).unwrap();
        assert!(p.legal_moves().contains(&mv));
    }

    #[test]
    fn time_cap_shortens_level_budget() {
        let engine = SearchAi::with_time_limit(Duration::from_millis(50));
        let settings = engine.settings_for(Difficulty::Expert);
        assert_eq!(settings.time_ms, 50);
        assert_eq!(settings.depth, Difficulty::Expert.settings().depth);
    }
}
