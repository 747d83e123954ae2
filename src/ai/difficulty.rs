//! Difficulty levels and the final move choice.
//!
//! Each level fixes the search budget plus two ways of playing below
//! strength: a blunder roll that deliberately skips the best move, and a
//! randomness roll that samples among the top moves weighted by how close
//! their scores are to the best.

use std::time::Duration;

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use serde::Serialize;
use tracing::debug;

use crate::engine::board::Position;
use crate::engine::types::{Difficulty, Move};

use super::engine::{SearchLimits, search};

/// Score gap (centipawns) over which a move's sampling weight drops by `e`.
const SOFTMAX_TEMPERATURE: f64 = 80.0;

/// Search budget and selection noise for one level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelSettings {
    pub depth: u32,
    pub time_ms: u64,
    pub max_nodes: u64,
    /// Probability of sampling among the top choices instead of taking the best.
    pub randomness: f64,
    /// Probability of picking a move other than the best.
    pub blunder_rate: f64,
    pub top_choices: usize,
}

impl LevelSettings {
    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            max_depth: self.depth,
            time_limit: Duration::from_millis(self.time_ms),
            max_nodes: self.max_nodes,
        }
    }

    /// Clamp the time budget to `cap`.
    pub fn with_time_cap(mut self, cap: Duration) -> Self {
        self.time_ms = self.time_ms.min(cap.as_millis() as u64);
        self
    }
}

impl Difficulty {
    pub fn settings(self) -> LevelSettings {
        match self {
            Difficulty::Beginner => LevelSettings {
                depth: 1,
                time_ms: 150,
                max_nodes: 2_000,
                randomness: 0.6,
                blunder_rate: 0.25,
                top_choices: 5,
            },
            Difficulty::Easy => LevelSettings {
                depth: 2,
                time_ms: 300,
                max_nodes: 8_000,
                randomness: 0.4,
                blunder_rate: 0.12,
                top_choices: 4,
            },
            Difficulty::Medium => LevelSettings {
                depth: 3,
                time_ms: 700,
                max_nodes: 30_000,
                randomness: 0.2,
                blunder_rate: 0.05,
                top_choices: 3,
            },
            Difficulty::Hard => LevelSettings {
                depth: 4,
                time_ms: 1_200,
                max_nodes: 90_000,
                randomness: 0.08,
                blunder_rate: 0.0,
                top_choices: 2,
            },
            Difficulty::Expert => LevelSettings {
                depth: 6,
                time_ms: 2_000,
                max_nodes: 250_000,
                randomness: 0.0,
                blunder_rate: 0.0,
                top_choices: 1,
            },
        }
    }
}

/// Pick the engine's move for `pos` at `difficulty`, using the thread RNG.
pub fn choose_ai_move(pos: &Position, difficulty: Difficulty) -> Option<Move> {
    choose_ai_move_with_rng(pos, &difficulty.settings(), &mut rand::thread_rng())
}

/// Pick the engine's move with an explicit RNG.
///
/// Returns `None` only when `pos` has no legal moves. A single legal move is
/// returned without searching.
pub fn choose_ai_move_with_rng<R: Rng + ?Sized>(
    pos: &Position,
    settings: &LevelSettings,
    rng: &mut R,
) -> Option<Move> {
    match pos.legal_moves() {
        [] => None,
        [only] => Some(*only),
        _ => {
            let result = search(pos, &settings.limits());
            debug!(
                depth = result.depth,
                nodes = result.nodes,
                elapsed_ms = result.elapsed_ms,
                score = result.score,
                "search finished"
            );
            select_move(&result.ranked, settings, rng)
        }
    }
}

/// Apply the level's blunder and randomness rolls to a ranked move list
/// (best first).
pub fn select_move<R: Rng + ?Sized>(
    ranked: &[(Move, i32)],
    settings: &LevelSettings,
    rng: &mut R,
) -> Option<Move> {
    let (best, best_score) = *ranked.first()?;
    if ranked.len() == 1 {
        return Some(best);
    }

    if settings.blunder_rate > 0.0 && rng.gen_bool(settings.blunder_rate.min(1.0)) {
        let upper = settings.top_choices.max(1).min(ranked.len() - 1);
        let pick = rng.gen_range(1..=upper);
        debug!(index = pick, mv = %ranked[pick].0, "blunder roll");
        return Some(ranked[pick].0);
    }

    if settings.randomness > 0.0 && rng.gen_bool(settings.randomness.min(1.0)) {
        let k = settings.top_choices.clamp(1, ranked.len());
        let weights: Vec<f64> = ranked[..k]
            .iter()
            .map(|&(_, score)| (f64::from(score - best_score) / SOFTMAX_TEMPERATURE).exp())
            .collect();
        if let Ok(dist) = WeightedIndex::new(&weights) {
            let pick = dist.sample(rng);
            debug!(index = pick, mv = %ranked[pick].0, "randomness roll");
            return Some(ranked[pick].0);
        }
    }

    Some(best)
}
