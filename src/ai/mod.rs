//! Computer opponent: static evaluation, alpha-beta search and the
//! difficulty policy that turns search output into a move.

pub mod difficulty;
pub mod engine;
pub mod evaluation;

pub use difficulty::{LevelSettings, choose_ai_move, choose_ai_move_with_rng, select_move};
pub use engine::{AiEngine, SearchAi, SearchLimits, SearchResult, search};
pub use evaluation::{evaluate, is_mate_score};
