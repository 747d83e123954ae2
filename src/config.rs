use tracing::warn;

use crate::engine::types::Difficulty;

/// Runtime configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Difficulty used when the command line doesn't name one.
    pub default_difficulty: Difficulty,
    /// Upper bound on a single AI move search, in milliseconds.
    pub ai_timeout_ms: u64,
    /// Self-play stops after this many plies if no result is reached.
    pub selfplay_max_plies: u32,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = AppConfig::default();
        let default_difficulty = match lookup("CHESS_AI_DEFAULT_DIFFICULTY") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(value = %raw, "unknown CHESS_AI_DEFAULT_DIFFICULTY, using medium");
                defaults.default_difficulty
            }),
            None => defaults.default_difficulty,
        };
        AppConfig {
            default_difficulty,
            ai_timeout_ms: lookup("CHESS_AI_TIMEOUT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.ai_timeout_ms),
            selfplay_max_plies: lookup("CHESS_SELFPLAY_MAX_PLIES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.selfplay_max_plies),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            default_difficulty: Difficulty::Medium,
            ai_timeout_ms: 5000,
            selfplay_max_plies: 200,
        }
    }
}
