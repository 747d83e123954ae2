//! Chess rules engine with a search-based opponent.
//!
//! * [`engine`]: positions, move generation, move application, draw rules.
//! * [`ai`]: static evaluation, alpha-beta search, difficulty levels.
//! * [`config`]: environment-driven runtime settings for the CLI.

pub mod ai;
pub mod config;
pub mod engine;
