//! Shooting Gallery - a round-based arcade shooting game
//!
//! Core modules:
//! - `config`: Tunable constants and the difficulty transition table
//! - `entities`: Pure game data (player, bullets, enemies, round state)
//! - `compute`: Pure state transitions (input, per-frame tick, rounds)
//! - `input`: Terminal key to game input mapping
//! - `error`: Error types

pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod input;

pub use config::{Difficulty, DifficultyStep, GameConfig};
pub use error::ConfigError;
