//! Game constants and the difficulty transition table.
//!
//! World coordinates have their origin at the centre of the play area with
//! `y` pointing up, so the play area spans `[-width/2, width/2]` by
//! `[-height/2, height/2]`.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ── Difficulty ───────────────────────────────────────────────────────────────

/// Parameters that tighten as rounds advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Difficulty {
    /// Ammunition granted at the start of a round.
    pub capacity: u32,
    /// How long an enemy stays up. Also the spawn period.
    pub enemy_lifetime: Duration,
}

/// One row of the transition table: finishing `round` replaces whichever
/// parameters are `Some`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyStep {
    pub round: u32,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub enemy_lifetime_ms: Option<u64>,
}

impl DifficultyStep {
    const fn new(round: u32, capacity: Option<u32>, enemy_lifetime_ms: Option<u64>) -> Self {
        Self {
            round,
            capacity,
            enemy_lifetime_ms,
        }
    }

    /// Apply this step on top of `current`.
    pub fn apply(&self, current: Difficulty) -> Difficulty {
        Difficulty {
            capacity: self.capacity.unwrap_or(current.capacity),
            enemy_lifetime: self
                .enemy_lifetime_ms
                .map(Duration::from_millis)
                .unwrap_or(current.enemy_lifetime),
        }
    }
}

fn default_difficulty_steps() -> Vec<DifficultyStep> {
    vec![
        DifficultyStep::new(2, Some(8), Some(4_000)),
        DifficultyStep::new(4, Some(5), Some(3_000)),
        DifficultyStep::new(6, Some(3), None),
        DifficultyStep::new(9, Some(1), None),
    ]
}

// ── Config ───────────────────────────────────────────────────────────────────

/// All tunable constants. `Default` holds the stock arcade values; a JSON
/// file may override any subset of fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Play area size in world units.
    pub arena_width: i32,
    pub arena_height: i32,
    /// Distance from the side walls that neither the player nor a spawning
    /// enemy may reach.
    pub boundary_inset: i32,

    pub move_step: i32,
    pub player_width: i32,
    pub player_height: i32,
    /// Player row, measured up from the bottom wall.
    pub player_bottom_offset: i32,

    /// A new bullet appears this far above the player.
    pub bullet_spawn_offset: i32,
    /// Vertical distance a bullet covers per step.
    pub bullet_step: i32,
    pub bullet_steps_per_second: u32,

    pub enemy_width: i32,
    pub enemy_height: i32,
    pub enemy_spawn_y: i32,
    /// A bullet must be more than this far above an enemy's centre to hit.
    pub hit_margin: i32,

    pub score_per_hit: u32,

    pub initial_capacity: u32,
    pub initial_enemy_lifetime_ms: u64,
    pub difficulty_steps: Vec<DifficultyStep>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena_width: 800,
            arena_height: 600,
            boundary_inset: 30,

            move_step: 12,
            player_width: 50,
            player_height: 25,
            player_bottom_offset: 30,

            bullet_spawn_offset: 30,
            bullet_step: 10,
            bullet_steps_per_second: 70,

            enemy_width: 30,
            enemy_height: 20,
            enemy_spawn_y: 200,
            hit_margin: 10,

            score_per_hit: 1,

            initial_capacity: 10,
            initial_enemy_lifetime_ms: 5_000,
            difficulty_steps: default_difficulty_steps(),
        }
    }
}

impl GameConfig {
    /// Load overrides from a JSON file and validate the result.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig =
            serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Reject values that would leave the game unplayable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> Result<(), ConfigError> {
            Err(ConfigError::Invalid {
                field,
                reason: reason.into(),
            })
        }

        if self.arena_width <= 0 || self.arena_height <= 0 {
            return invalid("arena_width", "play area must have a positive size");
        }
        if self.boundary_inset < 0 || self.boundary_inset >= self.arena_width / 2 {
            return invalid(
                "boundary_inset",
                format!("must leave room inside a {} wide arena", self.arena_width),
            );
        }
        if self.player_width <= 0 || self.player_height <= 0 {
            return invalid("player_width", "player must have a positive size");
        }
        if self.player_inset() >= self.max_x() {
            return invalid("player_width", "player does not fit between the walls");
        }
        if self.move_step <= 0 {
            return invalid("move_step", "must be positive");
        }
        if self.bullet_step <= 0 {
            return invalid("bullet_step", "must be positive");
        }
        if self.bullet_steps_per_second == 0 {
            return invalid("bullet_steps_per_second", "must be positive");
        }
        if self.enemy_width <= 0 || self.enemy_height <= 0 {
            return invalid("enemy_width", "enemy must have a positive size");
        }
        if self.enemy_spawn_y >= self.max_y() || self.enemy_spawn_y <= self.player_y() {
            return invalid("enemy_spawn_y", "must lie between the player row and the top wall");
        }
        if self.initial_capacity == 0 {
            return invalid("initial_capacity", "must be at least 1");
        }
        if self.initial_enemy_lifetime_ms == 0 {
            return invalid("initial_enemy_lifetime_ms", "must be positive");
        }
        for step in &self.difficulty_steps {
            if step.capacity == Some(0) {
                return invalid("difficulty_steps", format!("round {} sets capacity 0", step.round));
            }
            if step.enemy_lifetime_ms == Some(0) {
                return invalid("difficulty_steps", format!("round {} sets lifetime 0", step.round));
            }
        }
        Ok(())
    }

    pub fn max_x(&self) -> i32 {
        self.arena_width / 2
    }

    pub fn min_x(&self) -> i32 {
        -self.max_x()
    }

    pub fn max_y(&self) -> i32 {
        self.arena_height / 2
    }

    pub fn min_y(&self) -> i32 {
        -self.max_y()
    }

    pub fn player_y(&self) -> i32 {
        self.min_y() + self.player_bottom_offset
    }

    /// Closest the player's centre may come to a side wall: the inset, or
    /// half the player's width if that is larger.
    pub fn player_inset(&self) -> i32 {
        self.boundary_inset.max(self.player_width / 2)
    }

    pub fn bullet_period(&self) -> Duration {
        Duration::from_secs(1) / self.bullet_steps_per_second
    }

    pub fn initial_difficulty(&self) -> Difficulty {
        Difficulty {
            capacity: self.initial_capacity,
            enemy_lifetime: Duration::from_millis(self.initial_enemy_lifetime_ms),
        }
    }

    /// Difficulty in effect after `round` finishes. Rounds without a table
    /// entry keep `current`.
    pub fn difficulty_after(&self, round: u32, current: Difficulty) -> Difficulty {
        self.difficulty_steps
            .iter()
            .filter(|step| step.round == round)
            .fold(current, |d, step| step.apply(d))
    }
}
