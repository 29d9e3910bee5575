//! All game entity types — pure data, no logic.

use std::time::Duration;

use crate::config::{Difficulty, GameConfig};

#[derive(Clone, Debug, PartialEq)]
pub enum GameStatus {
    Playing,
    /// Ammunition ran out; waiting for next-round or close-game.
    RoundFinished,
    /// The player closed the game; only the acknowledgement remains.
    Closed,
}

// ── Player & projectiles ──────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: i32,
    pub y: i32,
    pub ammo: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub x: i32,
    pub y: i32,
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub id: u64,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Simulation time at which the enemy disappears on its own.
    pub expires_at: Duration,
}

impl Enemy {
    pub fn half_width(&self) -> i32 {
        self.width / 2
    }
}

/// Repeating enemy spawn schedule. `period` is captured when the schedule
/// starts, so a lifetime change takes effect on the next restart.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnScheduler {
    pub period: Duration,
    /// Time accumulated towards the next spawn.
    pub elapsed: Duration,
    pub running: bool,
}

impl SpawnScheduler {
    pub fn stopped() -> Self {
        Self {
            period: Duration::ZERO,
            elapsed: Duration::ZERO,
            running: false,
        }
    }

    pub fn started(period: Duration) -> Self {
        Self {
            period,
            elapsed: Duration::ZERO,
            running: true,
        }
    }
}

// ── Round state ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Game {
    pub round: u32,
    pub score: u32,
    pub finished: bool,
}

/// Notifications produced by state transitions, drained by the caller.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    ShotFired { ammo_left: u32 },
    EnemySpawned { id: u64, x: i32 },
    EnemyExpired { id: u64 },
    EnemyHit { id: u64, score: u32 },
    BulletLeftArena,
    RoundStarted { round: u32, capacity: u32 },
    RoundFinished { round: u32, score: u32 },
    DifficultyChanged(Difficulty),
    GameClosed { score: u32 },
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire gallery state. Cloneable so pure update functions can return
/// a new copy without mutating the original.
#[derive(Clone, Debug)]
pub struct GalleryState {
    pub config: GameConfig,
    pub player: Player,
    pub bullets: Vec<Bullet>,
    /// Every live enemy; all of them take part in hit tests.
    pub enemies: Vec<Enemy>,
    pub game: Game,
    /// Difficulty applied at the next round start / spawner restart.
    pub difficulty: Difficulty,
    pub spawner: SpawnScheduler,
    pub status: GameStatus,
    /// Simulation clock.
    pub clock: Duration,
    /// Time not yet consumed by whole bullet steps.
    pub bullet_accumulator: Duration,
    pub next_enemy_id: u64,
    pub events: Vec<GameEvent>,
}
