//! Pure game-logic functions.
//!
//! Every public function takes an immutable reference to the current
//! `GalleryState` (and, where needed, an RNG handle) and returns a brand-new
//! `GalleryState`.  Side effects are limited to the injected RNG and log
//! output; everything a presenter needs to know is appended to
//! `GalleryState::events`.

use std::time::Duration;

use rand::Rng;

use crate::config::GameConfig;
use crate::entities::{
    Bullet, Enemy, GalleryState, Game, GameEvent, GameStatus, Player, SpawnScheduler,
};
use crate::input::Input;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the state for a fresh session: round 1 is running, the spawn
/// schedule is started and the first enemy is already up.
pub fn init_state(config: GameConfig, rng: &mut impl Rng) -> GalleryState {
    let difficulty = config.initial_difficulty();
    let state = GalleryState {
        player: Player {
            x: 0,
            y: config.player_y(),
            ammo: difficulty.capacity,
        },
        bullets: Vec::new(),
        enemies: Vec::new(),
        game: Game {
            round: 0,
            score: 0,
            finished: false,
        },
        difficulty,
        spawner: SpawnScheduler::stopped(),
        status: GameStatus::Playing,
        clock: Duration::ZERO,
        bullet_accumulator: Duration::ZERO,
        next_enemy_id: 0,
        events: Vec::new(),
        config,
    };

    let state = start_round(&state);
    let state = restart_spawner(&state);
    spawn_enemy(&state, rng)
}

// ── Input-driven state transitions (pure) ───────────────────────────────────

/// Dispatch one input. Movement and firing only act during play; the
/// round-end choices only act once the round is finished.
pub fn apply_input(state: &GalleryState, input: Input) -> GalleryState {
    match (&state.status, input) {
        (GameStatus::Playing, Input::MoveLeft) => move_player_left(state),
        (GameStatus::Playing, Input::MoveRight) => move_player_right(state),
        (GameStatus::Playing, Input::Fire) => player_shoot(state),
        (GameStatus::RoundFinished, Input::NextRound) => advance_round(state),
        (GameStatus::RoundFinished, Input::CloseGame) => close_game(state),
        _ => state.clone(),
    }
}

/// Step left unless the intended position would reach the left inset.
/// The inset is never less than half the player's width.
pub fn move_player_left(state: &GalleryState) -> GalleryState {
    let config = &state.config;
    let new_x = state.player.x - config.move_step;
    if new_x <= config.min_x() + config.player_inset() {
        return state.clone();
    }
    GalleryState {
        player: Player {
            x: new_x,
            ..state.player.clone()
        },
        ..state.clone()
    }
}

/// Step right unless the intended position would reach the right inset.
pub fn move_player_right(state: &GalleryState) -> GalleryState {
    let config = &state.config;
    let new_x = state.player.x + config.move_step;
    if new_x >= config.max_x() - config.player_inset() {
        return state.clone();
    }
    GalleryState {
        player: Player {
            x: new_x,
            ..state.player.clone()
        },
        ..state.clone()
    }
}

/// Fire one bullet. An empty magazine finishes the round instead, and the
/// shot that empties the magazine finishes it right away.
pub fn player_shoot(state: &GalleryState) -> GalleryState {
    if state.player.ammo == 0 {
        return finish_round(state);
    }

    let mut next = state.clone();
    next.player.ammo -= 1;
    next.bullets.push(Bullet {
        x: next.player.x,
        y: next.player.y + next.config.bullet_spawn_offset,
    });
    next.events.push(GameEvent::ShotFired {
        ammo_left: next.player.ammo,
    });

    if next.player.ammo == 0 {
        finish_round(&next)
    } else {
        next
    }
}

// ── Round transitions ────────────────────────────────────────────────────────

/// Begin the next round with a full magazine at the current capacity.
/// The spawn schedule is left alone; see [`restart_spawner`].
pub fn start_round(state: &GalleryState) -> GalleryState {
    let round = state.game.round + 1;
    let capacity = state.difficulty.capacity;
    log::info!("Round {round} started with {capacity} bullets");

    let mut next = state.clone();
    next.game = Game {
        round,
        finished: false,
        ..state.game.clone()
    };
    next.player.ammo = capacity;
    next.status = GameStatus::Playing;
    next.events.push(GameEvent::RoundStarted { round, capacity });
    next
}

/// Mark the round finished, stop spawning and apply the difficulty change
/// scheduled for the round just completed. No-op if already finished.
pub fn finish_round(state: &GalleryState) -> GalleryState {
    if state.game.finished {
        return state.clone();
    }

    let round = state.game.round;
    let score = state.game.score;
    log::info!("Round {round} finished, score {score}");

    let mut next = state.clone();
    next.game.finished = true;
    next.status = GameStatus::RoundFinished;
    next.spawner.running = false;
    next.events.push(GameEvent::RoundFinished { round, score });

    let difficulty = next.config.difficulty_after(round, next.difficulty);
    if difficulty != next.difficulty {
        log::info!(
            "Difficulty now {} bullets, {:?} enemy lifetime",
            difficulty.capacity,
            difficulty.enemy_lifetime
        );
        next.difficulty = difficulty;
        next.events.push(GameEvent::DifficultyChanged(difficulty));
    }
    next
}

/// (Re)start the repeating spawn schedule with the current enemy lifetime.
/// The first spawn happens one full period later.
pub fn restart_spawner(state: &GalleryState) -> GalleryState {
    GalleryState {
        spawner: SpawnScheduler::started(state.difficulty.enemy_lifetime),
        ..state.clone()
    }
}

/// Confirm the next round: start it and restart the spawn schedule.
pub fn advance_round(state: &GalleryState) -> GalleryState {
    restart_spawner(&start_round(state))
}

pub fn close_game(state: &GalleryState) -> GalleryState {
    let score = state.game.score;
    log::info!("Game closed, final score {score}");
    let mut next = state.clone();
    next.status = GameStatus::Closed;
    next.spawner.running = false;
    next.events.push(GameEvent::GameClosed { score });
    next
}

pub fn increment_score(state: &GalleryState, delta: u32) -> GalleryState {
    let mut next = state.clone();
    next.game.score = next.game.score.saturating_add(delta);
    next
}

// ── Enemies & hits ───────────────────────────────────────────────────────────

/// Put one enemy up at a random x inside the inset walls. It expires after
/// the lifetime in effect right now.
pub fn spawn_enemy(state: &GalleryState, rng: &mut impl Rng) -> GalleryState {
    spawn_enemy_at(state, state.clock, rng)
}

/// Spawn as if the schedule fired at `at`, which may lie earlier in the
/// current frame; the enemy's expiry counts from that instant.
fn spawn_enemy_at(state: &GalleryState, at: Duration, rng: &mut impl Rng) -> GalleryState {
    let config = &state.config;
    let low = config.min_x() + config.boundary_inset;
    let high = config.max_x() - config.boundary_inset;
    let x = rng.gen_range(low..high);

    let mut next = state.clone();
    let id = next.next_enemy_id;
    next.next_enemy_id += 1;
    next.enemies.push(Enemy {
        id,
        x,
        y: config.enemy_spawn_y,
        width: config.enemy_width,
        height: config.enemy_height,
        expires_at: at + state.difficulty.enemy_lifetime,
    });
    next.events.push(GameEvent::EnemySpawned { id, x });
    log::debug!("Enemy {id} spawned at x={x}");
    next
}

/// Bullet is within half the enemy's width horizontally and more than
/// `margin` above its centre.
pub fn is_enemy_hit(bullet: &Bullet, enemy: &Enemy, margin: i32) -> bool {
    let on_x = (bullet.x - enemy.x).abs() <= enemy.half_width();
    let on_y = bullet.y - enemy.y > margin;
    on_x && on_y
}

// ── Per-frame tick (nearly pure — RNG is injected) ──────────────────────────

/// Advance the simulation by `dt`.  All randomness comes through `rng` so
/// callers control determinism (useful for tests with a seeded RNG).
pub fn tick(state: &GalleryState, dt: Duration, rng: &mut impl Rng) -> GalleryState {
    let mut next = state.clone();
    next.clock += dt;

    // ── 1. Expire enemies ────────────────────────────────────────────────────
    next = expire_enemies(&next);

    // ── 2. Bullets advance in whole fixed steps ──────────────────────────────
    if next.bullets.is_empty() {
        next.bullet_accumulator = Duration::ZERO;
    } else {
        let period = next.config.bullet_period();
        next.bullet_accumulator += dt;
        while next.bullet_accumulator >= period && !next.bullets.is_empty() {
            next.bullet_accumulator -= period;
            next = step_bullets(&next);
        }
    }

    // ── 3. Spawn schedule ────────────────────────────────────────────────────
    if next.spawner.running && !next.spawner.period.is_zero() {
        next.spawner.elapsed += dt;
        while next.spawner.elapsed >= next.spawner.period {
            next.spawner.elapsed -= next.spawner.period;
            let at = next.clock.saturating_sub(next.spawner.elapsed);
            next = spawn_enemy_at(&next, at, rng);
        }
    }

    // ── 4. Backlog spawns from a long frame may already be due ───────────────
    expire_enemies(&next)
}

/// Remove every enemy whose lifetime has run out by the current clock.
fn expire_enemies(state: &GalleryState) -> GalleryState {
    let clock = state.clock;
    let (expired, alive): (Vec<Enemy>, Vec<Enemy>) = state
        .enemies
        .iter()
        .cloned()
        .partition(|e| e.expires_at <= clock);

    let mut next = GalleryState {
        enemies: alive,
        ..state.clone()
    };
    for enemy in expired {
        log::debug!("Enemy {} expired", enemy.id);
        next.events.push(GameEvent::EnemyExpired { id: enemy.id });
    }
    next
}

/// Move every bullet one step up, then resolve hits and exits.  A bullet
/// that overlaps several enemies takes out the nearest one.
pub fn step_bullets(state: &GalleryState) -> GalleryState {
    let config = &state.config;
    let mut next = GalleryState {
        bullets: Vec::with_capacity(state.bullets.len()),
        ..state.clone()
    };

    for bullet in &state.bullets {
        let moved = Bullet {
            y: bullet.y + config.bullet_step,
            ..bullet.clone()
        };

        let target = next
            .enemies
            .iter()
            .enumerate()
            .filter(|(_, e)| is_enemy_hit(&moved, e, config.hit_margin))
            .min_by_key(|(_, e)| (moved.y - e.y, e.id))
            .map(|(i, _)| i);

        match target {
            Some(i) => {
                let enemy = next.enemies.remove(i);
                next = increment_score(&next, config.score_per_hit);
                let score = next.game.score;
                log::debug!("Enemy {} hit, score {score}", enemy.id);
                next.events.push(GameEvent::EnemyHit { id: enemy.id, score });
            }
            None if moved.y > config.max_y() => {
                next.events.push(GameEvent::BulletLeftArena);
            }
            None => next.bullets.push(moved),
        }
    }

    next
}
