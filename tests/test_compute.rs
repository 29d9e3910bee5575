use std::time::Duration;

use shooting_gallery::compute::*;
use shooting_gallery::entities::*;
use shooting_gallery::input::Input;
use shooting_gallery::{Difficulty, GameConfig};

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// Round 1 in progress with no enemies on screen and no pending events.
fn make_state() -> GalleryState {
    let mut s = init_state(GameConfig::default(), &mut seeded_rng());
    s.enemies.clear();
    s.events.clear();
    s
}

fn enemy_at(id: u64, x: i32, y: i32) -> Enemy {
    Enemy {
        id,
        x,
        y,
        width: 30,
        height: 20,
        expires_at: Duration::from_secs(60),
    }
}

fn finish_round_number(round: u32, difficulty: Difficulty) -> GalleryState {
    let mut s = make_state();
    s.game.round = round;
    s.difficulty = difficulty;
    finish_round(&s)
}

// ── init_state ────────────────────────────────────────────────────────────────

#[test]
fn init_state_starts_round_one() {
    let s = init_state(GameConfig::default(), &mut seeded_rng());
    assert_eq!(s.game.round, 1);
    assert_eq!(s.game.score, 0);
    assert!(!s.game.finished);
    assert_eq!(s.status, GameStatus::Playing);
    assert_eq!(s.player.ammo, 10);
    assert_eq!((s.player.x, s.player.y), (0, -270));
    assert!(s.bullets.is_empty());
}

#[test]
fn init_state_puts_first_enemy_up_immediately() {
    let s = init_state(GameConfig::default(), &mut seeded_rng());
    assert_eq!(s.enemies.len(), 1);
    let e = &s.enemies[0];
    assert_eq!(e.y, 200);
    assert!(e.x >= -370 && e.x < 370);
    assert_eq!(e.expires_at, Duration::from_secs(5));
    assert!(s.spawner.running);
    assert_eq!(s.spawner.period, Duration::from_secs(5));
}

// ── movement ──────────────────────────────────────────────────────────────────

#[test]
fn move_left_normal() {
    let s = make_state();
    assert_eq!(move_player_left(&s).player.x, -12);
}

#[test]
fn move_right_normal() {
    let s = make_state();
    assert_eq!(move_player_right(&s).player.x, 12);
}

#[test]
fn move_left_rejected_at_boundary() {
    let mut s = make_state();
    s.player.x = -360; // -372 would pass the -370 inset
    assert_eq!(move_player_left(&s).player.x, -360);
}

#[test]
fn move_right_rejected_not_truncated() {
    let mut s = make_state();
    s.player.x = 360;
    assert_eq!(move_player_right(&s).player.x, 360);
    s.player.x = 357;
    assert_eq!(move_player_right(&s).player.x, 369);
}

#[test]
fn wide_player_never_crosses_the_walls() {
    let config = GameConfig {
        player_width: 100,
        ..GameConfig::default()
    };
    assert!(config.validate().is_ok());
    let half = config.player_width / 2;
    let mut s = init_state(config, &mut seeded_rng());

    for _ in 0..100 {
        s = move_player_right(&s);
    }
    assert_eq!(s.player.x, 348);
    assert!(s.player.x + half <= s.config.max_x());

    for _ in 0..200 {
        s = move_player_left(&s);
    }
    assert_eq!(s.player.x, -348);
    assert!(s.player.x - half >= s.config.min_x());
}

#[test]
fn move_does_not_mutate_original() {
    let s = make_state();
    let _ = move_player_left(&s);
    let _ = move_player_right(&s);
    assert_eq!(s.player.x, 0);
}

// ── firing ────────────────────────────────────────────────────────────────────

#[test]
fn shoot_spawns_bullet_above_player() {
    let s = make_state();
    let s2 = player_shoot(&s);
    assert_eq!(s2.player.ammo, 9);
    assert_eq!(s2.bullets, vec![Bullet { x: 0, y: -240 }]);
    assert!(s2.events.contains(&GameEvent::ShotFired { ammo_left: 9 }));
}

#[test]
fn shoot_with_empty_magazine_finishes_round_without_bullet() {
    let mut s = make_state();
    s.player.ammo = 0;
    let s2 = player_shoot(&s);
    assert!(s2.game.finished);
    assert_eq!(s2.status, GameStatus::RoundFinished);
    assert!(s2.bullets.is_empty());
    assert_eq!(s2.player.ammo, 0);
}

#[test]
fn ten_shots_without_enemies_finish_the_round() {
    let mut s = make_state();
    for shot in 1..=10 {
        assert!(!s.game.finished, "finished early at shot {shot}");
        s = player_shoot(&s);
    }
    assert!(s.game.finished);
    assert_eq!(s.status, GameStatus::RoundFinished);
    assert_eq!(s.player.ammo, 0);
    assert_eq!(s.game.score, 0);
    assert_eq!(s.bullets.len(), 10);
}

#[test]
fn extra_fire_after_finish_does_not_repeat_round_end() {
    let mut s = make_state();
    s.player.ammo = 1;
    let s = player_shoot(&s);
    let s = player_shoot(&s);
    let ends = s
        .events
        .iter()
        .filter(|e| matches!(e, GameEvent::RoundFinished { .. }))
        .count();
    assert_eq!(ends, 1);
}

proptest! {
    #[test]
    fn shot_decrements_by_exactly_one(ammo in 1u32..=50) {
        let mut s = make_state();
        s.player.ammo = ammo;
        let s2 = player_shoot(&s);
        prop_assert_eq!(s2.player.ammo, ammo - 1);
        prop_assert_eq!(s2.bullets.len(), 1);
    }
}

// ── rounds & difficulty ───────────────────────────────────────────────────────

#[test]
fn finish_round_stops_spawner() {
    let s = finish_round(&make_state());
    assert!(!s.spawner.running);
    assert!(s
        .events
        .contains(&GameEvent::RoundFinished { round: 1, score: 0 }));
}

#[test]
fn start_round_resets_ammo_and_clears_finished() {
    let mut s = make_state();
    s.player.ammo = 0;
    let s = finish_round(&s);
    let s = start_round(&s);
    assert_eq!(s.game.round, 2);
    assert!(!s.game.finished);
    assert_eq!(s.status, GameStatus::Playing);
    assert_eq!(s.player.ammo, 10);
}

#[test]
fn start_round_leaves_spawner_alone() {
    let s = finish_round(&make_state());
    let s = start_round(&s);
    assert!(!s.spawner.running);
}

#[test]
fn round_two_sets_capacity_eight_lifetime_four() {
    let s = finish_round_number(2, GameConfig::default().initial_difficulty());
    assert_eq!(
        s.difficulty,
        Difficulty {
            capacity: 8,
            enemy_lifetime: Duration::from_secs(4)
        }
    );
    assert_eq!(start_round(&s).player.ammo, 8);
}

#[test]
fn round_four_sets_capacity_five_lifetime_three() {
    let before = Difficulty {
        capacity: 8,
        enemy_lifetime: Duration::from_secs(4),
    };
    let s = finish_round_number(4, before);
    assert_eq!(s.difficulty.capacity, 5);
    assert_eq!(s.difficulty.enemy_lifetime, Duration::from_secs(3));
}

#[test]
fn rounds_six_and_nine_change_capacity_only() {
    let before = Difficulty {
        capacity: 5,
        enemy_lifetime: Duration::from_secs(3),
    };
    let s = finish_round_number(6, before);
    assert_eq!(s.difficulty.capacity, 3);
    assert_eq!(s.difficulty.enemy_lifetime, Duration::from_secs(3));

    let s = finish_round_number(9, s.difficulty);
    assert_eq!(s.difficulty.capacity, 1);
    assert_eq!(s.difficulty.enemy_lifetime, Duration::from_secs(3));
}

#[test]
fn other_rounds_leave_difficulty_unchanged() {
    let before = GameConfig::default().initial_difficulty();
    for round in [1, 3, 5, 7, 8, 10, 42] {
        let s = finish_round_number(round, before);
        assert_eq!(s.difficulty, before, "round {round}");
        assert!(!s
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::DifficultyChanged(_))));
    }
}

#[test]
fn difficulty_applies_from_next_round_not_current() {
    let mut s = make_state();
    s.game.round = 2;
    s.player.ammo = 3;
    let s = finish_round(&s);
    // current magazine untouched, only the next round gets 8
    assert_eq!(s.player.ammo, 3);
    assert_eq!(advance_round(&s).player.ammo, 8);
}

#[test]
fn increment_score_by_delta() {
    let s = increment_score(&make_state(), 5);
    assert_eq!(s.game.score, 5);
    assert_eq!(increment_score(&s, 1).game.score, 6);
}

#[test]
fn score_saturates_instead_of_overflowing() {
    let mut s = make_state();
    s.game.score = u32::MAX - 1;
    let s = increment_score(&s, 5);
    assert_eq!(s.game.score, u32::MAX);
}

// ── hit test ──────────────────────────────────────────────────────────────────

#[test]
fn hit_needs_horizontal_and_vertical_overlap() {
    let enemy = enemy_at(0, 100, 200);
    let w = enemy.half_width();
    assert!(is_enemy_hit(&Bullet { x: 100, y: 211 }, &enemy, 10));
    assert!(is_enemy_hit(&Bullet { x: 100 + w, y: 211 }, &enemy, 10));
    assert!(!is_enemy_hit(&Bullet { x: 100 + w + 1, y: 211 }, &enemy, 10));
    assert!(!is_enemy_hit(&Bullet { x: 100 - w - 1, y: 211 }, &enemy, 10));
    assert!(!is_enemy_hit(&Bullet { x: 100, y: 210 }, &enemy, 10));
}

#[test]
fn step_registers_hit_and_removes_both() {
    let mut s = make_state();
    s.enemies.push(enemy_at(7, 100, 200));
    s.bullets.push(Bullet { x: 100, y: 201 }); // steps to 211
    let s2 = step_bullets(&s);
    assert!(s2.enemies.is_empty());
    assert!(s2.bullets.is_empty());
    assert_eq!(s2.game.score, 1);
    assert!(s2.events.contains(&GameEvent::EnemyHit { id: 7, score: 1 }));
}

#[test]
fn step_misses_just_outside_half_width() {
    let mut s = make_state();
    s.enemies.push(enemy_at(7, 100, 200));
    s.bullets.push(Bullet { x: 116, y: 201 });
    let s2 = step_bullets(&s);
    assert_eq!(s2.enemies.len(), 1);
    assert_eq!(s2.bullets, vec![Bullet { x: 116, y: 211 }]);
    assert_eq!(s2.game.score, 0);
}

#[test]
fn bullet_leaving_arena_is_removed_and_never_hits() {
    let mut s = make_state();
    s.bullets.push(Bullet { x: 0, y: 295 });
    let s = step_bullets(&s);
    assert!(s.bullets.is_empty());
    assert!(s.events.contains(&GameEvent::BulletLeftArena));

    let mut s = s;
    s.enemies.push(enemy_at(1, 0, 200));
    let s = step_bullets(&s);
    assert_eq!(s.game.score, 0);
    assert_eq!(s.enemies.len(), 1);
}

#[test]
fn every_live_enemy_can_be_hit() {
    let mut s = make_state();
    s.enemies.push(enemy_at(0, -100, 200));
    s.enemies.push(enemy_at(1, 100, 200));
    s.bullets.push(Bullet { x: -100, y: 201 });
    let s2 = step_bullets(&s);
    assert_eq!(s2.enemies, vec![enemy_at(1, 100, 200)]);
    assert_eq!(s2.game.score, 1);
}

#[test]
fn overlapping_enemies_nearest_is_hit() {
    let mut s = make_state();
    s.enemies.push(enemy_at(0, 0, 150));
    s.enemies.push(enemy_at(1, 0, 200));
    s.bullets.push(Bullet { x: 0, y: 201 });
    let s2 = step_bullets(&s);
    assert_eq!(s2.enemies, vec![enemy_at(0, 0, 150)]);
}

#[test]
fn two_bullets_cannot_share_one_enemy() {
    let mut s = make_state();
    s.enemies.push(enemy_at(0, 0, 200));
    s.bullets.push(Bullet { x: 0, y: 201 });
    s.bullets.push(Bullet { x: 5, y: 201 });
    let s2 = step_bullets(&s);
    assert_eq!(s2.game.score, 1);
    assert_eq!(s2.bullets, vec![Bullet { x: 5, y: 211 }]);
}

#[test]
fn last_bullet_still_scores_after_round_finished() {
    let mut s = make_state();
    s.player.ammo = 1;
    s.enemies.push(enemy_at(0, 0, 200));
    let mut s = player_shoot(&s);
    assert!(s.game.finished);
    while !s.bullets.is_empty() {
        s = step_bullets(&s);
    }
    assert_eq!(s.game.score, 1);
}

// ── tick — bullets ────────────────────────────────────────────────────────────

#[test]
fn tick_moves_bullets_in_whole_steps() {
    let mut s = make_state();
    s.bullets.push(Bullet { x: 0, y: 0 });
    let period = s.config.bullet_period();

    let s2 = tick(&s, period * 3, &mut seeded_rng());
    assert_eq!(s2.bullets[0].y, 30);

    let s3 = tick(&s, period / 2, &mut seeded_rng());
    assert_eq!(s3.bullets[0].y, 0);
    let s3 = tick(&s3, period / 2, &mut seeded_rng());
    assert_eq!(s3.bullets[0].y, 10);
}

#[test]
fn tick_advances_clock() {
    let s = make_state();
    let s2 = tick(&s, Duration::from_millis(33), &mut seeded_rng());
    assert_eq!(s2.clock, Duration::from_millis(33));
}

// ── tick — spawn schedule ─────────────────────────────────────────────────────

#[test]
fn tick_spawns_once_per_lifetime_and_expires_old_enemy() {
    let s = init_state(GameConfig::default(), &mut seeded_rng());
    let mut rng = seeded_rng();

    let s = tick(&s, Duration::from_millis(4_900), &mut rng);
    assert_eq!(s.enemies.len(), 1);
    assert_eq!(s.enemies[0].id, 0);

    let s = tick(&s, Duration::from_millis(100), &mut rng);
    assert_eq!(s.enemies.len(), 1);
    assert_eq!(s.enemies[0].id, 1);
    assert!(s.events.contains(&GameEvent::EnemyExpired { id: 0 }));
}

#[test]
fn long_frame_backlog_expires_like_separate_frames() {
    let s = init_state(GameConfig::default(), &mut seeded_rng());
    let s = tick(&s, Duration::from_secs(60), &mut seeded_rng());

    // spawns at 5s, 10s, ... 60s; only the last one is still up
    assert_eq!(s.next_enemy_id, 13);
    assert_eq!(s.enemies.len(), 1);
    assert_eq!(s.enemies[0].id, 12);
    assert_eq!(s.enemies[0].expires_at, Duration::from_secs(65));
}

#[test]
fn long_frame_stamps_backlog_at_scheduled_instants() {
    let s = init_state(GameConfig::default(), &mut seeded_rng());
    let s = tick(&s, Duration::from_millis(7_500), &mut seeded_rng());
    assert_eq!(s.enemies.len(), 1);
    assert_eq!(s.enemies[0].expires_at, Duration::from_secs(10));
    assert_eq!(s.spawner.elapsed, Duration::from_millis(2_500));
}

#[test]
fn tick_does_not_spawn_after_round_finished() {
    let s = finish_round(&init_state(GameConfig::default(), &mut seeded_rng()));
    let s = tick(&s, Duration::from_secs(20), &mut seeded_rng());
    assert!(s.enemies.is_empty());
    assert_eq!(s.next_enemy_id, 1);
}

#[test]
fn restarted_spawner_waits_one_period() {
    let mut s = make_state();
    s.game.round = 2;
    let s = advance_round(&finish_round(&s));
    assert!(s.spawner.running);
    assert_eq!(s.spawner.period, Duration::from_secs(4));

    let mut rng = seeded_rng();
    let s = tick(&s, Duration::from_millis(3_999), &mut rng);
    assert!(s.enemies.is_empty());
    let s = tick(&s, Duration::from_millis(1), &mut rng);
    assert_eq!(s.enemies.len(), 1);
}

#[test]
fn lifetime_change_keeps_in_flight_expiry() {
    let mut s = init_state(GameConfig::default(), &mut seeded_rng());
    s.game.round = 2;
    let s = finish_round(&s);
    assert_eq!(s.enemies[0].expires_at, Duration::from_secs(5));

    let s = advance_round(&s);
    let s = spawn_enemy(&s, &mut seeded_rng());
    assert_eq!(s.enemies[1].expires_at, Duration::from_secs(4));
}

#[test]
fn spawned_enemies_stay_inside_inset() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    for _ in 0..200 {
        s = spawn_enemy(&s, &mut rng);
    }
    assert!(s.enemies.iter().all(|e| e.x >= -370 && e.x < 370 && e.y == 200));
}

// ── input dispatch ────────────────────────────────────────────────────────────

#[test]
fn input_moves_and_fires_while_playing() {
    let s = make_state();
    let s = apply_input(&s, Input::MoveRight);
    let s = apply_input(&s, Input::Fire);
    assert_eq!(s.player.x, 12);
    assert_eq!(s.bullets, vec![Bullet { x: 12, y: -240 }]);
}

#[test]
fn input_round_end_choices_ignored_while_playing() {
    let s = make_state();
    let s2 = apply_input(&s, Input::NextRound);
    assert_eq!(s2.game.round, 1);
    let s2 = apply_input(&s2, Input::CloseGame);
    assert_eq!(s2.status, GameStatus::Playing);
}

#[test]
fn input_play_ignored_while_round_finished() {
    let s = finish_round(&make_state());
    let s2 = apply_input(&s, Input::Fire);
    let s2 = apply_input(&s2, Input::MoveLeft);
    assert!(s2.bullets.is_empty());
    assert_eq!(s2.player.ammo, s.player.ammo);
    assert_eq!(s2.player.x, 0);
}

#[test]
fn input_next_round_restarts_play() {
    let s = finish_round(&make_state());
    let s = apply_input(&s, Input::NextRound);
    assert_eq!(s.game.round, 2);
    assert_eq!(s.status, GameStatus::Playing);
    assert!(s.spawner.running);
}

#[test]
fn input_close_game_reports_final_score() {
    let mut s = make_state();
    s.game.score = 4;
    let s = apply_input(&finish_round(&s), Input::CloseGame);
    assert_eq!(s.status, GameStatus::Closed);
    assert!(s.events.contains(&GameEvent::GameClosed { score: 4 }));
}
