//! Formation spawning and enemy AI
//!
//! Formation enemies sway together, occasionally break off to dive at the
//! player, and take random pot-shots. The boss is driven by `boss`.

use glam::Vec2;

use super::boss;
use super::progression::{difficulty_factor, enemy_shot_chance, is_boss_level};
use super::random::RandomSource;
use super::state::{BulletKind, BulletOwner, Enemy, EnemyKind, GameEvent, GameState};
use super::steering::{dive_step, formation_x, start_dive, update_formation};
use crate::consts::*;

/// Formation area (px) and its top edge
const GRID_WIDTH: f32 = 410.0;
const GRID_HEIGHT: f32 = 200.0;
const GRID_TOP: f32 = 60.0;
const BASE_ROWS: f32 = 5.0;
const BASE_COLS: f32 = 9.0;

/// Elite variant: chance per enemy and the level it unlocks at
pub const ELITE_CHANCE: f32 = 0.03;
pub const ELITE_MIN_LEVEL: u32 = 3;
const ELITE_STAT_MULT: i32 = 3;
const ELITE_SIZE_MULT: f32 = 1.3;

/// Speed at which recycled divers drift back to their slot
const REJOIN_SPEED: f32 = 2.0;

/// Rows and columns of the formation grid for a level (grows ~10% every 5 levels)
pub fn grid_dimensions(level: u32) -> (u32, u32) {
    let scale = 1.1f32.powi((level / 5) as i32);
    let rows = (BASE_ROWS * scale.sqrt()).round() as u32;
    let cols = (BASE_COLS * scale.sqrt()).round() as u32;
    (rows, cols)
}

/// Replace the enemy list with the content of `level`
pub fn start_level(state: &mut GameState, level: u32, rng: &mut impl RandomSource) {
    state.level = level;
    state.enemies.clear();
    state.boss = None;
    if is_boss_level(level) {
        boss::spawn_boss(state);
    } else {
        spawn_formation(state, level, rng);
    }
    log::info!("Level {} started ({} enemies)", level, state.enemies.len());
    state.emit(GameEvent::LevelStarted(level));
}

/// Lay out the formation grid for an ordinary level
pub fn spawn_formation(state: &mut GameState, level: u32, rng: &mut impl RandomSource) {
    let (rows, cols) = grid_dimensions(level);
    let cell_w = GRID_WIDTH / cols as f32;
    let cell_h = GRID_HEIGHT / rows as f32;
    let base_size = cell_w.min(cell_h) * 0.7;
    let start_x = (FIELD_WIDTH - GRID_WIDTH) / 2.0;

    for r in 0..rows {
        for c in 0..cols {
            let kind = match r {
                0 => EnemyKind::Yellow,
                1 => EnemyKind::Purple,
                _ => EnemyKind::Red,
            };
            let mut hp = if r == 0 { 2 } else { 1 };
            let mut score_value = (rows - r) as u64 * 100 + level as u64 * 10;
            let mut size = base_size;

            let elite = level >= ELITE_MIN_LEVEL && rng.chance(ELITE_CHANCE);
            if elite {
                hp *= ELITE_STAT_MULT;
                score_value *= ELITE_STAT_MULT as u64;
                size *= ELITE_SIZE_MULT;
            }

            let cell_center = Vec2::new(
                start_x + c as f32 * cell_w + cell_w / 2.0,
                GRID_TOP + r as f32 * cell_h + cell_h / 2.0,
            );
            let pos = cell_center - Vec2::splat(size / 2.0);
            let id = state.next_entity_id();
            state.enemies.push(Enemy {
                id,
                pos,
                size,
                alive: true,
                kind,
                hp,
                max_hp: hp,
                origin: pos,
                diving: false,
                dive_angle: 0.0,
                score_value,
                elite,
                vel: Vec2::ZERO,
            });
        }
    }
}

/// Advance every living enemy one tick, then run the boss
pub fn update_enemies(state: &mut GameState, rng: &mut impl RandomSource) {
    let time_scale = state.enemy_time_scale();
    update_formation(&mut state.formation, time_scale);

    let level = state.level;
    let difficulty = difficulty_factor(level);
    let player_cx = state.player.center().x;
    let offset = state.formation.offset;
    let shot_chance = enemy_shot_chance(level);
    let mut muzzles: Vec<Vec2> = Vec::new();

    for e in state.enemies.iter_mut() {
        if !e.alive || matches!(e.kind, EnemyKind::Boss | EnemyKind::Bonus) {
            continue;
        }
        if e.diving {
            dive_step(e, player_cx, difficulty, time_scale);
        } else {
            e.pos.x = formation_x(e.origin.x, offset);
            if e.pos.y < e.origin.y {
                e.pos.y = (e.pos.y + REJOIN_SPEED * time_scale).min(e.origin.y);
            }
            if rng.chance(e.kind.dive_chance() * difficulty) {
                start_dive(e, player_cx);
            }
        }
        if rng.chance(shot_chance) {
            muzzles.push(Vec2::new(e.center().x, e.rect().bottom()));
        }
    }

    for m in muzzles {
        state.spawn_bullet(
            Vec2::new(m.x - 2.0, m.y),
            Vec2::new(0.0, 5.0 * difficulty),
            Vec2::new(4.0, 8.0),
            0xFF0000,
            BulletOwner::Enemy,
            BulletKind::Standard,
        );
    }

    boss::update_boss(state, rng);
}

/// True once a populated level has no living enemy left
pub fn level_cleared(enemies: &[Enemy]) -> bool {
    !enemies.is_empty() && enemies.iter().all(|e| !e.alive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::random::ScriptedRandom;

    #[test]
    fn test_grid_grows_every_five_levels() {
        assert_eq!(grid_dimensions(1), (5, 9));
        assert_eq!(grid_dimensions(4), (5, 9));
        // scale 1.21 -> sqrt 1.1
        assert_eq!(grid_dimensions(10), (6, 10));
    }

    #[test]
    fn test_formation_layout() {
        let mut state = GameState::new(1, &Settings::default());
        spawn_formation(&mut state, 1, &mut ScriptedRandom::constant(0.99));
        assert_eq!(state.enemies.len(), 45);
        let first = &state.enemies[0];
        assert_eq!(first.kind, EnemyKind::Yellow);
        assert_eq!(first.hp, 2);
        assert_eq!(first.score_value, 5 * 100 + 10);
        assert_eq!(state.enemies[9].kind, EnemyKind::Purple);
        assert_eq!(state.enemies[44].kind, EnemyKind::Red);
        assert_eq!(state.enemies[44].score_value, 100 + 10);
        assert!(state.enemies.iter().all(|e| !e.elite));
    }

    #[test]
    fn test_elite_variant() {
        let mut state = GameState::new(1, &Settings::default());
        spawn_formation(&mut state, 3, &mut ScriptedRandom::constant(0.0));
        let e = &state.enemies[0];
        assert!(e.elite);
        assert_eq!(e.hp, 6);
        assert_eq!(e.score_value, (500 + 30) * 3);

        // Elites never appear before their unlock level
        let mut state = GameState::new(1, &Settings::default());
        spawn_formation(&mut state, 2, &mut ScriptedRandom::constant(0.0));
        assert!(state.enemies.iter().all(|e| !e.elite));
    }

    #[test]
    fn test_start_level_boss() {
        let mut state = GameState::new(1, &Settings::default());
        start_level(&mut state, 5, &mut ScriptedRandom::constant(0.5));
        assert_eq!(state.enemies.len(), 1);
        assert!(state.enemies[0].is_boss());
        assert!(state.boss.is_some());
        assert_eq!(state.boss_appearances, 1);
        assert!(state.events.contains(&GameEvent::LevelStarted(5)));
    }

    #[test]
    fn test_level_cleared_requires_enemies() {
        assert!(!level_cleared(&[]));
        let mut state = GameState::new(1, &Settings::default());
        spawn_formation(&mut state, 1, &mut ScriptedRandom::constant(0.99));
        assert!(!level_cleared(&state.enemies));
        for e in state.enemies.iter_mut() {
            e.alive = false;
        }
        assert!(level_cleared(&state.enemies));
    }

    #[test]
    fn test_formation_enemies_sway_together() {
        let mut state = GameState::new(1, &Settings::default());
        spawn_formation(&mut state, 1, &mut ScriptedRandom::constant(0.99));
        update_enemies(&mut state, &mut ScriptedRandom::constant(0.99));
        let shift0 = state.enemies[0].pos.x - state.enemies[0].origin.x;
        let shift1 = state.enemies[20].pos.x - state.enemies[20].origin.x;
        assert!(shift0 != 0.0);
        assert!((shift0 - shift1).abs() < 1e-5);
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_slow_time_slows_formation() {
        let mut normal = GameState::new(1, &Settings::default());
        spawn_formation(&mut normal, 1, &mut ScriptedRandom::constant(0.99));
        let mut slow = normal.clone();
        slow.clock_ms = 1000;
        slow.player.slow_until = 10_000;
        let mut rng = ScriptedRandom::constant(0.99);
        for _ in 0..20 {
            update_enemies(&mut normal, &mut rng);
            update_enemies(&mut slow, &mut rng);
        }
        assert!((slow.formation.offset * 2.0 - normal.formation.offset).abs() < 1e-4);
        let dx = |s: &GameState| s.enemies[0].pos.x - s.enemies[0].origin.x;
        assert!(dx(&slow) < dx(&normal));
    }

    #[test]
    fn test_dive_trigger() {
        let mut state = GameState::new(1, &Settings::default());
        spawn_formation(&mut state, 1, &mut ScriptedRandom::constant(0.99));
        // 0.0 always passes the dive and shot trials
        update_enemies(&mut state, &mut ScriptedRandom::constant(0.0));
        assert!(state.enemies.iter().all(|e| e.diving));
        assert_eq!(state.bullets.len(), 45);
        assert!(state.bullets.iter().all(|b| b.owner == BulletOwner::Enemy));
    }
}
