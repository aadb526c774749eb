//! Collision and damage resolution
//!
//! Player attacks (bolts, thunder orbs, orbital drones) against enemies,
//! enemy attacks against the player, and power-up pickup. Every test is an
//! axis-aligned rectangle overlap.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec2;

use super::boss::laser_rect;
use super::progression::{apply_powerup, roll_powerup};
use super::random::RandomSource;
use super::rect::Rect;
use super::stage::record_bonus_kill;
use super::state::{
    BulletKind, BulletOwner, EnemyKind, GameEvent, GamePhase, GameState, Particle, PowerUpKind,
};
use super::steering::{ORBITAL_SIZE, orbital_positions};
use crate::audio::SoundCue;
use crate::consts::*;

/// Re-arm delay of an orbital drone after a contact hit
pub const ORBITAL_REARM_MS: u64 = 250;

const SHARD_COUNT: usize = 3;
const SHARD_SPEED: f32 = 8.0;
const ARC_PARTICLES: usize = 12;

/// How a player projectile reacts to a hit
#[derive(Debug, Clone, Copy)]
enum Impact {
    Pierce,
    Thunder { damage: i32, radius: f32 },
    Ricochet,
    Plain,
}

/// Run every collision pass of a normal tick
pub fn resolve_collisions(state: &mut GameState, rng: &mut impl RandomSource) {
    resolve_player_attacks(state, rng);
    resolve_threats(state);
    collect_powerups(state, rng);
}

/// Player projectiles and drones against living enemies
pub fn resolve_player_attacks(state: &mut GameState, rng: &mut impl RandomSource) {
    let mut shards: Vec<Vec2> = Vec::new();

    for bi in 0..state.bullets.len() {
        if !state.bullets[bi].active || !state.bullets[bi].from_player() {
            continue;
        }
        let bullet_rect = state.bullets[bi].rect();

        for ei in 0..state.enemies.len() {
            if !state.enemies[ei].alive || !bullet_rect.intersects(&state.enemies[ei].rect()) {
                continue;
            }
            let enemy_id = state.enemies[ei].id;
            let impact = match &mut state.bullets[bi].kind {
                BulletKind::Piercing { hit_enemies } => {
                    if hit_enemies.contains(&enemy_id) {
                        continue;
                    }
                    hit_enemies.push(enemy_id);
                    Impact::Pierce
                }
                BulletKind::Thunder { damage, radius } => Impact::Thunder {
                    damage: *damage,
                    radius: *radius,
                },
                BulletKind::Ricochet => Impact::Ricochet,
                BulletKind::Standard | BulletKind::Shard => Impact::Plain,
                BulletKind::Homing { .. } => continue,
            };

            if !matches!(impact, Impact::Pierce) {
                state.bullets[bi].active = false;
            }
            let center = state.enemies[ei].center();
            let is_boss = state.enemies[ei].is_boss();

            match impact {
                Impact::Thunder { damage, radius } => {
                    damage_enemy(state, ei, damage, rng);
                    if radius > 0.0 {
                        splash(state, ei, center, radius, rng);
                    }
                }
                Impact::Ricochet => {
                    damage_enemy(state, ei, 1, rng);
                    shards.push(center);
                }
                Impact::Pierce | Impact::Plain => {
                    damage_enemy(state, ei, 1, rng);
                }
            }
            state.shake(if is_boss { 2.0 } else { 5.0 });

            if !matches!(impact, Impact::Pierce) {
                break;
            }
        }
    }

    for center in shards {
        spawn_shards(state, center, rng);
    }

    resolve_orbitals(state, rng);
}

/// Area damage around `impact` to every other living enemy with d < radius
fn splash(
    state: &mut GameState,
    primary: usize,
    impact: Vec2,
    radius: f32,
    rng: &mut impl RandomSource,
) {
    let amount = splash_damage(radius);
    for ei in 0..state.enemies.len() {
        if ei == primary || !state.enemies[ei].alive {
            continue;
        }
        if state.enemies[ei].center().distance(impact) < radius {
            damage_enemy(state, ei, amount, rng);
        }
    }
    for _ in 0..ARC_PARTICLES {
        let vel = Vec2::new(rng.range(-8.0, 8.0), rng.range(-8.0, 8.0));
        let color = if rng.chance(0.5) { 0xEECCFF } else { 0xFFFFFF };
        state.spawn_particle(Particle {
            pos: impact,
            vel,
            life: 0.8,
            color,
        });
    }
}

/// Splash damage for a thunder radius
pub fn splash_damage(radius: f32) -> i32 {
    if radius >= 60.0 { 2 } else { 1 }
}

/// Three shards fanned upward from a tier-4 impact
fn spawn_shards(state: &mut GameState, center: Vec2, rng: &mut impl RandomSource) {
    let size = Vec2::new(3.0, 8.0);
    for _ in 0..SHARD_COUNT {
        let angle = -FRAC_PI_2 + (rng.next_f32() - 0.5) * PI * 0.8;
        state.spawn_bullet(
            center - size / 2.0,
            Vec2::new(angle.cos(), angle.sin()) * SHARD_SPEED,
            size,
            0xFFA500,
            BulletOwner::Player,
            BulletKind::Shard,
        );
    }
}

/// Orbital drones deal contact damage, each re-arming after a hit
fn resolve_orbitals(state: &mut GameState, rng: &mut impl RandomSource) {
    let count = state.player.loadout.orbitals;
    if count == 0 {
        return;
    }
    let now = state.clock_ms;
    let drones = orbital_positions(state.player.center(), state.player.orbital_angle, count);

    for (i, drone) in drones.into_iter().enumerate() {
        if now < state.player.orbital_ready_at[i] {
            continue;
        }
        let drone_rect = Rect::centered(drone, ORBITAL_SIZE);
        let target = state
            .enemies
            .iter()
            .position(|e| e.alive && drone_rect.intersects(&e.rect()));
        if let Some(ei) = target {
            damage_enemy(state, ei, 1, rng);
            state.player.orbital_ready_at[i] = now + ORBITAL_REARM_MS;
        }
    }
}

/// Subtract HP; returns true if the enemy died
pub fn damage_enemy(
    state: &mut GameState,
    idx: usize,
    amount: i32,
    rng: &mut impl RandomSource,
) -> bool {
    let enemy = &mut state.enemies[idx];
    if !enemy.alive {
        return false;
    }
    enemy.hp -= amount;
    if enemy.hp > 0 {
        return false;
    }
    kill_enemy(state, idx, rng);
    true
}

/// Mark an enemy dead and pay out its rewards
fn kill_enemy(state: &mut GameState, idx: usize, rng: &mut impl RandomSource) {
    let enemy = &mut state.enemies[idx];
    enemy.alive = false;
    enemy.hp = 0;
    let center = enemy.center();
    let kind = enemy.kind;
    let elite = enemy.elite;
    let score_value = enemy.score_value;
    let drop_at = Vec2::new(center.x, enemy.pos.y);

    let burst = if kind == EnemyKind::Boss { 30 } else { 10 };
    spawn_explosion(state, center, burst, rng);
    state.play(SoundCue::Explosion);

    if kind == EnemyKind::Bonus {
        record_bonus_kill(state);
        return;
    }

    let points = if state.player.double_score_active(state.clock_ms) {
        score_value * 2
    } else {
        score_value
    };
    state.add_score(points);

    match kind {
        EnemyKind::Boss => {
            state.spawn_powerup(drop_at, roll_powerup(rng));
            state.spawn_powerup(drop_at + Vec2::new(POWERUP_SIZE * 1.5, 0.0), PowerUpKind::Fragment);
            state.boss = None;
            state.shake(20.0);
            log::info!("Boss defeated on level {}", state.level);
        }
        _ if elite => state.spawn_powerup(drop_at, roll_powerup(rng)),
        _ => {
            if rng.chance(state.fragments.drop_chance()) {
                state.spawn_powerup(drop_at, roll_powerup(rng));
            }
        }
    }
}

fn spawn_explosion(state: &mut GameState, center: Vec2, count: usize, rng: &mut impl RandomSource) {
    const FIRE: [u32; 3] = [0xFF5500, 0xFFAA00, 0xFFDD00];
    for _ in 0..count {
        let vel = Vec2::new(rng.range(-6.0, 6.0), rng.range(-6.0, 6.0));
        let color = FIRE[rng.index(FIRE.len())];
        state.spawn_particle(Particle {
            pos: center,
            vel,
            life: 1.0,
            color,
        });
    }
}

/// Enemy bullets, enemy bodies and the boss laser against the player
pub fn resolve_threats(state: &mut GameState) {
    let hitbox = state.player.hitbox();
    let mut hits = 0;

    for bullet in state.bullets.iter_mut() {
        if bullet.active && bullet.owner == BulletOwner::Enemy && bullet.rect().intersects(&hitbox) {
            bullet.active = false;
            hits += 1;
        }
    }

    for enemy in state.enemies.iter_mut() {
        if enemy.alive && enemy.kind != EnemyKind::Bonus && enemy.rect().intersects(&hitbox) {
            if !enemy.is_boss() {
                enemy.alive = false;
            }
            hits += 1;
        }
    }

    if laser_rect(state).is_some_and(|beam| beam.intersects(&hitbox)) {
        hits += 1;
    }

    for _ in 0..hits {
        handle_player_hit(state);
    }
}

/// Consume overlapping power-ups
pub fn collect_powerups(state: &mut GameState, rng: &mut impl RandomSource) {
    let hitbox = state.player.hitbox();
    let mut collected = Vec::new();
    for p in state.powerups.iter_mut() {
        if p.active && p.rect().intersects(&hitbox) {
            p.active = false;
            collected.push(p.kind);
        }
    }
    state.powerups.retain(|p| p.active);
    for kind in collected {
        log::debug!("Collected {:?}", kind);
        apply_powerup(state, kind, rng);
    }
}

/// Apply one damaging contact to the player.
///
/// Invulnerability ignores the hit entirely. A shield charge absorbs it and
/// leaves the loadout alone; otherwise the loadout falls back to the Fragment
/// baseline and a life is lost.
pub fn handle_player_hit(state: &mut GameState) {
    let now = state.clock_ms;
    if state.phase != GamePhase::Playing || state.player.is_invulnerable(now) {
        return;
    }

    if state.player.loadout.shields > 0 {
        state.player.loadout.shields -= 1;
        state.player.invulnerable_until = now + SHIELD_INVULN_MS;
        state.shake(10.0);
        state.play(SoundCue::PowerUp);
        return;
    }

    state.player.loadout = state.fragments.baseline();
    state.player.invulnerable_until = now + HIT_INVULN_MS;
    state.shake(25.0);
    state.lives = state.lives.saturating_sub(1);

    if state.lives == 0 {
        state.phase = GamePhase::GameOver;
        state.play(SoundCue::MusicStop);
        state.play(SoundCue::GameOver);
        log::info!("Game over: score {} on level {}", state.score, state.level);
        state.emit(GameEvent::GameOver {
            score: state.score,
            level: state.level,
        });
    } else {
        state.play(SoundCue::Explosion);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::random::ScriptedRandom;
    use crate::sim::state::{Enemy, FragmentLedger, Loadout};
    use proptest::prelude::*;

    fn playing_state() -> GameState {
        let mut state = GameState::new(1, &Settings::default());
        state.phase = GamePhase::Playing;
        state.clock_ms = 10_000;
        state
    }

    fn enemy_centered(state: &mut GameState, center: Vec2, hp: i32) -> usize {
        let id = state.next_entity_id();
        let pos = center - Vec2::splat(ENEMY_SIZE / 2.0);
        state.enemies.push(Enemy {
            id,
            pos,
            size: ENEMY_SIZE,
            alive: true,
            kind: EnemyKind::Red,
            hp,
            max_hp: hp,
            origin: pos,
            diving: false,
            dive_angle: 0.0,
            score_value: 100,
            elite: false,
            vel: Vec2::ZERO,
        });
        state.enemies.len() - 1
    }

    fn player_bullet(state: &mut GameState, center: Vec2, kind: BulletKind) {
        state.spawn_bullet(
            center - Vec2::new(2.0, 6.0),
            Vec2::ZERO,
            Vec2::new(4.0, 12.0),
            0,
            BulletOwner::Player,
            kind,
        );
    }

    #[test]
    fn test_standard_bolt_is_spent() {
        let mut state = playing_state();
        let idx = enemy_centered(&mut state, Vec2::new(100.0, 100.0), 2);
        player_bullet(&mut state, Vec2::new(100.0, 100.0), BulletKind::Standard);
        resolve_player_attacks(&mut state, &mut ScriptedRandom::constant(0.99));
        assert!(!state.bullets[0].active);
        assert_eq!(state.enemies[idx].hp, 1);
        assert_eq!(state.screen_shake, 5.0);
    }

    #[test]
    fn test_piercing_hits_each_enemy_once() {
        let mut state = playing_state();
        let a = enemy_centered(&mut state, Vec2::new(100.0, 100.0), 5);
        let b = enemy_centered(&mut state, Vec2::new(100.0, 120.0), 5);
        player_bullet(
            &mut state,
            Vec2::new(100.0, 110.0),
            BulletKind::Piercing {
                hit_enemies: Vec::new(),
            },
        );
        let mut rng = ScriptedRandom::constant(0.99);
        for _ in 0..5 {
            resolve_player_attacks(&mut state, &mut rng);
        }
        assert!(state.bullets[0].active);
        assert_eq!(state.enemies[a].hp, 4);
        assert_eq!(state.enemies[b].hp, 4);
    }

    #[test]
    fn test_splash_radius_sixty() {
        let mut state = playing_state();
        let primary = enemy_centered(&mut state, Vec2::new(200.0, 300.0), 10);
        let near = enemy_centered(&mut state, Vec2::new(230.0, 300.0), 10);
        let far = enemy_centered(&mut state, Vec2::new(270.0, 300.0), 10);
        state.spawn_bullet(
            Vec2::new(196.0, 296.0),
            Vec2::ZERO,
            Vec2::splat(8.0),
            0,
            BulletOwner::Player,
            BulletKind::Thunder {
                damage: 3,
                radius: 60.0,
            },
        );
        resolve_player_attacks(&mut state, &mut ScriptedRandom::constant(0.99));
        assert!(!state.bullets[0].active);
        assert_eq!(state.enemies[primary].hp, 7);
        assert_eq!(state.enemies[near].hp, 8);
        assert_eq!(state.enemies[far].hp, 10);
        assert!(state.particles.len() >= ARC_PARTICLES);
    }

    #[test]
    fn test_splash_kill_pays_out() {
        let mut state = playing_state();
        let primary = enemy_centered(&mut state, Vec2::new(200.0, 300.0), 10);
        let near = enemy_centered(&mut state, Vec2::new(230.0, 300.0), 2);
        state.spawn_bullet(
            Vec2::new(196.0, 296.0),
            Vec2::ZERO,
            Vec2::splat(8.0),
            0,
            BulletOwner::Player,
            BulletKind::Thunder {
                damage: 3,
                radius: 60.0,
            },
        );
        // 0.0 passes the drop roll and picks a Weapon pickup
        resolve_player_attacks(&mut state, &mut ScriptedRandom::constant(0.0));
        assert!(state.enemies[primary].alive);
        assert!(!state.enemies[near].alive);
        assert_eq!(state.score, 100);
        assert_eq!(state.powerups.len(), 1);
        assert_eq!(state.powerups[0].kind, PowerUpKind::Weapon);
        assert!(state.events.contains(&GameEvent::Sound(SoundCue::Explosion)));
    }

    #[test]
    fn test_splash_damage_amount() {
        assert_eq!(splash_damage(40.0), 1);
        assert_eq!(splash_damage(60.0), 2);
    }

    #[test]
    fn test_ricochet_spawns_shards() {
        let mut state = playing_state();
        enemy_centered(&mut state, Vec2::new(100.0, 100.0), 3);
        player_bullet(&mut state, Vec2::new(100.0, 100.0), BulletKind::Ricochet);
        resolve_player_attacks(&mut state, &mut ScriptedRandom::constant(0.5));
        let shards: Vec<_> = state
            .bullets
            .iter()
            .filter(|b| b.kind == BulletKind::Shard)
            .collect();
        assert_eq!(shards.len(), 3);
        for s in shards {
            // 0.5 -> straight up
            assert!(s.vel.y < -7.9);
        }
    }

    #[test]
    fn test_kill_awards_score_and_double_window() {
        let mut state = playing_state();
        enemy_centered(&mut state, Vec2::new(100.0, 100.0), 1);
        state.player.double_score_until = state.clock_ms + 1;
        player_bullet(&mut state, Vec2::new(100.0, 100.0), BulletKind::Standard);
        resolve_player_attacks(&mut state, &mut ScriptedRandom::constant(0.99));
        assert!(!state.enemies[0].alive);
        assert_eq!(state.score, 200);
        assert_eq!(state.particles.len(), 10);
        assert!(state.events.contains(&GameEvent::Sound(SoundCue::Explosion)));
        // 0.99 fails the drop roll
        assert!(state.powerups.is_empty());
    }

    #[test]
    fn test_drop_roll() {
        let mut state = playing_state();
        enemy_centered(&mut state, Vec2::new(100.0, 100.0), 1);
        damage_enemy(&mut state, 0, 1, &mut ScriptedRandom::constant(0.0));
        assert_eq!(state.powerups.len(), 1);
        assert_eq!(state.powerups[0].kind, PowerUpKind::Weapon);
    }

    #[test]
    fn test_elite_always_drops() {
        let mut state = playing_state();
        enemy_centered(&mut state, Vec2::new(100.0, 100.0), 1);
        state.enemies[0].elite = true;
        damage_enemy(&mut state, 0, 1, &mut ScriptedRandom::constant(0.99));
        assert_eq!(state.powerups.len(), 1);
    }

    #[test]
    fn test_boss_drops_fragment() {
        let mut state = playing_state();
        state.level = 5;
        crate::sim::boss::spawn_boss(&mut state);
        damage_enemy(&mut state, 0, 10_000, &mut ScriptedRandom::constant(0.99));
        assert!(state.boss.is_none());
        assert_eq!(state.powerups.len(), 2);
        assert!(state.powerups.iter().any(|p| p.kind == PowerUpKind::Fragment));
        assert_eq!(state.score, 10_000);
    }

    #[test]
    fn test_bonus_kill_counts_toward_tally() {
        use crate::sim::stage::{BonusTally, StagePhase};
        let mut state = playing_state();
        state.stage = StagePhase::Playing {
            since: 0,
            next_level: 20,
            tally: BonusTally::default(),
            last_wave: 0,
        };
        enemy_centered(&mut state, Vec2::new(100.0, 100.0), 1);
        state.enemies[0].kind = EnemyKind::Bonus;
        damage_enemy(&mut state, 0, 1, &mut ScriptedRandom::constant(0.0));
        assert_eq!(state.score, 0);
        assert!(state.powerups.is_empty());
        assert!(matches!(state.stage, StagePhase::Playing { tally, .. } if tally.kills == 1));
    }

    #[test]
    fn test_orbital_rearm() {
        let mut state = playing_state();
        state.player.loadout.orbitals = 1;
        state.player.orbital_angle = 0.0;
        let drone = state.player.center() + Vec2::new(crate::sim::steering::ORBITAL_RADIUS, 0.0);
        let idx = enemy_centered(&mut state, drone, 10);
        let mut rng = ScriptedRandom::constant(0.99);
        resolve_player_attacks(&mut state, &mut rng);
        assert_eq!(state.enemies[idx].hp, 9);
        state.clock_ms += ORBITAL_REARM_MS - 1;
        resolve_player_attacks(&mut state, &mut rng);
        assert_eq!(state.enemies[idx].hp, 9);
        state.clock_ms += 1;
        resolve_player_attacks(&mut state, &mut rng);
        assert_eq!(state.enemies[idx].hp, 8);
    }

    #[test]
    fn test_enemy_contact_kills_enemy() {
        let mut state = playing_state();
        state.player.loadout.shields = 1;
        let center = state.player.center();
        enemy_centered(&mut state, center, 1);
        resolve_threats(&mut state);
        assert!(!state.enemies[0].alive);
        assert_eq!(state.player.loadout.shields, 0);
        // Contact kills award nothing
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_bonus_targets_are_harmless() {
        let mut state = playing_state();
        let center = state.player.center();
        enemy_centered(&mut state, center, 1);
        state.enemies[0].kind = EnemyKind::Bonus;
        resolve_threats(&mut state);
        assert!(state.enemies[0].alive);
        assert_eq!(state.lives, 3);
    }

    #[test]
    fn test_enemy_bullet_hits_player() {
        let mut state = playing_state();
        let center = state.player.center();
        state.spawn_bullet(
            center,
            Vec2::ZERO,
            Vec2::new(4.0, 8.0),
            0,
            BulletOwner::Enemy,
            BulletKind::Standard,
        );
        resolve_threats(&mut state);
        assert!(!state.bullets[0].active);
        assert_eq!(state.lives, 2);
        assert!(state.player.is_invulnerable(state.clock_ms));
    }

    #[test]
    fn test_firing_laser_costs_a_life() {
        let mut state = playing_state();
        crate::sim::boss::spawn_boss(&mut state);
        let lane_x = state.player.center().x;
        if let Some(b) = state.boss.as_mut() {
            b.laser = crate::sim::boss::LaserState::Warning {
                lane_x,
                since: state.clock_ms,
            };
        }
        resolve_threats(&mut state);
        assert_eq!(state.lives, 3);

        if let Some(b) = state.boss.as_mut() {
            b.laser = crate::sim::boss::LaserState::Firing {
                lane_x,
                since: state.clock_ms,
            };
        }
        resolve_threats(&mut state);
        assert_eq!(state.lives, 2);
        assert!(state.player.is_invulnerable(state.clock_ms));
    }

    #[test]
    fn test_invulnerability_blocks_hits() {
        let mut state = playing_state();
        state.player.invulnerable_until = state.clock_ms + 10;
        handle_player_hit(&mut state);
        assert_eq!(state.lives, 3);
    }

    #[test]
    fn test_last_life_ends_game() {
        let mut state = playing_state();
        state.lives = 1;
        state.score = 1234;
        handle_player_hit(&mut state);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.lives, 0);
        assert!(state.events.contains(&GameEvent::GameOver {
            score: 1234,
            level: 1
        }));
        assert!(state.events.contains(&GameEvent::Sound(SoundCue::GameOver)));
        assert!(state.events.contains(&GameEvent::Sound(SoundCue::MusicStop)));
    }

    #[test]
    fn test_collect_powerup() {
        let mut state = playing_state();
        let center = state.player.center();
        state.spawn_powerup(center, PowerUpKind::Weapon);
        collect_powerups(&mut state, &mut ScriptedRandom::constant(0.5));
        assert!(state.powerups.is_empty());
        assert_eq!(state.player.loadout.weapon_tier, 2);
    }

    fn arb_loadout() -> impl Strategy<Value = Loadout> {
        (1u8..=5, 0u8..=3, 0u8..=5, 0u8..=5, 0u8..=3).prop_map(|(w, s, t, a, o)| Loadout {
            weapon_tier: w,
            shields: s,
            thunder_tier: t,
            ally_tier: a,
            orbitals: o,
        })
    }

    fn arb_ledger() -> impl Strategy<Value = FragmentLedger> {
        (0u8..=3, 0u8..=5, 0u8..=2, 0u8..=3, 0u8..=3).prop_map(|(w, d, s, sp, o)| {
            FragmentLedger {
                weapon: w,
                drop_rate: d,
                shield: s,
                speed: sp,
                orbital: o,
            }
        })
    }

    proptest! {
        #[test]
        fn prop_shield_absorbs_exactly_one(loadout in arb_loadout()) {
            prop_assume!(loadout.shields > 0);
            let mut state = playing_state();
            state.player.loadout = loadout;
            handle_player_hit(&mut state);
            let after = state.player.loadout;
            prop_assert_eq!(after.shields, loadout.shields - 1);
            prop_assert_eq!(after.weapon_tier, loadout.weapon_tier);
            prop_assert_eq!(after.thunder_tier, loadout.thunder_tier);
            prop_assert_eq!(after.ally_tier, loadout.ally_tier);
            prop_assert_eq!(after.orbitals, loadout.orbitals);
            prop_assert_eq!(state.lives, 3);
            prop_assert_eq!(state.player.invulnerable_until, state.clock_ms + SHIELD_INVULN_MS);
        }

        #[test]
        fn prop_damage_resets_to_fragment_floor(ledger in arb_ledger(), loadout in arb_loadout()) {
            let mut state = playing_state();
            state.fragments = ledger;
            // Fragment pickups keep the live loadout at or above the baseline
            let base = ledger.baseline();
            state.player.loadout = Loadout {
                weapon_tier: loadout.weapon_tier.max(base.weapon_tier),
                shields: 0,
                ..loadout
            };
            let before = state.player.loadout;
            handle_player_hit(&mut state);
            let after = state.player.loadout;
            prop_assert_eq!(after.weapon_tier, (1 + ledger.weapon).min(5));
            prop_assert_eq!(after.shields, ledger.shield);
            prop_assert_eq!(after.thunder_tier, 0);
            prop_assert_eq!(after.ally_tier, 0);
            prop_assert!(after.weapon_tier <= before.weapon_tier);
            prop_assert_eq!(state.lives, 2);
        }

        #[test]
        fn prop_piercing_hit_set_unique(
            centers in proptest::collection::vec((80.0f32..120.0, 80.0f32..120.0), 1..8),
            frames in 1usize..6,
        ) {
            let mut state = playing_state();
            for (x, y) in &centers {
                enemy_centered(&mut state, Vec2::new(*x, *y), 100);
            }
            state.spawn_bullet(
                Vec2::new(90.0, 90.0),
                Vec2::ZERO,
                Vec2::new(20.0, 20.0),
                0,
                BulletOwner::Player,
                BulletKind::Piercing { hit_enemies: Vec::new() },
            );
            let mut rng = ScriptedRandom::constant(0.99);
            for _ in 0..frames {
                resolve_player_attacks(&mut state, &mut rng);
            }
            let BulletKind::Piercing { hit_enemies } = &state.bullets[0].kind else {
                panic!("piercing bolt changed kind");
            };
            let mut seen = hit_enemies.clone();
            seen.sort_unstable();
            seen.dedup();
            prop_assert_eq!(seen.len(), hit_enemies.len());
            for e in &state.enemies {
                prop_assert!(e.hp >= 99);
            }
        }
    }
}
