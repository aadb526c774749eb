//! Boss encounter
//!
//! A boss escalates through three phases as its HP drops. Each phase adds an
//! attack on top of the radial burst: homing missiles in phase 2, then escort
//! minions and a telegraphed laser in phase 3.

use std::f32::consts::PI;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::progression::{boss_factor, boss_shot_chance, difficulty_factor};
use super::random::RandomSource;
use super::rect::Rect;
use super::state::{BulletKind, BulletOwner, Enemy, EnemyKind, GameEvent, GameState};
use crate::audio::SoundCue;
use crate::consts::*;
use crate::{direction_to, rotate};

/// Resting height of the boss after its entry
pub const BOSS_REST_Y: f32 = 100.0;
const BOSS_ENTRY_Y: f32 = -150.0;
const BOSS_ENTRY_SPEED: f32 = 2.0;

pub const MISSILE_SPEED: f32 = 3.5;
pub const MISSILE_LIFETIME_MS: u64 = 5000;
const MISSILE_SIZE: f32 = 8.0;
const MISSILE_SPREAD: f32 = 0.4;

pub const LASER_COOLDOWN_MS: u64 = 4000;
pub const LASER_WARNING_MS: u64 = 1000;
pub const LASER_FIRING_MS: u64 = 700;
pub const LASER_WIDTH: f32 = 24.0;
const LASER_JITTER: f32 = 30.0;

const MINION_HP: i32 = 3;
const MINION_GAP: f32 = 10.0;

/// Combat phase of one boss. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BossPhase {
    One,
    Two,
    Three,
}

impl BossPhase {
    pub fn number(self) -> u8 {
        match self {
            BossPhase::One => 1,
            BossPhase::Two => 2,
            BossPhase::Three => 3,
        }
    }

    pub fn next(self) -> BossPhase {
        match self {
            BossPhase::One => BossPhase::Two,
            BossPhase::Two | BossPhase::Three => BossPhase::Three,
        }
    }

    /// Horizontal sway amplitude (px)
    pub fn amplitude(self) -> f32 {
        match self {
            BossPhase::One => 100.0,
            BossPhase::Two => 140.0,
            BossPhase::Three => 170.0,
        }
    }

    /// Missile volley interval and size, if this phase fires missiles
    pub fn missile_volley(self) -> Option<(u64, u32)> {
        match self {
            BossPhase::One => None,
            BossPhase::Two => Some((3000, 1)),
            BossPhase::Three => Some((2500, 2)),
        }
    }
}

/// Phase the boss HP ratio calls for at `level`
pub fn target_phase(hp_ratio: f32, level: u32) -> BossPhase {
    let late = level >= 10;
    let two_at = if late { 0.7 } else { 0.6 };
    if late && hp_ratio <= 0.3 {
        BossPhase::Three
    } else if hp_ratio <= two_at {
        BossPhase::Two
    } else {
        BossPhase::One
    }
}

/// Phase-3 laser cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LaserState {
    /// Cooling down since `since`
    Idle { since: u64 },
    /// Guide line shown over the locked lane
    Warning { lane_x: f32, since: u64 },
    /// Beam is live and damages the player
    Firing { lane_x: f32, since: u64 },
}

impl LaserState {
    /// Advance the cycle at `now`. The lane locks onto `player_center_x` plus
    /// `jitter` when the warning starts.
    pub fn step(self, now: u64, player_center_x: f32, jitter: f32) -> LaserState {
        match self {
            LaserState::Idle { since } if now.saturating_sub(since) >= LASER_COOLDOWN_MS => {
                let half = LASER_WIDTH / 2.0;
                LaserState::Warning {
                    lane_x: (player_center_x + jitter).clamp(half, FIELD_WIDTH - half),
                    since: now,
                }
            }
            LaserState::Warning { lane_x, since }
                if now.saturating_sub(since) >= LASER_WARNING_MS =>
            {
                LaserState::Firing { lane_x, since: now }
            }
            LaserState::Firing { since, .. } if now.saturating_sub(since) >= LASER_FIRING_MS => {
                LaserState::Idle { since: now }
            }
            other => other,
        }
    }

    pub fn is_firing(&self) -> bool {
        matches!(self, LaserState::Firing { .. })
    }
}

/// State of the active boss fight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossEncounter {
    /// Id of the boss entity in `GameState::enemies`
    pub enemy_id: u32,
    pub phase: BossPhase,
    pub last_missile: u64,
    pub laser: LaserState,
    pub minions_spawned: bool,
    /// Which boss of the run this is (1-based)
    pub appearance: u32,
    /// Sway clock (ms), advanced by the enemy time scale
    pub sway_ms: f32,
    /// Game clock at the previous update
    pub last_update: u64,
}

/// Spawn the boss for the current level above the field
pub fn spawn_boss(state: &mut GameState) {
    state.boss_appearances += 1;
    let level = state.level;
    let now = state.clock_ms;
    let hp = ((80 + level * 20) * 2) as i32;
    let x = FIELD_WIDTH / 2.0 - BOSS_SIZE / 2.0;
    let id = state.next_entity_id();
    state.enemies.push(Enemy {
        id,
        pos: Vec2::new(x, BOSS_ENTRY_Y),
        size: BOSS_SIZE,
        alive: true,
        kind: EnemyKind::Boss,
        hp,
        max_hp: hp,
        origin: Vec2::new(x, BOSS_REST_Y),
        diving: false,
        dive_angle: 0.0,
        score_value: 5000 + level as u64 * 1000,
        elite: false,
        vel: Vec2::ZERO,
    });
    state.boss = Some(BossEncounter {
        enemy_id: id,
        phase: BossPhase::One,
        last_missile: now,
        laser: LaserState::Idle { since: now },
        minions_spawned: false,
        appearance: state.boss_appearances,
        sway_ms: 0.0,
        last_update: now,
    });
    state.play(SoundCue::BossSpawn);
    log::info!(
        "Boss #{} spawned on level {} ({} HP)",
        state.boss_appearances,
        level,
        hp
    );
}

/// Move the boss, escalate its phase and run its attacks
pub fn update_boss(state: &mut GameState, rng: &mut impl RandomSource) {
    let Some(mut encounter) = state.boss.take() else {
        return;
    };
    let Some(idx) = state
        .enemies
        .iter()
        .position(|e| e.id == encounter.enemy_id && e.alive)
    else {
        // Boss is gone; the encounter ends with it
        return;
    };

    let now = state.clock_ms;
    let level = state.level;
    let time_scale = state.enemy_time_scale();
    encounter.sway_ms += now.saturating_sub(encounter.last_update) as f32 * time_scale;
    encounter.last_update = now;

    {
        let boss = &mut state.enemies[idx];
        if boss.pos.y < boss.origin.y {
            boss.pos.y = (boss.pos.y + BOSS_ENTRY_SPEED * time_scale).min(boss.origin.y);
        }
        let sway = (encounter.sway_ms / 1000.0).sin() * encounter.phase.amplitude();
        boss.pos.x = boss.origin.x + sway;
    }

    let target = target_phase(state.enemies[idx].hp_ratio(), level);
    if target > encounter.phase {
        encounter.phase = encounter.phase.next();
        enter_phase(state, &mut encounter, idx, now);
    }

    let boss = state.enemies[idx].clone();
    if boss.pos.y >= boss.origin.y {
        radial_burst(state, &encounter, &boss, rng);
        fire_missiles(state, &mut encounter, &boss, now);
        if encounter.phase == BossPhase::Three {
            let jitter = rng.range(-LASER_JITTER, LASER_JITTER);
            encounter.laser = encounter
                .laser
                .step(now, state.player.center().x, jitter);
        }
    }

    state.boss = Some(encounter);
}

fn enter_phase(state: &mut GameState, encounter: &mut BossEncounter, idx: usize, now: u64) {
    log::info!("Boss entered phase {}", encounter.phase.number());
    state.trigger_flash();
    state.shake(15.0);
    state.play(SoundCue::BossSpawn);
    state.emit(GameEvent::BossPhaseChanged(encounter.phase));

    match encounter.phase {
        BossPhase::Two => encounter.last_missile = now,
        BossPhase::Three => {
            encounter.laser = LaserState::Idle { since: now };
            if !encounter.minions_spawned {
                let rect = state.enemies[idx].rect();
                spawn_minions(state, rect);
                encounter.minions_spawned = true;
            }
        }
        BossPhase::One => {}
    }
}

/// Two escorts flanking the boss, flying as ordinary formation enemies
fn spawn_minions(state: &mut GameState, boss: Rect) {
    let y = boss.center().y - ENEMY_SIZE / 2.0;
    let slots = [
        boss.pos.x - MINION_GAP - ENEMY_SIZE,
        boss.right() + MINION_GAP,
    ];
    let score_value = 300 + state.level as u64 * 10;
    for x in slots {
        let pos = Vec2::new(x.clamp(0.0, FIELD_WIDTH - ENEMY_SIZE), y);
        let id = state.next_entity_id();
        state.enemies.push(Enemy {
            id,
            pos,
            size: ENEMY_SIZE,
            alive: true,
            kind: EnemyKind::Purple,
            hp: MINION_HP,
            max_hp: MINION_HP,
            origin: pos,
            diving: false,
            dive_angle: 0.0,
            score_value,
            elite: false,
            vel: Vec2::ZERO,
        });
    }
}

fn radial_burst(
    state: &mut GameState,
    encounter: &BossEncounter,
    boss: &Enemy,
    rng: &mut impl RandomSource,
) {
    if !rng.chance(boss_shot_chance(state.level, encounter.appearance)) {
        return;
    }
    let speed = 5.0 * difficulty_factor(state.level) * boss_factor(encounter.appearance);
    let count = encounter.appearance.clamp(1, 4);
    let origin = Vec2::new(boss.center().x - 3.0, boss.rect().bottom() - 10.0);
    for _ in 0..count {
        let angle = PI / 6.0 + rng.next_f32() * (PI / 1.5);
        state.spawn_bullet(
            origin,
            Vec2::new(angle.cos(), angle.sin()) * speed,
            Vec2::splat(6.0),
            0xFF00FF,
            BulletOwner::Enemy,
            BulletKind::Standard,
        );
    }
}

fn fire_missiles(state: &mut GameState, encounter: &mut BossEncounter, boss: &Enemy, now: u64) {
    let Some((interval, count)) = encounter.phase.missile_volley() else {
        return;
    };
    if now.saturating_sub(encounter.last_missile) < interval {
        return;
    }
    let origin = Vec2::new(boss.center().x, boss.rect().bottom());
    let aim = direction_to(origin, state.player.center());
    let aim = if aim == Vec2::ZERO { Vec2::Y } else { aim };
    for i in 0..count {
        let spread = (i as f32 - (count - 1) as f32 / 2.0) * MISSILE_SPREAD;
        state.spawn_bullet(
            origin - Vec2::splat(MISSILE_SIZE / 2.0),
            rotate(aim, spread) * MISSILE_SPEED,
            Vec2::splat(MISSILE_SIZE),
            0xFF8800,
            BulletOwner::Enemy,
            BulletKind::Homing {
                expires_at: now + MISSILE_LIFETIME_MS,
            },
        );
    }
    encounter.last_missile = now;
}

/// Damage box of the laser beam while it is firing
pub fn laser_rect(state: &GameState) -> Option<Rect> {
    let encounter = state.boss.as_ref()?;
    let LaserState::Firing { lane_x, .. } = encounter.laser else {
        return None;
    };
    let boss = state
        .enemies
        .iter()
        .find(|e| e.id == encounter.enemy_id && e.alive)?;
    let top = boss.rect().bottom();
    Some(Rect::new(
        lane_x - LASER_WIDTH / 2.0,
        top,
        LASER_WIDTH,
        (FIELD_HEIGHT - top).max(0.0),
    ))
}
