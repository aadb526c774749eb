//! Weapon systems
//!
//! The primary weapon plus three auxiliary systems (thunder orbs, ally
//! wingmen, orbital drones), each driven by a tier-indexed parameter table.
//! Every system fires on its own cooldown against the game clock.

use glam::Vec2;

use super::state::{BulletKind, BulletOwner, GameState};
use super::steering::{ORBITAL_SPEED, nearest_enemy};
use super::tick::TickInput;
use crate::audio::SoundCue;
use crate::consts::*;
use crate::{direction_to, rotate};

/// One bolt of a primary volley: x offset of its left edge from the muzzle, and velocity
#[derive(Debug, Clone, Copy)]
pub struct Bolt {
    pub dx: f32,
    pub vel: Vec2,
}

const fn bolt(dx: f32, vx: f32, vy: f32) -> Bolt {
    Bolt {
        dx,
        vel: Vec2::new(vx, vy),
    }
}

const TIER_1: [Bolt; 1] = [bolt(-2.0, 0.0, -10.0)];
const TIER_2: [Bolt; 2] = [bolt(-10.0, 0.0, -10.0), bolt(6.0, 0.0, -10.0)];
const SPREAD_3: [Bolt; 3] = [
    bolt(-2.0, 0.0, -10.0),
    bolt(-12.0, -2.0, -10.0),
    bolt(8.0, 2.0, -10.0),
];
const TIER_5: [Bolt; 5] = [
    bolt(-2.0, 0.0, -10.0),
    bolt(-14.0, -1.5, -10.0),
    bolt(10.0, 1.5, -10.0),
    bolt(-22.0, -3.5, -9.0),
    bolt(18.0, 3.5, -9.0),
];

/// Primary weapon parameters for a tier
#[derive(Debug, Clone, Copy)]
pub struct PrimaryPattern {
    pub bolts: &'static [Bolt],
    pub size: Vec2,
    pub color: u32,
    pub ricochet: bool,
    pub piercing: bool,
}

pub fn primary_pattern(tier: u8) -> PrimaryPattern {
    let standard = Vec2::new(4.0, 12.0);
    match tier {
        0 | 1 => PrimaryPattern {
            bolts: &TIER_1,
            size: standard,
            color: 0x00FFFF,
            ricochet: false,
            piercing: false,
        },
        2 => PrimaryPattern {
            bolts: &TIER_2,
            size: standard,
            color: 0x00FFFF,
            ricochet: false,
            piercing: false,
        },
        3 => PrimaryPattern {
            bolts: &SPREAD_3,
            size: standard,
            color: 0x00FFFF,
            ricochet: false,
            piercing: false,
        },
        4 => PrimaryPattern {
            bolts: &SPREAD_3,
            size: standard,
            color: 0xFFD700,
            ricochet: true,
            piercing: false,
        },
        _ => PrimaryPattern {
            bolts: &TIER_5,
            size: Vec2::new(5.0, 14.0),
            color: 0x00FF88,
            ricochet: false,
            piercing: true,
        },
    }
}

/// Primary fire interval (ms), shortening with tier
pub fn fire_interval(tier: u8) -> u64 {
    300u64.saturating_sub(tier as u64 * 20).max(100)
}

/// Thunder orb parameters for one tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThunderTier {
    pub cooldown: u64,
    pub count: u32,
    pub speed: f32,
    pub damage: i32,
    pub radius: f32,
}

const THUNDER_TABLE: [ThunderTier; 5] = [
    ThunderTier { cooldown: 1500, count: 1, speed: 3.0, damage: 1, radius: 0.0 },
    ThunderTier { cooldown: 1200, count: 1, speed: 4.0, damage: 2, radius: 0.0 },
    ThunderTier { cooldown: 1000, count: 2, speed: 4.0, damage: 2, radius: 0.0 },
    ThunderTier { cooldown: 800, count: 2, speed: 5.0, damage: 2, radius: 40.0 },
    ThunderTier { cooldown: 600, count: 3, speed: 5.0, damage: 3, radius: 60.0 },
];

/// Spread between multiple orbs of one volley (radians)
const THUNDER_SPREAD: f32 = 0.3;
const THUNDER_SIZE: f32 = 8.0;

pub fn thunder_tier(tier: u8) -> Option<ThunderTier> {
    match tier {
        0 => None,
        t => Some(THUNDER_TABLE[(t.min(5) - 1) as usize]),
    }
}

/// Ally wingman parameters for one tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllyTier {
    pub cooldown: u64,
    /// Horizontal distance of each wingman from the player center
    pub offset: f32,
    pub bolts_per_wingman: u32,
}

const ALLY_COOLDOWNS: [u64; 5] = [600, 520, 450, 400, 350];

pub fn ally_tier(tier: u8) -> Option<AllyTier> {
    match tier {
        0 => None,
        t => {
            let t = t.min(5);
            Some(AllyTier {
                cooldown: ALLY_COOLDOWNS[(t - 1) as usize],
                offset: 30.0 + 4.0 * t as f32,
                bolts_per_wingman: if t < 3 { 1 } else { 2 },
            })
        }
    }
}

/// Move the player from held directions or a pointer position
pub fn move_player(state: &mut GameState, input: &TickInput) {
    let speed = PLAYER_SPEED + state.fragments.speed_bonus();
    let player = &mut state.player;
    if input.left && player.pos.x > 0.0 {
        player.pos.x -= speed;
    }
    if input.right && player.pos.x < FIELD_WIDTH - PLAYER_SIZE {
        player.pos.x += speed;
    }
    if let Some(x) = input.pointer_x {
        player.pos.x = x - PLAYER_SIZE / 2.0;
    }
    player.pos.x = player.pos.x.clamp(0.0, FIELD_WIDTH - PLAYER_SIZE);
    player.orbital_angle = (player.orbital_angle + ORBITAL_SPEED) % std::f32::consts::TAU;
}

/// Fire every weapon system whose cooldown has elapsed
pub fn fire_weapons(state: &mut GameState) {
    let now = state.clock_ms;
    fire_primary(state, now);
    fire_thunder(state, now);
    fire_allies(state, now);
}

fn fire_primary(state: &mut GameState, now: u64) {
    let tier = state.player.loadout.weapon_tier;
    if now.saturating_sub(state.player.last_shot) <= fire_interval(tier) {
        return;
    }
    let pattern = primary_pattern(tier);
    let muzzle = state.player.muzzle();
    for b in pattern.bolts {
        let kind = if pattern.piercing {
            BulletKind::Piercing {
                hit_enemies: Vec::new(),
            }
        } else if pattern.ricochet {
            BulletKind::Ricochet
        } else {
            BulletKind::Standard
        };
        state.spawn_bullet(
            Vec2::new(muzzle.x + b.dx, muzzle.y),
            b.vel,
            pattern.size,
            pattern.color,
            BulletOwner::Player,
            kind,
        );
    }
    state.play(SoundCue::Shoot);
    state.player.last_shot = now;
}

fn fire_thunder(state: &mut GameState, now: u64) {
    let Some(params) = thunder_tier(state.player.loadout.thunder_tier) else {
        return;
    };
    if now.saturating_sub(state.player.last_thunder) <= params.cooldown {
        return;
    }
    let muzzle = state.player.muzzle();
    let aim = nearest_enemy(&state.enemies, muzzle).map(|target| direction_to(muzzle, target));

    for i in 0..params.count {
        let vel = match aim {
            Some(dir) => {
                let base = dir * params.speed;
                if params.count > 1 {
                    let spread = (i as f32 - (params.count - 1) as f32 / 2.0) * THUNDER_SPREAD;
                    rotate(base, spread)
                } else {
                    base
                }
            }
            None => Vec2::new(0.0, -params.speed),
        };
        state.spawn_bullet(
            Vec2::new(muzzle.x - THUNDER_SIZE / 2.0, muzzle.y),
            vel,
            Vec2::splat(THUNDER_SIZE),
            0xAA77FF,
            BulletOwner::Player,
            BulletKind::Thunder {
                damage: params.damage,
                radius: params.radius,
            },
        );
    }
    state.player.last_thunder = now;
}

fn fire_allies(state: &mut GameState, now: u64) {
    let Some(params) = ally_tier(state.player.loadout.ally_tier) else {
        return;
    };
    if now.saturating_sub(state.player.last_ally) <= params.cooldown {
        return;
    }
    let center = state.player.center();
    let y = state.player.pos.y + 12.0;
    let size = Vec2::new(3.0, 10.0);
    let bolt_offsets: &[f32] = if params.bolts_per_wingman == 1 {
        &[0.0]
    } else {
        &[-3.0, 3.0]
    };
    for side in [-1.0f32, 1.0] {
        let wing_x = center.x + side * params.offset;
        for dx in bolt_offsets {
            state.spawn_bullet(
                Vec2::new(wing_x + dx - size.x / 2.0, y),
                Vec2::new(0.0, -9.0),
                size,
                0x76FF03,
                BulletOwner::Player,
                BulletKind::Standard,
            );
        }
    }
    state.player.last_ally = now;
}

/// Wingman centers for the renderer
pub fn wingman_positions(state: &GameState) -> Vec<Vec2> {
    match ally_tier(state.player.loadout.ally_tier) {
        Some(params) => {
            let c = state.player.center();
            vec![
                Vec2::new(c.x - params.offset, c.y + 12.0),
                Vec2::new(c.x + params.offset, c.y + 12.0),
            ]
        }
        None => Vec::new(),
    }
}
