//! Movement and steering
//!
//! Formation sway, dive trajectories, homing pursuit and the orbital drone ring.

use glam::Vec2;

use super::state::{BulletKind, BulletOwner, Enemy, Formation, GameState};
use crate::consts::*;
use crate::direction_to;

/// Formation sway step per tick and reversal bound
pub const FORMATION_STEP: f32 = 0.05;
pub const FORMATION_LIMIT: f32 = 30.0;
/// Horizontal sway amplitude (px)
pub const FORMATION_SWAY: f32 = 20.0;

/// Homing blend factors (fraction of the way toward the target heading per tick)
pub const THUNDER_STEER: f32 = 0.08;
pub const MISSILE_STEER: f32 = 0.05;

/// Orbital drone ring
pub const ORBITAL_RADIUS: f32 = 55.0;
pub const ORBITAL_SPEED: f32 = 0.08;
pub const ORBITAL_SIZE: f32 = 14.0;

/// Advance the shared formation offset, reversing at the limit.
/// `time_scale` slows the sway during slow-time.
pub fn update_formation(formation: &mut Formation, time_scale: f32) {
    formation.offset += FORMATION_STEP * formation.dir * time_scale;
    if formation.offset.abs() > FORMATION_LIMIT {
        formation.dir = -formation.dir;
    }
}

/// Swaying x position for a formation slot
#[inline]
pub fn formation_x(origin_x: f32, offset: f32) -> f32 {
    origin_x + offset.sin() * FORMATION_SWAY
}

/// Break an enemy out of formation toward the player
pub fn start_dive(enemy: &mut Enemy, player_center_x: f32) {
    enemy.diving = true;
    let dx = player_center_x - enemy.center().x;
    enemy.dive_angle = 1.0f32.atan2(dx / 100.0);
}

/// Advance a diving enemy by one tick.
///
/// Pursuit is clamped to 3 px/tick horizontally plus a sine wobble; a dive that
/// leaves the bottom re-enters from the top in formation.
pub fn dive_step(enemy: &mut Enemy, player_center_x: f32, difficulty: f32, time_scale: f32) {
    let target_x = player_center_x - enemy.size / 2.0;
    let dx = target_x - enemy.pos.x;
    let pursuit = dx.signum() * dx.abs().min(3.0) * difficulty;
    let pursuit = if dx == 0.0 { 0.0 } else { pursuit };
    enemy.pos.x += (pursuit + enemy.dive_angle.sin() * 2.0) * time_scale;
    enemy.pos.y += 5.0 * difficulty * time_scale;
    enemy.dive_angle += 0.1 * time_scale;

    if enemy.pos.y > FIELD_HEIGHT {
        enemy.pos.y = -50.0;
        enemy.diving = false;
    }
}

/// Blend `vel` toward the heading from `from` to `target`, keeping its speed
pub fn steer_toward(vel: Vec2, from: Vec2, target: Vec2, factor: f32) -> Vec2 {
    let speed = vel.length();
    let speed = if speed > 0.0 { speed } else { 1.0 };
    let desired = direction_to(from, target) * speed;
    let blended = vel + (desired - vel) * factor;
    let new_speed = blended.length();
    let new_speed = if new_speed > 0.0 { new_speed } else { 1.0 };
    blended / new_speed * speed
}

/// Center of the nearest living enemy
pub fn nearest_enemy(enemies: &[Enemy], from: Vec2) -> Option<Vec2> {
    enemies
        .iter()
        .filter(|e| e.alive)
        .map(|e| e.center())
        .min_by(|a, b| {
            a.distance_squared(from)
                .partial_cmp(&b.distance_squared(from))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// Centers of the orbital drones, evenly spaced around the player
pub fn orbital_positions(player_center: Vec2, angle: f32, count: u8) -> Vec<Vec2> {
    let step = std::f32::consts::TAU / count.max(1) as f32;
    (0..count)
        .map(|i| {
            let a = angle + step * i as f32;
            player_center + Vec2::new(a.cos(), a.sin()) * ORBITAL_RADIUS
        })
        .collect()
}

/// Move and steer every projectile, then drop spent or off-field ones
pub fn update_bullets(state: &mut GameState) {
    let now = state.clock_ms;
    let time_scale = state.enemy_time_scale();
    let player_center = state.player.center();
    let enemies = &state.enemies;

    for bullet in state.bullets.iter_mut() {
        match bullet.kind {
            BulletKind::Thunder { .. } => {
                let from = bullet.center();
                if let Some(target) = nearest_enemy(enemies, from) {
                    bullet.vel = steer_toward(bullet.vel, from, target, THUNDER_STEER);
                }
            }
            BulletKind::Homing { expires_at } => {
                if now >= expires_at {
                    bullet.active = false;
                    continue;
                }
                bullet.vel = steer_toward(bullet.vel, bullet.center(), player_center, MISSILE_STEER);
            }
            _ => {}
        }
        let scale = match bullet.owner {
            BulletOwner::Player => 1.0,
            BulletOwner::Enemy => time_scale,
        };
        bullet.pos += bullet.vel * scale;
    }

    state.bullets.retain(|b| b.active && !b.is_offscreen());
}
