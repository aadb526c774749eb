//! Simulation tick
//!
//! Core game loop. Each call captures the game clock once and runs the stages
//! in a fixed order: player and weapons, enemies, bullets, power-ups,
//! particles, collisions, then level transitions.

use super::ai::level_cleared;
use super::collision::resolve_collisions;
use super::progression::is_boss_level;
use super::random::RandomSource;
use super::stage::{enter_level, start_boss_clear, update_stage};
use super::state::{GamePhase, GameState};
use super::steering::{nearest_enemy, update_bullets};
use super::weapons::{fire_weapons, move_player};
use crate::audio::SoundCue;
use crate::consts::*;

/// Input intents for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Move-left held
    pub left: bool,
    /// Move-right held
    pub right: bool,
    /// Pointer position mapped to field x; the ship centers on it
    pub pointer_x: Option<f32>,
    /// Pause toggle (edge-triggered)
    pub pause: bool,
    /// Demo mode - the ship flies itself
    pub autopilot: bool,
}

/// Reset `state` for a new run and start level 1 at wall time `now_ms`
pub fn start_run(state: &mut GameState, now_ms: u64, rng: &mut impl RandomSource) {
    state.phase = GamePhase::Playing;
    state.last_wall_ms = Some(now_ms);
    state.player.loadout = state.fragments.baseline();
    log::info!("Run started (seed {})", state.seed);
    state.play(SoundCue::MusicStart);
    enter_level(state, 1, rng);
}

/// Advance the game by one tick at wall time `now_ms`
pub fn tick(state: &mut GameState, input: &TickInput, now_ms: u64, rng: &mut impl RandomSource) {
    let delta = state
        .last_wall_ms
        .map_or(0, |last| now_ms.saturating_sub(last).min(MAX_FRAME_MS));
    state.last_wall_ms = Some(now_ms);

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                log::info!("Paused at {} ms", state.clock_ms);
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                log::info!("Resumed");
            }
            _ => {}
        }
    }

    // Only a running game advances; the clock stays frozen otherwise
    if state.phase != GamePhase::Playing {
        return;
    }

    state.clock_ms += delta;
    state.frame += 1;

    state.screen_shake *= 0.9;
    if state.screen_shake < 0.01 {
        state.screen_shake = 0.0;
    }
    state.flash *= 0.95;
    if state.flash < 0.01 {
        state.flash = 0.0;
    }

    let mut input = input.clone();
    if input.autopilot {
        input.left = false;
        input.right = false;
        input.pointer_x = Some(autopilot_x(state));
    }

    if state.stage.is_active() {
        update_stage(state, &input, rng);
        return;
    }

    move_player(state, &input);
    fire_weapons(state);
    super::ai::update_enemies(state, rng);
    update_bullets(state);
    update_powerups(state);
    update_particles(state);
    resolve_collisions(state, rng);

    if state.phase == GamePhase::Playing {
        check_level_advance(state, rng);
    }
}

/// Move to the next level once every enemy of a populated level is dead
fn check_level_advance(state: &mut GameState, rng: &mut impl RandomSource) {
    if !level_cleared(&state.enemies) {
        return;
    }
    let cleared = state.level;
    log::info!("Level {} cleared (score {})", cleared, state.score);
    state.play(SoundCue::PowerUp);
    if is_boss_level(cleared) {
        start_boss_clear(state, cleared + 1);
    } else {
        enter_level(state, cleared + 1, rng);
    }
}

/// Drop power-ups and discard those below the field
pub fn update_powerups(state: &mut GameState) {
    for p in state.powerups.iter_mut() {
        p.pos.y += POWERUP_FALL_SPEED;
    }
    state.powerups.retain(|p| p.active && p.pos.y < FIELD_HEIGHT);
}

/// Age particles and drop the expired ones
pub fn update_particles(state: &mut GameState) {
    for p in state.particles.iter_mut() {
        p.pos += p.vel;
        p.life -= 0.02;
    }
    state.particles.retain(|p| p.life > 0.0);
}

/// Where the demo pilot wants the ship's center this tick
fn autopilot_x(state: &GameState) -> f32 {
    let center = state.player.center();

    // Sidestep the closest incoming enemy shot
    let threat = state
        .bullets
        .iter()
        .filter(|b| !b.from_player() && b.pos.y < center.y && center.y - b.pos.y < 120.0)
        .filter(|b| (b.center().x - center.x).abs() < 30.0)
        .max_by(|a, b| {
            a.pos
                .y
                .partial_cmp(&b.pos.y)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
    if let Some(threat) = threat {
        let mut dir = if threat.center().x > center.x { -1.0 } else { 1.0 };
        let target = center.x + dir * 60.0;
        if !(PLAYER_SIZE / 2.0..=FIELD_WIDTH - PLAYER_SIZE / 2.0).contains(&target) {
            dir = -dir;
        }
        return center.x + dir * 60.0;
    }

    // Go get the lowest pickup
    let pickup = state.powerups.iter().filter(|p| p.active).max_by(|a, b| {
        a.pos
            .y
            .partial_cmp(&b.pos.y)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    if let Some(p) = pickup {
        return p.rect().center().x;
    }

    // Track the nearest enemy with a little weave
    let weave = (state.frame as f32 * 0.05).sin() * 20.0;
    nearest_enemy(&state.enemies, center).map_or(FIELD_WIDTH / 2.0, |t| t.x + weave)
}
