//! Star Raid - simulation core for a vertically scrolling arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, weapons, collisions, boss, bonus stage)
//! - `game`: Control surface wrapping the sim and dispatching events to sinks
//! - `platform`: Input mapping and clock abstraction
//! - `audio`: Sound cue sink
//! - `highscores`: Leaderboard persistence sink
//! - `settings`: Run configuration

pub mod audio;
pub mod error;
pub mod game;
pub mod highscores;
pub mod platform;
pub mod settings;
pub mod sim;

pub use error::StarRaidError;
pub use game::Game;
pub use highscores::HighScores;
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Play-field dimensions
    pub const FIELD_WIDTH: f32 = 480.0;
    pub const FIELD_HEIGHT: f32 = 640.0;

    /// Nominal frame duration (~60 Hz)
    pub const FRAME_MS: u64 = 16;
    /// Largest wall-clock step a single tick may consume (ms)
    pub const MAX_FRAME_MS: u64 = 100;

    /// Player ship
    pub const PLAYER_SIZE: f32 = 40.0;
    pub const PLAYER_SPEED: f32 = 6.0;
    /// Collision box inset on each side
    pub const PLAYER_HITBOX_INSET: f32 = 5.0;
    pub const PLAYER_START_Y: f32 = FIELD_HEIGHT - 60.0;

    /// Enemies
    pub const ENEMY_SIZE: f32 = 30.0;
    pub const BOSS_SIZE: f32 = 120.0;

    /// Pickups
    pub const POWERUP_SIZE: f32 = 20.0;
    pub const POWERUP_FALL_SPEED: f32 = 3.0;

    /// Timers (ms)
    pub const SHIELD_INVULN_MS: u64 = 1000;
    pub const HIT_INVULN_MS: u64 = 1500;
    pub const SLOW_TIME_MS: u64 = 5000;
    pub const DOUBLE_SCORE_MS: u64 = 10_000;

    /// Enemy-side speed multiplier while slow-time is active
    pub const SLOW_FACTOR: f32 = 0.5;

    /// Bullets beyond this margin outside the field are discarded
    pub const OFFSCREEN_MARGIN: f32 = 50.0;

    /// Top band (field px) where a tap toggles pause
    pub const PAUSE_TAP_BAND: f32 = 60.0;
}

/// Unit vector from `from` toward `to`.
///
/// Coincident points fall back to a denominator of 1 rather than dividing by zero,
/// so the result is the zero vector.
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    let delta = to - from;
    let dist = delta.length();
    let dist = if dist > 0.0 { dist } else { 1.0 };
    delta / dist
}

/// Rotate a vector by `angle` radians
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}
