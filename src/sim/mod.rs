//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time comes in as an explicit wall-clock reading per tick
//! - Randomness only through `RandomSource`
//! - Stable iteration order (entity lists keep insertion order)
//! - No rendering or platform dependencies

pub mod ai;
pub mod boss;
pub mod collision;
pub mod progression;
pub mod random;
pub mod rect;
pub mod stage;
pub mod state;
pub mod steering;
pub mod tick;
pub mod weapons;

pub use boss::{BossEncounter, BossPhase, LaserState, laser_rect};
pub use progression::FragmentOutcome;
pub use random::{RandomSource, ScriptedRandom};
pub use rect::Rect;
pub use stage::{BonusTally, StagePhase};
pub use state::{
    Bullet, BulletKind, BulletOwner, Enemy, EnemyKind, FragmentLedger, FragmentStat, GameEvent,
    GamePhase, GameState, Loadout, Particle, Player, PowerUp, PowerUpKind,
};
pub use steering::orbital_positions;
pub use tick::{TickInput, start_run, tick};
pub use weapons::wingman_positions;
