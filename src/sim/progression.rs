//! Progression and economy
//!
//! Difficulty curves, power-up selection and the Fragment upgrade bank. The
//! formulas are tuned constants; keep them exact.

use serde::{Deserialize, Serialize};

use super::random::RandomSource;
use super::state::{
    FragmentLedger, FragmentStat, GameEvent, GameState, MAX_ALLY_TIER, MAX_ORBITALS, MAX_SHIELDS,
    MAX_THUNDER_TIER, MAX_WEAPON_TIER, PowerUpKind,
};
use crate::audio::SoundCue;
use crate::consts::*;

/// General speed/probability multiplier for a level
pub fn difficulty_factor(level: u32) -> f32 {
    1.0 + level as f32 * 0.01
}

/// Escalation across repeated boss fights in one run
pub fn boss_factor(appearances: u32) -> f32 {
    1.1f32.powi(appearances.saturating_sub(1) as i32)
}

/// Per-tick shot probability for a formation enemy
pub fn enemy_shot_chance(level: u32) -> f32 {
    (0.002 + level as f32 * 0.0005) * difficulty_factor(level)
}

/// Per-tick radial burst probability for the boss
pub fn boss_shot_chance(level: u32, appearances: u32) -> f32 {
    (0.05 + level as f32 * 0.005) * 1.3 * boss_factor(appearances)
}

pub fn is_boss_level(level: u32) -> bool {
    level > 0 && level % 5 == 0
}

/// A bonus stage plays before every level that is a multiple of 20
pub fn is_bonus_level(level: u32) -> bool {
    level > 0 && level % 20 == 0
}

/// Relative drop weights for the standard power-ups (Fragment is boss-only)
pub const POWERUP_WEIGHTS: [(PowerUpKind, u32); 8] = [
    (PowerUpKind::Weapon, 25),
    (PowerUpKind::Shield, 15),
    (PowerUpKind::Life, 8),
    (PowerUpKind::Thunder, 15),
    (PowerUpKind::Ally, 12),
    (PowerUpKind::SlowTime, 8),
    (PowerUpKind::DoubleScore, 8),
    (PowerUpKind::Orbital, 9),
];

/// Weighted pick of a standard power-up
pub fn roll_powerup(rng: &mut impl RandomSource) -> PowerUpKind {
    let total: u32 = POWERUP_WEIGHTS.iter().map(|(_, w)| w).sum();
    let mut roll = rng.next_f32() * total as f32;
    for (kind, weight) in POWERUP_WEIGHTS {
        if roll < weight as f32 {
            return kind;
        }
        roll -= weight as f32;
    }
    POWERUP_WEIGHTS[POWERUP_WEIGHTS.len() - 1].0
}

/// Result of consuming a Fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FragmentOutcome {
    Upgraded(FragmentStat),
    /// Every stat is capped; nothing changed
    AllMaxed,
}

/// Raise one random not-yet-maxed ledger stat
pub fn upgrade_fragment(ledger: &mut FragmentLedger, rng: &mut impl RandomSource) -> FragmentOutcome {
    let open: Vec<FragmentStat> = FragmentStat::ALL
        .iter()
        .copied()
        .filter(|&s| !ledger.is_maxed(s))
        .collect();
    if open.is_empty() {
        return FragmentOutcome::AllMaxed;
    }
    let stat = open[rng.index(open.len())];
    ledger.raise(stat);
    FragmentOutcome::Upgraded(stat)
}

/// Apply a collected power-up to the player
pub fn apply_powerup(state: &mut GameState, kind: PowerUpKind, rng: &mut impl RandomSource) {
    state.play(SoundCue::PowerUp);
    let now = state.clock_ms;
    let loadout = &mut state.player.loadout;
    match kind {
        PowerUpKind::Weapon => loadout.weapon_tier = (loadout.weapon_tier + 1).min(MAX_WEAPON_TIER),
        PowerUpKind::Shield => loadout.shields = (loadout.shields + 1).min(MAX_SHIELDS),
        PowerUpKind::Thunder => {
            loadout.thunder_tier = (loadout.thunder_tier + 1).min(MAX_THUNDER_TIER)
        }
        PowerUpKind::Ally => loadout.ally_tier = (loadout.ally_tier + 1).min(MAX_ALLY_TIER),
        PowerUpKind::Orbital => loadout.orbitals = (loadout.orbitals + 1).min(MAX_ORBITALS),
        PowerUpKind::Life => state.lives = (state.lives + 1).min(state.max_lives),
        PowerUpKind::SlowTime => state.player.slow_until = now + SLOW_TIME_MS,
        PowerUpKind::DoubleScore => state.player.double_score_until = now + DOUBLE_SCORE_MS,
        PowerUpKind::Fragment => {
            let outcome = upgrade_fragment(&mut state.fragments, rng);
            if let FragmentOutcome::Upgraded(stat) = outcome {
                log::debug!("Fragment upgrade: {:?} -> {}", stat, state.fragments.get(stat));
                lift_to_baseline(state);
            } else {
                log::debug!("Fragment collected with every stat maxed");
            }
            state.emit(GameEvent::Fragment(outcome));
        }
    }
}

/// Raise the live loadout to at least the ledger baseline
fn lift_to_baseline(state: &mut GameState) {
    let base = state.fragments.baseline();
    let loadout = &mut state.player.loadout;
    loadout.weapon_tier = loadout.weapon_tier.max(base.weapon_tier);
    loadout.shields = loadout.shields.max(base.shields);
    loadout.orbitals = loadout.orbitals.max(base.orbitals);
}
