//! Bonus stage and boss-clear controller
//!
//! While a stage phase is active it replaces the normal tick pipeline with a
//! reduced one. The bonus stage runs announce, countdown, playing, result and
//! countdown_end on fixed timers; boss-clear is a single respite phase after a
//! boss falls.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::ai;
use super::collision::{collect_powerups, resolve_player_attacks};
use super::progression::is_bonus_level;
use super::random::RandomSource;
use super::state::{Enemy, EnemyKind, GameState};
use super::steering::update_bullets;
use super::tick::{TickInput, update_particles, update_powerups};
use super::weapons::{fire_weapons, move_player};
use crate::consts::*;

pub const ANNOUNCE_MS: u64 = 2000;
pub const COUNTDOWN_MS: u64 = 3000;
pub const PLAYING_MS: u64 = 20_000;
pub const RESULT_MS: u64 = 3000;
pub const COUNTDOWN_END_MS: u64 = 3000;
pub const BOSS_CLEAR_MS: u64 = 3000;

pub const WAVE_INTERVAL_MS: u64 = 1500;
pub const BONUS_KILL_POINTS: u64 = 100;
pub const PERFECT_BONUS: u64 = 5000;

const V_COUNT: u32 = 7;
const V_SPEED: f32 = 3.0;
const SWEEP_COUNT: u32 = 6;
const SWEEP_SPEED: f32 = 4.0;

/// Running totals of one bonus stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusTally {
    /// Points earned from kills (added to the score at the result screen)
    pub score: u64,
    pub kills: u32,
    pub spawned: u32,
}

impl BonusTally {
    /// Every spawned target destroyed
    pub fn is_perfect(&self) -> bool {
        self.spawned > 0 && self.kills >= self.spawned
    }
}

/// Stage controller state. `None` means the normal pipeline runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum StagePhase {
    #[default]
    None,
    Announce {
        since: u64,
        next_level: u32,
    },
    Countdown {
        since: u64,
        next_level: u32,
    },
    Playing {
        since: u64,
        next_level: u32,
        tally: BonusTally,
        last_wave: u64,
    },
    Result {
        since: u64,
        next_level: u32,
        bonus: u64,
        perfect: bool,
    },
    CountdownEnd {
        since: u64,
        next_level: u32,
    },
    BossClear {
        since: u64,
        next_level: u32,
    },
}

impl StagePhase {
    pub fn is_active(&self) -> bool {
        !matches!(self, StagePhase::None)
    }

    pub fn name(&self) -> &'static str {
        match self {
            StagePhase::None => "none",
            StagePhase::Announce { .. } => "announce",
            StagePhase::Countdown { .. } => "countdown",
            StagePhase::Playing { .. } => "playing",
            StagePhase::Result { .. } => "result",
            StagePhase::CountdownEnd { .. } => "countdown_end",
            StagePhase::BossClear { .. } => "boss_clear",
        }
    }

    /// Time left in the current phase, for countdown displays
    pub fn remaining_ms(&self, now: u64) -> u64 {
        let (since, duration) = match *self {
            StagePhase::None => return 0,
            StagePhase::Announce { since, .. } => (since, ANNOUNCE_MS),
            StagePhase::Countdown { since, .. } => (since, COUNTDOWN_MS),
            StagePhase::Playing { since, .. } => (since, PLAYING_MS),
            StagePhase::Result { since, .. } => (since, RESULT_MS),
            StagePhase::CountdownEnd { since, .. } => (since, COUNTDOWN_END_MS),
            StagePhase::BossClear { since, .. } => (since, BOSS_CLEAR_MS),
        };
        duration.saturating_sub(now.saturating_sub(since))
    }

    /// Next phase once the current one has run its course at `now`.
    /// `None` while the current phase is still running.
    fn advance(self, now: u64) -> Option<StagePhase> {
        let elapsed = |since: u64| now.saturating_sub(since);
        match self {
            StagePhase::Announce { since, next_level } if elapsed(since) >= ANNOUNCE_MS => {
                Some(StagePhase::Countdown {
                    since: now,
                    next_level,
                })
            }
            StagePhase::Countdown { since, next_level } if elapsed(since) >= COUNTDOWN_MS => {
                Some(StagePhase::Playing {
                    since: now,
                    next_level,
                    tally: BonusTally::default(),
                    last_wave: now,
                })
            }
            StagePhase::Playing {
                since,
                next_level,
                tally,
                ..
            } if elapsed(since) >= PLAYING_MS => {
                let perfect = tally.is_perfect();
                let bonus = tally.score + if perfect { PERFECT_BONUS } else { 0 };
                Some(StagePhase::Result {
                    since: now,
                    next_level,
                    bonus,
                    perfect,
                })
            }
            StagePhase::Result {
                since, next_level, ..
            } if elapsed(since) >= RESULT_MS => Some(StagePhase::CountdownEnd {
                since: now,
                next_level,
            }),
            StagePhase::CountdownEnd { since, .. } if elapsed(since) >= COUNTDOWN_END_MS => {
                Some(StagePhase::None)
            }
            StagePhase::BossClear { since, .. } if elapsed(since) >= BOSS_CLEAR_MS => {
                Some(StagePhase::None)
            }
            _ => None,
        }
    }
}

/// Start `level`: a bonus stage first if the level calls for one, otherwise
/// its enemies spawn right away
pub fn enter_level(state: &mut GameState, level: u32, rng: &mut impl RandomSource) {
    if is_bonus_level(level) {
        start_bonus(state, level);
    } else {
        ai::start_level(state, level, rng);
    }
}

/// Open the bonus stage that precedes `next_level`
pub fn start_bonus(state: &mut GameState, next_level: u32) {
    state.level = next_level;
    state.enemies.clear();
    state.boss = None;
    state.bullets.retain(|b| b.from_player());
    state.stage = StagePhase::Announce {
        since: state.clock_ms,
        next_level,
    };
    log::info!("Bonus stage before level {}", next_level);
}

/// Post-boss respite, then `next_level`
pub fn start_boss_clear(state: &mut GameState, next_level: u32) {
    state.bullets.retain(|b| b.from_player());
    state.stage = StagePhase::BossClear {
        since: state.clock_ms,
        next_level,
    };
    log::info!("Boss cleared, level {} next", next_level);
}

/// Count a destroyed bonus target
pub fn record_bonus_kill(state: &mut GameState) {
    if let StagePhase::Playing { tally, .. } = &mut state.stage {
        tally.kills += 1;
        tally.score += BONUS_KILL_POINTS;
    }
}

/// Reduced pipeline run instead of the normal tick while a stage is active
pub fn update_stage(state: &mut GameState, input: &TickInput, rng: &mut impl RandomSource) {
    match state.stage {
        StagePhase::None => return,
        StagePhase::Announce { .. } => {
            update_particles(state);
        }
        StagePhase::Countdown { .. } | StagePhase::Result { .. } | StagePhase::CountdownEnd { .. } => {
            move_player(state, input);
            update_bullets(state);
            update_particles(state);
        }
        StagePhase::Playing { .. } => {
            move_player(state, input);
            fire_weapons(state);
            move_bonus_enemies(state);
            spawn_waves(state, rng);
            update_bullets(state);
            update_particles(state);
            resolve_player_attacks(state, rng);
        }
        StagePhase::BossClear { .. } => {
            move_player(state, input);
            update_bullets(state);
            update_powerups(state);
            update_particles(state);
            collect_powerups(state, rng);
        }
    }
    advance_stage(state, rng);
}

fn advance_stage(state: &mut GameState, rng: &mut impl RandomSource) {
    let now = state.clock_ms;
    let current = state.stage;
    let Some(next) = current.advance(now) else {
        return;
    };

    match (current, next) {
        (_, StagePhase::Result { bonus, perfect, .. }) => {
            state.enemies.clear();
            state.add_score(bonus);
            log::info!("Bonus stage result: {} points (perfect: {})", bonus, perfect);
        }
        (StagePhase::CountdownEnd { next_level, .. }, StagePhase::None) => {
            state.stage = StagePhase::None;
            ai::start_level(state, next_level, rng);
            return;
        }
        (StagePhase::BossClear { next_level, .. }, StagePhase::None) => {
            state.stage = StagePhase::None;
            enter_level(state, next_level, rng);
            return;
        }
        _ => {}
    }
    log::info!("Stage phase: {} -> {}", current.name(), next.name());
    state.stage = next;
}

/// Move pass-through targets; those that leave the field are marked dead
fn move_bonus_enemies(state: &mut GameState) {
    let time_scale = state.enemy_time_scale();
    for e in state.enemies.iter_mut() {
        if !e.alive || e.kind != EnemyKind::Bonus {
            continue;
        }
        e.pos += e.vel * time_scale;
        let gone = (e.vel.y > 0.0 && e.pos.y > FIELD_HEIGHT)
            || (e.vel.x > 0.0 && e.pos.x > FIELD_WIDTH)
            || (e.vel.x < 0.0 && e.pos.x + e.size < 0.0);
        if gone {
            e.alive = false;
        }
    }
}

fn spawn_waves(state: &mut GameState, rng: &mut impl RandomSource) {
    let now = state.clock_ms;
    let StagePhase::Playing { last_wave, .. } = state.stage else {
        return;
    };
    if now.saturating_sub(last_wave) < WAVE_INTERVAL_MS {
        return;
    }

    let spawned = if rng.chance(0.5) {
        spawn_v_wave(state, rng)
    } else {
        spawn_sweep_wave(state, rng)
    };

    if let StagePhase::Playing {
        tally, last_wave, ..
    } = &mut state.stage
    {
        tally.spawned += spawned;
        *last_wave = now;
    }
}

/// Seven targets in a V descending from above the field
fn spawn_v_wave(state: &mut GameState, rng: &mut impl RandomSource) -> u32 {
    let center_x = rng.range(100.0, FIELD_WIDTH - 100.0);
    let half = (V_COUNT / 2) as i32;
    for i in 0..V_COUNT as i32 {
        let k = i - half;
        let pos = Vec2::new(
            center_x + k as f32 * 30.0 - ENEMY_SIZE / 2.0,
            -ENEMY_SIZE - k.abs() as f32 * 25.0,
        );
        push_bonus_enemy(state, pos, Vec2::new(0.0, V_SPEED));
    }
    V_COUNT
}

/// Six targets in a line crossing from one edge
fn spawn_sweep_wave(state: &mut GameState, rng: &mut impl RandomSource) -> u32 {
    let from_left = rng.chance(0.5);
    let y = rng.range(80.0, 250.0);
    for i in 0..SWEEP_COUNT {
        let gap = i as f32 * 40.0;
        let (x, vx) = if from_left {
            (-ENEMY_SIZE - gap, SWEEP_SPEED)
        } else {
            (FIELD_WIDTH + gap, -SWEEP_SPEED)
        };
        push_bonus_enemy(state, Vec2::new(x, y), Vec2::new(vx, 0.0));
    }
    SWEEP_COUNT
}

fn push_bonus_enemy(state: &mut GameState, pos: Vec2, vel: Vec2) {
    let id = state.next_entity_id();
    state.enemies.push(Enemy {
        id,
        pos,
        size: ENEMY_SIZE,
        alive: true,
        kind: EnemyKind::Bonus,
        hp: 1,
        max_hp: 1,
        origin: pos,
        diving: false,
        dive_angle: 0.0,
        score_value: BONUS_KILL_POINTS,
        elite: false,
        vel,
    });
}
