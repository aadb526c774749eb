//! Game state and core simulation types
//!
//! Everything a renderer needs to draw a frame lives here, and all of it is
//! owned exclusively by the tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boss::{BossEncounter, BossPhase};
use super::progression::FragmentOutcome;
use super::rect::Rect;
use super::stage::StagePhase;
use crate::audio::SoundCue;
use crate::consts::*;
use crate::settings::Settings;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, nothing simulated yet
    Start,
    /// Active gameplay
    Playing,
    /// Game is paused (all timers frozen)
    Paused,
    /// Run ended
    GameOver,
}

pub const MAX_WEAPON_TIER: u8 = 5;
pub const MAX_SHIELDS: u8 = 3;
pub const MAX_THUNDER_TIER: u8 = 5;
pub const MAX_ALLY_TIER: u8 = 5;
pub const MAX_ORBITALS: u8 = 3;

/// Upgrade tiers the player currently flies with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loadout {
    /// Primary weapon tier (1-5)
    pub weapon_tier: u8,
    /// Shield charges (0-3), one absorbed hit each
    pub shields: u8,
    /// Thunder orb tier (0 = none)
    pub thunder_tier: u8,
    /// Ally wingman tier (0 = none)
    pub ally_tier: u8,
    /// Orbital drone count (0-3)
    pub orbitals: u8,
}

impl Default for Loadout {
    fn default() -> Self {
        Self {
            weapon_tier: 1,
            shields: 0,
            thunder_tier: 0,
            ally_tier: 0,
            orbitals: 0,
        }
    }
}

/// Permanent stats raised by Fragment pickups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FragmentStat {
    Weapon,
    DropRate,
    Shield,
    Speed,
    Orbital,
}

impl FragmentStat {
    pub const ALL: [FragmentStat; 5] = [
        FragmentStat::Weapon,
        FragmentStat::DropRate,
        FragmentStat::Shield,
        FragmentStat::Speed,
        FragmentStat::Orbital,
    ];

    pub fn cap(self) -> u8 {
        match self {
            FragmentStat::Weapon => 3,
            FragmentStat::DropRate => 5,
            FragmentStat::Shield => 2,
            FragmentStat::Speed => 3,
            FragmentStat::Orbital => 3,
        }
    }
}

/// Session-scoped upgrade bank. Never decreases within a run and is the floor
/// the loadout resets to after an unshielded hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentLedger {
    pub weapon: u8,
    pub drop_rate: u8,
    pub shield: u8,
    pub speed: u8,
    pub orbital: u8,
}

impl FragmentLedger {
    pub fn get(&self, stat: FragmentStat) -> u8 {
        match stat {
            FragmentStat::Weapon => self.weapon,
            FragmentStat::DropRate => self.drop_rate,
            FragmentStat::Shield => self.shield,
            FragmentStat::Speed => self.speed,
            FragmentStat::Orbital => self.orbital,
        }
    }

    fn slot(&mut self, stat: FragmentStat) -> &mut u8 {
        match stat {
            FragmentStat::Weapon => &mut self.weapon,
            FragmentStat::DropRate => &mut self.drop_rate,
            FragmentStat::Shield => &mut self.shield,
            FragmentStat::Speed => &mut self.speed,
            FragmentStat::Orbital => &mut self.orbital,
        }
    }

    pub fn is_maxed(&self, stat: FragmentStat) -> bool {
        self.get(stat) >= stat.cap()
    }

    pub fn all_maxed(&self) -> bool {
        FragmentStat::ALL.iter().all(|&s| self.is_maxed(s))
    }

    /// Raise `stat` by one step. Returns false (and leaves the ledger alone) when capped.
    pub fn raise(&mut self, stat: FragmentStat) -> bool {
        if self.is_maxed(stat) {
            return false;
        }
        *self.slot(stat) += 1;
        true
    }

    /// Loadout the player falls back to after losing a life
    pub fn baseline(&self) -> Loadout {
        Loadout {
            weapon_tier: (1 + self.weapon).min(MAX_WEAPON_TIER),
            shields: self.shield,
            thunder_tier: 0,
            ally_tier: 0,
            orbitals: self.orbital.min(MAX_ORBITALS),
        }
    }

    /// Extra keyboard speed in px/tick
    pub fn speed_bonus(&self) -> f32 {
        self.speed as f32
    }

    /// Drop probability for an ordinary enemy kill
    pub fn drop_chance(&self) -> f32 {
        0.05 + self.drop_rate as f32 * 0.02
    }
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub loadout: Loadout,
    /// Game-clock timestamps (ms); a window is active while `now < until`
    pub invulnerable_until: u64,
    pub slow_until: u64,
    pub double_score_until: u64,
    /// Last fire timestamps per weapon system
    pub last_shot: u64,
    pub last_thunder: u64,
    pub last_ally: u64,
    /// Shared rotation of the orbital drone ring (radians)
    pub orbital_angle: f32,
    /// Per-drone re-arm timestamps after a contact hit
    pub orbital_ready_at: [u64; MAX_ORBITALS as usize],
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(FIELD_WIDTH / 2.0 - PLAYER_SIZE / 2.0, PLAYER_START_Y),
            loadout: Loadout::default(),
            invulnerable_until: 0,
            slow_until: 0,
            double_score_until: 0,
            last_shot: 0,
            last_thunder: 0,
            last_ally: 0,
            orbital_angle: 0.0,
            orbital_ready_at: [0; MAX_ORBITALS as usize],
        }
    }
}

impl Player {
    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: Vec2::splat(PLAYER_SIZE),
        }
    }

    /// Slightly inset box used for damage checks
    pub fn hitbox(&self) -> Rect {
        self.rect().inset(PLAYER_HITBOX_INSET)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(PLAYER_SIZE / 2.0)
    }

    /// Nose of the ship, where primary bolts spawn
    pub fn muzzle(&self) -> Vec2 {
        Vec2::new(self.pos.x + PLAYER_SIZE / 2.0, self.pos.y)
    }

    pub fn is_invulnerable(&self, now: u64) -> bool {
        now < self.invulnerable_until
    }

    pub fn slow_active(&self, now: u64) -> bool {
        now < self.slow_until
    }

    pub fn double_score_active(&self, now: u64) -> bool {
        now < self.double_score_until
    }
}

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Top formation row, 2 HP, rarely dives
    Yellow,
    /// Second row, dives most often
    Purple,
    /// Remaining rows
    Red,
    Boss,
    /// Pass-through bonus stage target, never shoots or hurts
    Bonus,
}

impl EnemyKind {
    /// Base per-tick dive probability (before difficulty scaling)
    pub fn dive_chance(self) -> f32 {
        match self {
            EnemyKind::Purple => 0.002,
            EnemyKind::Red => 0.001,
            EnemyKind::Yellow => 0.0005,
            EnemyKind::Boss | EnemyKind::Bonus => 0.0,
        }
    }

    pub fn color(self) -> u32 {
        match self {
            EnemyKind::Yellow => 0xFFEB3B,
            EnemyKind::Purple => 0xE040FB,
            EnemyKind::Red => 0xFF5252,
            EnemyKind::Boss => 0xFF0055,
            EnemyKind::Bonus => 0x40C4FF,
        }
    }
}

/// An enemy entity. Dead enemies stay in the list until the level is purged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: f32,
    pub alive: bool,
    pub kind: EnemyKind,
    pub hp: i32,
    pub max_hp: i32,
    /// Formation slot
    pub origin: Vec2,
    pub diving: bool,
    /// Dive wobble accumulator (radians)
    pub dive_angle: f32,
    pub score_value: u64,
    pub elite: bool,
    /// Straight-line velocity for pass-through bonus targets
    #[serde(default)]
    pub vel: Vec2,
}

impl Enemy {
    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: Vec2::splat(self.size),
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp <= 0 {
            return 0.0;
        }
        self.hp.max(0) as f32 / self.max_hp as f32
    }

    pub fn is_boss(&self) -> bool {
        self.kind == EnemyKind::Boss
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletOwner {
    Player,
    Enemy,
}

/// Projectile behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BulletKind {
    /// Plain bolt, 1 damage, spent on hit
    Standard,
    /// Tier-4 bolt: spent on hit and bursts into shards
    Ricochet,
    /// Secondary projectile from a ricochet burst
    Shard,
    /// Tier-5 bolt: never spent, hits each enemy id at most once
    Piercing { hit_enemies: Vec<u32> },
    /// Homing orb with optional splash
    Thunder { damage: i32, radius: f32 },
    /// Enemy guided missile, steers toward the player until it expires
    Homing { expires_at: u64 },
}

/// A projectile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub color: u32,
    pub owner: BulletOwner,
    pub kind: BulletKind,
    pub active: bool,
}

impl Bullet {
    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: self.size,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn from_player(&self) -> bool {
        self.owner == BulletOwner::Player
    }

    /// True if the bullet left the field (plus margin)
    pub fn is_offscreen(&self) -> bool {
        self.pos.y <= -OFFSCREEN_MARGIN
            || self.pos.y >= FIELD_HEIGHT + OFFSCREEN_MARGIN
            || self.pos.x <= -OFFSCREEN_MARGIN
            || self.pos.x >= FIELD_WIDTH + OFFSCREEN_MARGIN
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Weapon,
    Shield,
    Life,
    Thunder,
    Ally,
    SlowTime,
    DoubleScore,
    /// Boss-only permanent upgrade
    Fragment,
    Orbital,
}

/// A falling pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub kind: PowerUpKind,
    pub active: bool,
}

impl PowerUp {
    pub fn rect(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: Vec2::splat(POWERUP_SIZE),
        }
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32, // 0-1, decreases over time
    pub color: u32,
}

/// Shared sway of the formation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Formation {
    pub offset: f32,
    pub dir: f32,
}

impl Default for Formation {
    fn default() -> Self {
        Self {
            offset: 0.0,
            dir: 1.0,
        }
    }
}

/// Notifications for external collaborators, drained after every tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundCue),
    ScoreChanged { score: u64, high_score: u64 },
    GameOver { score: u64, level: u32 },
    LevelStarted(u32),
    BossPhaseChanged(BossPhase),
    Fragment(FragmentOutcome),
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub phase: GamePhase,
    pub score: u64,
    pub high_score: u64,
    pub lives: u8,
    /// Upper bound for Life pickups
    pub max_lives: u8,
    /// Current level (1-based)
    pub level: u32,
    /// Game clock (ms). Only advances while playing.
    pub clock_ms: u64,
    /// Last wall-clock reading seen by the tick
    pub last_wall_ms: Option<u64>,
    /// Simulation tick counter
    pub frame: u64,
    pub player: Player,
    pub fragments: FragmentLedger,
    /// Enemies (dead ones are kept until the level is purged)
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub powerups: Vec<PowerUp>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub formation: Formation,
    /// Active boss encounter, if the current level is a boss level
    pub boss: Option<BossEncounter>,
    /// Bosses met this run; scales boss aggression
    pub boss_appearances: u32,
    /// Bonus stage / boss clear controller
    pub stage: StagePhase,
    /// Screen shake magnitude (px)
    pub screen_shake: f32,
    /// Full-screen flash intensity (0-1)
    pub flash: f32,
    pub max_particles: usize,
    pub shake_enabled: bool,
    pub flash_enabled: bool,
    /// Pending notifications
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a fresh state in the `Start` phase
    pub fn new(seed: u64, settings: &Settings) -> Self {
        Self {
            seed,
            phase: GamePhase::Start,
            score: 0,
            high_score: 0,
            lives: settings.starting_lives,
            max_lives: settings.starting_lives.max(3),
            level: 1,
            clock_ms: 0,
            last_wall_ms: None,
            frame: 0,
            player: Player::default(),
            fragments: FragmentLedger::default(),
            enemies: Vec::new(),
            bullets: Vec::new(),
            powerups: Vec::new(),
            particles: Vec::new(),
            formation: Formation::default(),
            boss: None,
            boss_appearances: 0,
            stage: StagePhase::None,
            screen_shake: 0.0,
            flash: 0.0,
            max_particles: settings.max_particles(),
            shake_enabled: settings.effective_screen_shake(),
            flash_enabled: settings.effective_flash(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn play(&mut self, cue: SoundCue) {
        self.events.push(GameEvent::Sound(cue));
    }

    /// Add points, track the high score and notify persistence
    pub fn add_score(&mut self, points: u64) {
        if points == 0 {
            return;
        }
        self.score += points;
        if self.score > self.high_score {
            self.high_score = self.score;
        }
        self.emit(GameEvent::ScoreChanged {
            score: self.score,
            high_score: self.high_score,
        });
    }

    pub fn shake(&mut self, magnitude: f32) {
        if self.shake_enabled {
            self.screen_shake = magnitude;
        }
    }

    pub fn trigger_flash(&mut self) {
        if self.flash_enabled {
            self.flash = 1.0;
        }
    }

    /// Push a particle unless the cap is reached
    pub fn spawn_particle(&mut self, particle: Particle) {
        if self.particles.len() < self.max_particles {
            self.particles.push(particle);
        }
    }

    /// Push a projectile with a fresh id (`pos` is the top-left corner)
    pub fn spawn_bullet(
        &mut self,
        pos: Vec2,
        vel: Vec2,
        size: Vec2,
        color: u32,
        owner: BulletOwner,
        kind: BulletKind,
    ) {
        let id = self.next_entity_id();
        self.bullets.push(Bullet {
            id,
            pos,
            vel,
            size,
            color,
            owner,
            kind,
            active: true,
        });
    }

    pub fn spawn_powerup(&mut self, center: Vec2, kind: PowerUpKind) {
        let id = self.next_entity_id();
        self.powerups.push(PowerUp {
            id,
            pos: Vec2::new(center.x - POWERUP_SIZE / 2.0, center.y),
            kind,
            active: true,
        });
    }

    /// Living boss entity, if any
    pub fn boss_enemy(&self) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.alive && e.is_boss())
    }

    /// Enemy-side speed multiplier (slow-time halves it)
    pub fn enemy_time_scale(&self) -> f32 {
        if self.player.slow_active(self.clock_ms) {
            SLOW_FACTOR
        } else {
            1.0
        }
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
