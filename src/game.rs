//! Game facade
//!
//! Owns the simulation state and its RNG, runs ticks, and forwards the
//! events each tick emits to the attached audio and persistence sinks.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;

use crate::audio::{AudioSink, NullAudio};
use crate::error::Result;
use crate::highscores::{HighScores, PersistenceSink};
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameState, TickInput, start_run, tick};

/// A game session: one run at a time, restartable
pub struct Game<A: AudioSink = NullAudio, P: PersistenceSink = HighScores> {
    settings: Settings,
    state: GameState,
    /// Derives a fresh seed for every run
    seeder: Pcg32,
    /// RNG of the current run, seeded from `state.seed`
    rng: Pcg32,
    audio: A,
    persistence: P,
}

impl Game {
    /// Session with no audio and an in-memory leaderboard
    pub fn new(settings: Settings) -> Self {
        Self::with_sinks(settings, NullAudio, HighScores::new())
    }
}

impl<A: AudioSink, P: PersistenceSink> Game<A, P> {
    pub fn with_sinks(settings: Settings, audio: A, persistence: P) -> Self {
        let session_seed = settings.seed.unwrap_or_else(clock_seed);
        let mut seeder = Pcg32::seed_from_u64(session_seed);
        let run_seed = seeder.next_u64();
        let mut state = GameState::new(run_seed, &settings);
        state.high_score = persistence.stored_high_score();
        Self {
            settings,
            state,
            seeder,
            rng: Pcg32::seed_from_u64(run_seed),
            audio,
            persistence,
        }
    }

    /// Begin a new run at wall time `now_ms`, keeping the high score
    pub fn start_game(&mut self, now_ms: u64) {
        let high_score = self.state.high_score.max(self.persistence.stored_high_score());
        let seed = if self.state.phase == GamePhase::Start {
            self.state.seed
        } else {
            self.seeder.next_u64()
        };
        self.state = GameState::new(seed, &self.settings);
        self.state.high_score = high_score;
        self.rng = Pcg32::seed_from_u64(seed);
        start_run(&mut self.state, now_ms, &mut self.rng);
        self.dispatch_events();
    }

    /// Run one tick at wall time `now_ms` and dispatch its events
    pub fn advance(&mut self, input: &TickInput, now_ms: u64) {
        tick(&mut self.state, input, now_ms, &mut self.rng);
        self.dispatch_events();
    }

    /// Flip between playing and paused; other phases are unaffected
    pub fn toggle_pause(&mut self) {
        match self.state.phase {
            GamePhase::Playing => {
                self.state.phase = GamePhase::Paused;
                log::info!("Paused at {} ms", self.state.clock_ms);
            }
            GamePhase::Paused => {
                self.state.phase = GamePhase::Playing;
                // Next tick starts a fresh delta so paused time never leaks in
                self.state.last_wall_ms = None;
                log::info!("Resumed");
            }
            GamePhase::Start | GamePhase::GameOver => {}
        }
    }

    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn high_score(&self) -> u64 {
        self.state.high_score
    }

    pub fn lives(&self) -> u8 {
        self.state.lives
    }

    pub fn level(&self) -> u32 {
        self.state.level
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Read-only frame state for a renderer
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Frame state as JSON
    pub fn snapshot_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.state)?)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    fn dispatch_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::Sound(cue) => self.audio.play(cue),
                GameEvent::ScoreChanged { score, high_score } => {
                    self.persistence.score_changed(score, high_score)
                }
                GameEvent::GameOver { score, level } => self.persistence.game_over(score, level),
                GameEvent::LevelStarted(level) => log::debug!("Level {} underway", level),
                GameEvent::BossPhaseChanged(phase) => {
                    log::debug!("Boss phase {}", phase.number())
                }
                GameEvent::Fragment(outcome) => log::debug!("Fragment: {:?}", outcome),
            }
        }
    }
}

/// Seed taken from the system clock when none is configured
fn clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5EED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{RecordingAudio, SoundCue};
    use crate::consts::FRAME_MS;

    fn seeded() -> Settings {
        Settings {
            seed: Some(7),
            ..Settings::default()
        }
    }

    #[test]
    fn test_new_game_waits_for_start() {
        let mut game = Game::new(seeded());
        assert_eq!(game.phase(), GamePhase::Start);
        game.advance(&TickInput::default(), 16);
        assert_eq!(game.phase(), GamePhase::Start);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_start_game() {
        let mut game = Game::new(seeded());
        game.start_game(0);
        assert_eq!(game.phase(), GamePhase::Playing);
        assert_eq!(game.lives(), 3);
        assert_eq!(game.level(), 1);
        assert!(!game.state().enemies.is_empty());
        // Events are drained into the sinks
        assert!(game.state().events.is_empty());
    }

    #[test]
    fn test_toggle_pause_freezes_clock() {
        let mut game = Game::new(seeded());
        game.start_game(0);
        game.advance(&TickInput::default(), 16);
        game.toggle_pause();
        assert_eq!(game.phase(), GamePhase::Paused);
        let clock = game.state().clock_ms;
        game.advance(&TickInput::default(), 5000);
        assert_eq!(game.state().clock_ms, clock);
        game.toggle_pause();
        // A long stall while paused never reaches the game clock
        game.advance(&TickInput::default(), 60_000);
        assert_eq!(game.state().clock_ms, clock);
        game.advance(&TickInput::default(), 60_016);
        assert_eq!(game.state().clock_ms, clock + 16);
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = || {
            let mut game = Game::new(seeded());
            game.start_game(0);
            let input = TickInput {
                autopilot: true,
                ..Default::default()
            };
            for t in 1..=300 {
                game.advance(&input, t * FRAME_MS);
            }
            (game.score(), game.state().player.pos, game.state().bullets.len())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_sound_events_reach_audio_sink() {
        let mut game = Game::with_sinks(seeded(), RecordingAudio::default(), HighScores::new());
        game.start_game(0);
        for t in 1..=40 {
            game.advance(&TickInput::default(), t * FRAME_MS);
        }
        assert!(game.audio().cues.contains(&SoundCue::Shoot));
    }

    #[test]
    fn test_music_follows_the_run() {
        let mut game = Game::with_sinks(seeded(), RecordingAudio::default(), HighScores::new());
        game.start_game(0);
        assert_eq!(game.audio().cues.first(), Some(&SoundCue::MusicStart));
        assert!(!game.audio().cues.contains(&SoundCue::MusicStop));
        game.state.lives = 1;
        crate::sim::collision::handle_player_hit(&mut game.state);
        game.dispatch_events();
        assert!(game.audio().cues.contains(&SoundCue::MusicStop));
        assert!(game.audio().cues.contains(&SoundCue::GameOver));
    }

    #[test]
    fn test_game_over_reaches_leaderboard() {
        let mut game = Game::new(seeded());
        game.start_game(0);
        game.state.score = 1500;
        game.state.lives = 1;
        crate::sim::collision::handle_player_hit(&mut game.state);
        game.dispatch_events();
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert_eq!(game.persistence().top_score(), Some(1500));
        assert_eq!(game.persistence().entries[0].level, 1);
    }

    #[test]
    fn test_restart_keeps_high_score() {
        let mut game = Game::new(seeded());
        game.start_game(0);
        game.state.add_score(900);
        game.dispatch_events();
        let first_seed = game.state().seed;
        game.start_game(100);
        assert_eq!(game.score(), 0);
        assert_eq!(game.high_score(), 900);
        assert_ne!(game.state().seed, first_seed);
    }

    #[test]
    fn test_snapshot_json() {
        let mut game = Game::new(seeded());
        game.start_game(0);
        let json = game.snapshot_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["level"], 1);
        assert_eq!(value["phase"], "Playing");
    }
}
