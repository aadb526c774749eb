//! Sound cue sink
//!
//! The sim only names cues; playback belongs to whatever `AudioSink` the host
//! attaches. Fire-and-forget: nothing waits on a cue.

use serde::{Deserialize, Serialize};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Primary weapon fired
    Shoot,
    /// Enemy destroyed or player hit
    Explosion,
    /// Pickup collected, shield absorb, level cleared
    PowerUp,
    /// Lives exhausted
    GameOver,
    /// Boss entered or changed phase
    BossSpawn,
    /// Background loop begins with a run
    MusicStart,
    /// Background loop ends on game over
    MusicStop,
}

impl SoundCue {
    pub fn name(&self) -> &'static str {
        match self {
            SoundCue::Shoot => "shoot",
            SoundCue::Explosion => "explosion",
            SoundCue::PowerUp => "powerup",
            SoundCue::GameOver => "gameover",
            SoundCue::BossSpawn => "boss_spawn",
            SoundCue::MusicStart => "music_start",
            SoundCue::MusicStop => "music_stop",
        }
    }
}

/// Receiver for sound cues
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);
}

/// Discards every cue
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Logs cues at debug level (headless runs)
#[derive(Debug, Default)]
pub struct LogAudio;

impl LogAudio {
    pub fn new() -> Self {
        Self
    }
}

impl AudioSink for LogAudio {
    fn play(&mut self, cue: SoundCue) {
        log::debug!("♪ {}", cue.name());
    }
}

/// Records cues in order
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub cues: Vec<SoundCue>,
}

#[cfg(test)]
impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: SoundCue) {
        self.cues.push(cue);
    }
}
