//! Run configuration
//!
//! Loaded from a JSON file by the host; the sim only reads the derived values
//! (particle cap, shake/flash toggles, starting lives).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StarRaidError};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    /// Maximum particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 100,
            QualityPreset::Medium => 500,
            QualityPreset::High => 2000,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Particle effects (explosions, sparks, etc.)
    pub particles: bool,
    /// Screen shake on explosions/impacts
    pub screen_shake: bool,
    /// Full-screen flash on boss phase changes
    pub flash: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, no flashes)
    pub reduced_motion: bool,

    // === Run ===
    /// Lives at game start (1-5)
    pub starting_lives: u8,
    /// Fixed RNG seed; `None` picks one from the clock
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            particles: true,
            screen_shake: true,
            flash: true,
            reduced_motion: false,
            starting_lives: 3,
            seed: None,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective flash (respects reduced_motion)
    pub fn effective_flash(&self) -> bool {
        self.flash && !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=5).contains(&self.starting_lives) {
            return Err(StarRaidError::InvalidSettings(format!(
                "starting_lives must be 1-5, got {}",
                self.starting_lives
            )));
        }
        Ok(())
    }

    /// Parse and validate settings JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "quality": "High", "seed": 42 }"#).unwrap();
        assert_eq!(settings.quality, QualityPreset::High);
        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.starting_lives, 3);
        assert_eq!(settings.max_particles(), 2000);
    }

    #[test]
    fn test_invalid_lives_rejected() {
        let err = Settings::from_json(r#"{ "starting_lives": 0 }"#).unwrap_err();
        assert!(matches!(err, StarRaidError::InvalidSettings(_)));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = Settings::from_json("{ not json").unwrap_err();
        assert!(matches!(err, StarRaidError::Json(_)));
    }

    #[test]
    fn test_reduced_motion_disables_effects() {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        assert!(!settings.effective_screen_shake());
        assert!(!settings.effective_flash());
    }

    #[test]
    fn test_particles_off_caps_at_zero() {
        let settings = Settings {
            quality: QualityPreset::High,
            particles: false,
            ..Settings::default()
        };
        assert_eq!(settings.max_particles(), 0);
    }

    #[test]
    fn test_preset_names() {
        assert_eq!(QualityPreset::Low.as_str(), "Low");
        assert_eq!(QualityPreset::default().as_str(), "Medium");
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings = Settings::load_or_default("/nonexistent/star-raid-settings.json");
        assert_eq!(settings.starting_lives, 3);
    }
}
