//! Input mapping
//!
//! Collects raw key and pointer events between ticks and turns them into a
//! `TickInput`. Movement keys are level-triggered (held), pause is
//! edge-triggered and consumed by the next sample.

use glam::Vec2;

use crate::consts::*;
use crate::sim::TickInput;

/// Logical keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Pause,
    /// Toggles the demo pilot
    Autopilot,
}

impl Key {
    /// Map a DOM-style key name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ArrowLeft" | "a" | "A" => Some(Key::Left),
            "ArrowRight" | "d" | "D" => Some(Key::Right),
            "Escape" | "p" | "P" => Some(Key::Pause),
            "i" | "I" => Some(Key::Autopilot),
            _ => None,
        }
    }
}

/// Accumulated input between two ticks
#[derive(Debug, Clone, Default)]
pub struct InputState {
    left: bool,
    right: bool,
    pause_held: bool,
    pause_pending: bool,
    autopilot: bool,
    /// Last pointer position in viewport coordinates
    pointer: Option<Vec2>,
    /// Tap waiting to be classified at the next sample
    tap: Option<Vec2>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        match key {
            Key::Left => self.left = true,
            Key::Right => self.right = true,
            Key::Pause => {
                // Auto-repeat must not toggle again
                if !self.pause_held {
                    self.pause_pending = true;
                }
                self.pause_held = true;
            }
            Key::Autopilot => {
                self.autopilot = !self.autopilot;
                log::info!("Autopilot: {}", self.autopilot);
            }
        }
    }

    pub fn key_up(&mut self, key: Key) {
        match key {
            Key::Left => self.left = false,
            Key::Right => self.right = false,
            Key::Pause => self.pause_held = false,
            Key::Autopilot => {}
        }
    }

    /// Mouse move or touch drag (viewport coordinates)
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.pointer = Some(Vec2::new(x, y));
    }

    /// Pointer left the viewport or the touch ended
    pub fn pointer_release(&mut self) {
        self.pointer = None;
    }

    /// Click or touch start (viewport coordinates)
    pub fn tap(&mut self, x: f32, y: f32) {
        self.tap = Some(Vec2::new(x, y));
    }

    pub fn autopilot(&self) -> bool {
        self.autopilot
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        self.autopilot = enabled;
    }

    /// Build the intents for one tick and clear the one-shot flags.
    ///
    /// A tap inside the top band of the field toggles pause; any other tap
    /// positions the ship like a pointer move.
    pub fn sample(&mut self, viewport_width: f32, viewport_height: f32) -> TickInput {
        let mut pause = std::mem::take(&mut self.pause_pending);

        if let Some(tap) = self.tap.take() {
            let field = to_field(tap, viewport_width, viewport_height);
            if field.y < PAUSE_TAP_BAND {
                pause = true;
            } else {
                self.pointer = Some(tap);
            }
        }

        let pointer_x = self
            .pointer
            .map(|p| to_field(p, viewport_width, viewport_height).x.clamp(0.0, FIELD_WIDTH));

        TickInput {
            left: self.left,
            right: self.right,
            pointer_x,
            pause,
            autopilot: self.autopilot,
        }
    }
}

/// Viewport to field coordinates; a degenerate viewport maps 1:1
fn to_field(p: Vec2, viewport_width: f32, viewport_height: f32) -> Vec2 {
    let sx = if viewport_width > 0.0 {
        FIELD_WIDTH / viewport_width
    } else {
        1.0
    };
    let sy = if viewport_height > 0.0 {
        FIELD_HEIGHT / viewport_height
    } else {
        1.0
    };
    Vec2::new(p.x * sx, p.y * sy)
}
