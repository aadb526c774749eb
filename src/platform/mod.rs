//! Platform abstraction layer
//!
//! Host-side pieces the sim consumes:
//! - Time (wall-clock readings per tick)
//! - Input events (keys, pointer, taps) mapped to tick intents

pub mod input;
pub mod time;

pub use input::{InputState, Key};
pub use time::{Clock, ManualClock, SystemClock};
