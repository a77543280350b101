//! Platform abstraction layer
//!
//! Turns raw browser/native signals into what the simulation understands:
//! - Time: frame timestamps into clamped deltas
//! - Input: keys and swipes into discrete actions
//!
//! Storage lives in `persistence`.

pub mod input;
pub mod time;

pub use input::{KeyCommand, SwipeTracker, command_for_key};
pub use time::FrameClock;
