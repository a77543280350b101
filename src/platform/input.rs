//! Keyboard mapping and swipe gestures
//!
//! Debouncing lives here, not in the simulation: the core only has to
//! treat repeated requests as no-ops.

use crate::session::Action;

/// Minimum travel (px) for a touch to count as a swipe
pub const SWIPE_MIN_DISTANCE_PX: f32 = 50.0;
/// Minimum time between two registered lateral swipes
pub const LATERAL_DEBOUNCE_MS: f64 = 200.0;

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Game(Action),
    Restart,
    ToggleIdle,
}

/// Map a `KeyboardEvent.key` value
pub fn command_for_key(key: &str) -> Option<KeyCommand> {
    let command = match key {
        "ArrowLeft" | "a" | "A" => KeyCommand::Game(Action::MoveLeft),
        "ArrowRight" | "d" | "D" => KeyCommand::Game(Action::MoveRight),
        "ArrowUp" | "w" | "W" | " " => KeyCommand::Game(Action::Jump),
        "ArrowDown" | "s" | "S" => KeyCommand::Game(Action::FastDrop),
        "Escape" | "p" | "P" => KeyCommand::Game(Action::Pause),
        "Enter" => KeyCommand::Game(Action::Start),
        "r" | "R" => KeyCommand::Restart,
        "i" | "I" => KeyCommand::ToggleIdle,
        _ => return None,
    };
    Some(command)
}

/// Tracks one touch at a time and classifies it on release
#[derive(Debug, Clone, Default)]
pub struct SwipeTracker {
    start: Option<(f32, f32)>,
    last_lateral_ms: Option<f64>,
}

impl SwipeTracker {
    pub fn begin(&mut self, x: f32, y: f32) {
        self.start = Some((x, y));
    }

    /// Classify the gesture ending at (x, y). Screen y grows downward.
    pub fn end(&mut self, x: f32, y: f32, now_ms: f64) -> Option<Action> {
        let (sx, sy) = self.start.take()?;
        let (dx, dy) = (x - sx, y - sy);

        if dx.abs().max(dy.abs()) < SWIPE_MIN_DISTANCE_PX {
            return None;
        }

        if dx.abs() > dy.abs() {
            if let Some(last) = self.last_lateral_ms {
                if now_ms - last < LATERAL_DEBOUNCE_MS {
                    return None;
                }
            }
            self.last_lateral_ms = Some(now_ms);
            Some(if dx < 0.0 {
                Action::MoveLeft
            } else {
                Action::MoveRight
            })
        } else if dy < 0.0 {
            Some(Action::Jump)
        } else {
            Some(Action::FastDrop)
        }
    }
}
