//! Frame timing

use crate::consts::{MAX_FRAME_DT, SIM_DT};

/// Converts display-synced timestamps (ms) into frame deltas (s)
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    /// Delta since the previous frame, clamped to [0, MAX_FRAME_DT].
    /// The first frame after creation or `reset` reports one tick.
    pub fn frame(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => (((now_ms - last) / 1000.0) as f32).clamp(0.0, MAX_FRAME_DT),
            None => SIM_DT,
        };
        self.last_ms = Some(now_ms);
        dt
    }

    /// Forget the last timestamp (after the tab was hidden)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
