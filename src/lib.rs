//! Lane Runner - A three-lane endless runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (lanes, jumps, trains, collisions, scoring)
//! - `session`: Fixed timestep driver glue around the simulation
//! - `highscores`: Top 5 leaderboard over an injected store
//! - `persistence`: Key-value storage backends
//! - `platform`: Browser/native input and time adaptation
//! - `tuning`: Data-driven game balance

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
pub mod snapshot;
pub mod tuning;

pub use highscores::HighScoreLedger;
pub use session::Session;
pub use settings::Settings;
pub use tuning::{DifficultyPreset, Tuning};

/// Game configuration constants
///
/// Axes: x is the lane axis, y is height above the ground, z is depth.
/// The player stands on the z = 0 plane; trains spawn at negative z and
/// travel toward positive z.
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta the driver will honour (tab backgrounding etc.)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Longest delta a single tick will integrate
    pub const MAX_TICK_DT: f32 = 0.05;

    /// Lane layout
    pub const LANE_COUNT: u8 = 3;
    pub const MIN_LANE: u8 = 0;
    pub const MAX_LANE: u8 = LANE_COUNT - 1;
    pub const START_LANE: u8 = 1;
    pub const LANE_WIDTH: f32 = 3.0;
    /// Lateral interpolation speed (units/s); one lane takes 1/6 s
    pub const LANE_CHANGE_SPEED: f32 = 18.0;

    /// Player body
    pub const PLAYER_HALF_WIDTH: f32 = 0.5;
    pub const PLAYER_HEIGHT: f32 = 1.8;
    pub const PLAYER_HALF_DEPTH: f32 = 0.5;
    /// Neutral depth plane the player returns to
    pub const PLAYER_Z: f32 = 0.0;

    /// Train body
    pub const TRAIN_HALF_WIDTH: f32 = 1.2;
    pub const TRAIN_HEIGHT: f32 = 3.0;
    pub const TRAIN_SEGMENT_LENGTH: f32 = 6.0;
    pub const TRAIN_SEGMENTS: u32 = 3;
    pub const TRAIN_SEGMENT_GAP: f32 = 0.5;

    /// Obstacle lifecycle planes
    pub const SPAWN_Z: f32 = -150.0;
    pub const RETIRE_Z: f32 = 10.0;

    /// Jump curve
    pub const JUMP_DURATION: f32 = 0.6;
    pub const JUMP_AMPLITUDE: f32 = 4.0;
    /// Launching from a train roof reaches higher
    pub const RIDE_JUMP_AMPLITUDE: f32 = 4.5;
    /// Fall from a train roof back to the ground
    pub const FALL_DURATION: f32 = 0.3;

    /// Riding
    pub const RIDE_HEIGHT: f32 = TRAIN_HEIGHT;
    /// Minimum height (while descending) that lands on a roof instead of crashing
    pub const MOUNT_THRESHOLD: f32 = 2.0;
    /// How far a train may carry the player toward the camera
    pub const MAX_RIDE_DRIFT: f32 = 1.5;

    /// Coin pickup box half-extent
    pub const COIN_HALF_SIZE: f32 = 0.4;
    /// Centre height of a coin on the track
    pub const COIN_GROUND_Y: f32 = 0.5;
    /// Centre height of a coin on a train roof
    pub const COIN_ROOF_Y: f32 = TRAIN_HEIGHT + 0.5;

    /// Score accrued per simulation tick (exactly representable)
    pub const SCORE_PER_TICK: f64 = 0.125;

    /// Length of one repeating track tile (for scroll wrap)
    pub const TRACK_TILE_LENGTH: f32 = 40.0;
}

/// World-space x of a lane's centre line
#[inline]
pub fn lane_center_x(lane: u8) -> f32 {
    (lane as f32 - consts::START_LANE as f32) * consts::LANE_WIDTH
}

/// Clamp any signed lane index into the valid range
#[inline]
pub fn clamp_lane(lane: i32) -> u8 {
    lane.clamp(consts::MIN_LANE as i32, consts::MAX_LANE as i32) as u8
}

/// Clamp a time delta into [0, max]; NaN and infinities become zero
#[inline]
pub fn sanitize_dt(dt: f32, max: f32) -> f32 {
    if dt.is_finite() { dt.clamp(0.0, max) } else { 0.0 }
}
