//! Game state and core simulation types
//!
//! Everything a frame needs to draw, and everything `tick` mutates, lives
//! in [`GameState`].

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::coins::CoinField;
use super::collision::Aabb;
use super::difficulty;
use super::motion::VerticalMotion;
use super::obstacles::ObstacleField;
use crate::consts::*;
use crate::lane_center_x;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first input
    Ready,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Run ended; terminal until restart
    GameOver,
}

/// Lateral direction of a lane change request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneDirection {
    Left,
    Right,
}

impl LaneDirection {
    pub fn delta(self) -> i32 {
        match self {
            LaneDirection::Left => -1,
            LaneDirection::Right => 1,
        }
    }
}

/// Why the player left a train roof
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DismountCause {
    /// Player jumped off
    Jumped,
    /// The train slid out from under the player
    Outrun,
    /// The train was retired while ridden
    Vanished,
}

/// Events emitted by the simulation for the HUD and drivers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Displayed (integer) score changed
    ScoreChanged { score: u64 },
    /// Run ended
    GameOver { final_score: u64 },
    /// Final score earns a leaderboard slot (emitted by the session)
    HighScoreQualified { final_score: u64, rank: usize },
    Started,
    Paused,
    Resumed,
    Jumped { from_roof: bool },
    Mounted { obstacle_id: u32 },
    Dismounted { obstacle_id: u32, cause: DismountCause },
    Spawned { obstacle_id: u32, lane: u8 },
    CoinCollected { coin_id: u32 },
    /// A jump was cut short into a fall
    FastDropped,
}

/// Standing on a train roof
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    /// Stable id of the ridden train (may disappear at any time)
    pub obstacle_id: u32,
    /// Player depth minus the train's front depth at the moment of mounting
    pub contact_offset: f32,
}

/// The runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    /// Logical lane; switches the instant a request is accepted
    pub lane: u8,
    /// Lane the body is interpolating toward
    pub target_lane: u8,
    /// x: lateral position, y: height above ground, z: depth
    pub pos: Vec3,
    pub motion: VerticalMotion,
    pub riding: Option<Ride>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            lane: START_LANE,
            target_lane: START_LANE,
            pos: Vec3::new(lane_center_x(START_LANE), 0.0, PLAYER_Z),
            motion: VerticalMotion::Idle,
            riding: None,
        }
    }
}

impl PlayerState {
    #[inline]
    pub fn is_airborne(&self) -> bool {
        self.motion.is_active()
    }

    #[inline]
    pub fn is_riding(&self) -> bool {
        self.riding.is_some()
    }

    /// Bounding box of the body (feet at `pos.y`)
    pub fn aabb(&self) -> Aabb {
        Aabb::new(
            Vec3::new(
                self.pos.x - PLAYER_HALF_WIDTH,
                self.pos.y,
                self.pos.z - PLAYER_HALF_DEPTH,
            ),
            Vec3::new(
                self.pos.x + PLAYER_HALF_WIDTH,
                self.pos.y + PLAYER_HEIGHT,
                self.pos.z + PLAYER_HALF_DEPTH,
            ),
        )
    }
}

/// A train: a run of segments travelling toward the player in one lane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub lane: u8,
    /// Depth of the front face (negative = ahead of the player)
    pub z: f32,
    pub segment_count: u32,
    /// Gap between consecutive segments
    pub segment_spacing: f32,
}

impl Obstacle {
    /// Total length from front face to the rear of the last segment
    pub fn length(&self) -> f32 {
        let n = self.segment_count.max(1) as f32;
        n * TRAIN_SEGMENT_LENGTH + (n - 1.0) * self.segment_spacing
    }

    #[inline]
    pub fn front_z(&self) -> f32 {
        self.z
    }

    #[inline]
    pub fn rear_z(&self) -> f32 {
        self.z - self.length()
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        lane_center_x(self.lane)
    }

    /// Roof height
    #[inline]
    pub fn top(&self) -> f32 {
        TRAIN_HEIGHT
    }

    pub fn aabb(&self) -> Aabb {
        let x = self.center_x();
        Aabb::new(
            Vec3::new(x - TRAIN_HALF_WIDTH, 0.0, self.rear_z()),
            Vec3::new(x + TRAIN_HALF_WIDTH, self.top(), self.front_z()),
        )
    }
}

/// Complete game state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Spawn lane RNG
    pub rng: Pcg32,
    /// Balance values this run was started with
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Real-valued score accumulator
    pub score: f64,
    /// Ticks simulated while playing
    pub elapsed_ticks: u64,
    /// Derived from score each tick
    pub obstacle_speed: f32,
    pub track_speed: f32,
    /// Accumulated scroll of the track texture, wraps every tile
    pub track_offset: f32,
    pub player: PlayerState,
    pub obstacles: ObstacleField,
    pub coins: CoinField,
    /// Coins picked up this run
    pub coins_collected: u32,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            obstacle_speed: difficulty::obstacle_speed(&tuning, 0.0),
            track_speed: difficulty::track_speed(&tuning, 0.0),
            tuning,
            phase: GamePhase::Ready,
            score: 0.0,
            elapsed_ticks: 0,
            track_offset: 0.0,
            player: PlayerState::default(),
            obstacles: ObstacleField::default(),
            coins: CoinField::default(),
            coins_collected: 0,
        }
    }

    /// Throw away the run and start over; cancels motions, clears trains
    /// and coins, re-arms the spawn timers
    pub fn restart(&mut self, seed: u64) {
        let tuning = self.tuning.clone();
        *self = Self::new(seed, tuning);
        log::info!("Run restarted with seed {}", seed);
    }

    /// Integer score shown to the player
    #[inline]
    pub fn display_score(&self) -> u64 {
        self.score.floor() as u64
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}
