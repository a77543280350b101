//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only arrives through `tick`'s `dt`
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, storage or platform dependencies

pub mod autopilot;
pub mod coins;
pub mod collision;
pub mod difficulty;
pub mod lane;
pub mod motion;
pub mod obstacles;
pub mod state;
pub mod tick;

pub use coins::{Coin, CoinField};
pub use collision::{Aabb, Resolution, RideStep, resolve};
pub use motion::{JumpOutcome, VerticalMotion};
pub use obstacles::ObstacleField;
pub use state::{
    DismountCause, GameEvent, GamePhase, GameState, LaneDirection, Obstacle, PlayerState, Ride,
};
pub use tick::{TickInput, tick};
