//! Collision detection and ride-state resolution
//!
//! Everything is axis aligned. Each tick the player is tested against the
//! trains in their logical lane, in priority order: landing on a roof,
//! clearing a roof in the air, then crashing into the body.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::{Obstacle, PlayerState};
use crate::consts::*;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Strict overlap; touching faces do not intersect, so standing on a
    /// roof is not a crash
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }
}

/// Outcome of resolving the player against the trains this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Clear,
    /// Land on this train's roof
    Mount { obstacle_id: u32, contact_offset: f32 },
    Fatal { obstacle_id: u32 },
}

/// Player footprint overlaps the train footprint on the lane axis
fn overlaps_laterally(player: &PlayerState, obstacle: &Obstacle) -> bool {
    (player.pos.x - obstacle.center_x()).abs() < PLAYER_HALF_WIDTH + TRAIN_HALF_WIDTH
}

/// Player depth lies between the train's front face (plus the player's
/// half-depth, so an arriving train can be caught) and its rear. No slack
/// at the rear: a train that just slid out from under the player must not
/// be re-boarded.
fn within_span(player: &PlayerState, obstacle: &Obstacle) -> bool {
    let z = player.pos.z;
    z <= obstacle.front_z() + PLAYER_HALF_DEPTH && z >= obstacle.rear_z()
}

fn can_mount(player: &PlayerState, obstacle: &Obstacle) -> bool {
    player.is_airborne()
        && player.motion.is_descending()
        && player.pos.y > MOUNT_THRESHOLD
        && overlaps_laterally(player, obstacle)
        && within_span(player, obstacle)
}

/// Resolve one train
pub fn resolve_obstacle(player: &PlayerState, obstacle: &Obstacle) -> Resolution {
    if can_mount(player, obstacle) {
        let contact_offset = (player.pos.z - obstacle.front_z())
            .clamp(-obstacle.length(), 0.0);
        return Resolution::Mount {
            obstacle_id: obstacle.id,
            contact_offset,
        };
    }

    if player.pos.y > obstacle.top() {
        return Resolution::Clear;
    }

    if !player.is_riding() && player.aabb().intersects(&obstacle.aabb()) {
        return Resolution::Fatal {
            obstacle_id: obstacle.id,
        };
    }

    Resolution::Clear
}

/// Resolve against every train in the player's logical lane. A mount
/// anywhere beats a crash anywhere, so one tick never reports both.
pub fn resolve<'a>(
    player: &PlayerState,
    obstacles: impl IntoIterator<Item = &'a Obstacle>,
) -> Resolution {
    if player.is_riding() {
        return Resolution::Clear;
    }

    let mut fatal = None;
    for obstacle in obstacles.into_iter().filter(|o| o.lane == player.lane) {
        match resolve_obstacle(player, obstacle) {
            mount @ Resolution::Mount { .. } => return mount,
            Resolution::Fatal { obstacle_id } => {
                fatal.get_or_insert(obstacle_id);
            }
            Resolution::Clear => {}
        }
    }

    match fatal {
        Some(obstacle_id) => Resolution::Fatal { obstacle_id },
        None => Resolution::Clear,
    }
}

/// What riding did this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RideStep {
    NotRiding,
    Riding,
    /// The train slid out from under the player
    Outrun { obstacle_id: u32 },
    /// The train no longer exists
    Vanished { obstacle_id: u32 },
}

/// Keep a riding player slaved to their train. The train carries the player
/// toward the camera until the drift limit, then slides underneath; once its
/// rear clears the back of the player's body the ride is over.
pub fn follow_ride(player: &mut PlayerState, obstacle: Option<&Obstacle>) -> RideStep {
    let Some(ride) = player.riding else {
        return RideStep::NotRiding;
    };
    let Some(obstacle) = obstacle.filter(|o| o.id == ride.obstacle_id) else {
        player.riding = None;
        return RideStep::Vanished {
            obstacle_id: ride.obstacle_id,
        };
    };

    player.pos.x = obstacle.center_x();
    player.pos.y = RIDE_HEIGHT;
    player.pos.z = (obstacle.front_z() + ride.contact_offset).min(PLAYER_Z + MAX_RIDE_DRIFT);

    if obstacle.rear_z() > player.pos.z + PLAYER_HALF_DEPTH {
        player.riding = None;
        return RideStep::Outrun {
            obstacle_id: obstacle.id,
        };
    }

    RideStep::Riding
}
