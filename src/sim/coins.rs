//! Coin pickups
//!
//! Coins ride the track at train speed. One spawned over a train sits on
//! its roof and stays there, since both move together.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::obstacles::ObstacleField;
use super::state::PlayerState;
use crate::consts::*;
use crate::lane_center_x;
use crate::tuning::Tuning;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    pub lane: u8,
    /// Centre height
    pub y: f32,
    pub z: f32,
}

impl Coin {
    pub fn center_x(&self) -> f32 {
        lane_center_x(self.lane)
    }

    pub fn aabb(&self) -> Aabb {
        let center = Vec3::new(self.center_x(), self.y, self.z);
        Aabb::new(center - Vec3::splat(COIN_HALF_SIZE), center + Vec3::splat(COIN_HALF_SIZE))
    }
}

/// Live coins, sorted by id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoinField {
    coins: Vec<Coin>,
    since_spawn: f32,
    next_id: u32,
}

impl CoinField {
    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.coins.iter()
    }

    pub fn len(&self) -> usize {
        self.coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }

    pub fn insert(&mut self, lane: u8, y: f32, z: f32) -> u32 {
        self.next_id += 1;
        let id = self.next_id;
        self.coins.push(Coin {
            id,
            lane: lane.min(MAX_LANE),
            y,
            z,
        });
        id
    }

    /// Move coins by `speed * dt`, retire the ones behind the camera, then
    /// spawn on the interval. Returns the new coin's id and lane.
    pub fn advance(
        &mut self,
        speed: f32,
        dt: f32,
        tuning: &Tuning,
        rng: &mut Pcg32,
        trains: &ObstacleField,
    ) -> Option<(u32, u8)> {
        let step = speed * dt;
        for coin in &mut self.coins {
            coin.z += step;
        }
        self.coins.retain(|c| c.z - COIN_HALF_SIZE <= RETIRE_Z);

        self.since_spawn += dt;
        if self.since_spawn < tuning.coin_interval {
            return None;
        }
        self.since_spawn -= tuning.coin_interval;

        let lane = rng.random_range(MIN_LANE..=MAX_LANE);
        let over_train = trains.in_lane(lane).any(|o| {
            SPAWN_Z <= o.front_z() + COIN_HALF_SIZE && SPAWN_Z >= o.rear_z() - COIN_HALF_SIZE
        });
        let y = if over_train { COIN_ROOF_Y } else { COIN_GROUND_Y };
        let id = self.insert(lane, y, SPAWN_Z);
        Some((id, lane))
    }

    /// Remove and return every coin the player's body touches
    pub fn collect(&mut self, player: &PlayerState) -> Vec<u32> {
        let body = player.aabb();
        let mut taken = Vec::new();
        self.coins.retain(|c| {
            let hit = body.intersects(&c.aabb());
            if hit {
                taken.push(c.id);
            }
            !hit
        });
        taken
    }
}
