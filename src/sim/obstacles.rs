//! Train spawning, movement and retirement

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::state::Obstacle;
use crate::consts::*;
use crate::tuning::Tuning;

/// What happened to the train set during one advance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvanceReport {
    pub spawned: Option<(u32, u8)>,
    pub retired: Vec<u32>,
}

/// Owns every live train. Sorted by id at all times.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObstacleField {
    obstacles: Vec<Obstacle>,
    /// Seconds since the last spawn (starts at zero on a fresh run)
    since_spawn: f32,
    next_id: u32,
}

impl ObstacleField {
    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Obstacle> {
        self.obstacles
            .binary_search_by_key(&id, |o| o.id)
            .ok()
            .map(|i| &self.obstacles[i])
    }

    /// Trains in one lane
    pub fn in_lane(&self, lane: u8) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter().filter(move |o| o.lane == lane)
    }

    pub fn since_spawn(&self) -> f32 {
        self.since_spawn
    }

    /// Drop every train and re-arm the spawn timer
    pub fn clear(&mut self) {
        self.obstacles.clear();
        self.since_spawn = 0.0;
    }

    /// Place a train directly (used by scripted scenarios and tests)
    pub fn insert(&mut self, lane: u8, z: f32, segment_count: u32, segment_spacing: f32) -> u32 {
        self.next_id += 1;
        let id = self.next_id;
        self.obstacles.push(Obstacle {
            id,
            lane: lane.min(MAX_LANE),
            z,
            segment_count: segment_count.max(1),
            segment_spacing,
        });
        id
    }

    /// One tick: spawn on the interval, move every train by `speed * dt`,
    /// then retire trains whose rear has passed the near cutoff
    pub fn advance(&mut self, speed: f32, dt: f32, tuning: &Tuning, rng: &mut Pcg32) -> AdvanceReport {
        let mut report = AdvanceReport::default();

        self.since_spawn += dt;
        if self.since_spawn >= tuning.spawn_interval {
            self.since_spawn -= tuning.spawn_interval;
            let lane = rng.random_range(MIN_LANE..=MAX_LANE);
            let id = self.insert(
                lane,
                SPAWN_Z,
                tuning.segments_per_train,
                tuning.segment_spacing,
            );
            log::debug!("Spawned train {} in lane {}", id, lane);
            report.spawned = Some((id, lane));
        }

        let step = speed * dt;
        for obstacle in &mut self.obstacles {
            obstacle.z += step;
        }

        self.obstacles.retain(|o| {
            let keep = o.rear_z() <= RETIRE_Z;
            if !keep {
                report.retired.push(o.id);
            }
            keep
        });

        report
    }
}
