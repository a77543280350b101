//! Per-frame view of the simulation for an external renderer
//!
//! The core never draws. Drivers hand this (usually as JSON) to whatever
//! does.

use serde::Serialize;

use crate::sim::{GamePhase, GameState};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub lane: u8,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub airborne: bool,
    pub riding: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainView {
    pub id: u32,
    pub lane: u8,
    pub x: f32,
    pub front_z: f32,
    pub rear_z: f32,
    pub segments: u32,
    pub segment_spacing: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub phase: GamePhase,
    pub score: u64,
    pub is_over: bool,
    pub track_offset: f32,
    pub track_speed: f32,
    pub player: PlayerView,
    pub trains: Vec<TrainView>,
    pub coins: Vec<CoinView>,
    pub coins_collected: u32,
}

impl FrameSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let p = &state.player;
        Self {
            phase: state.phase,
            score: state.display_score(),
            is_over: state.is_over(),
            track_offset: state.track_offset,
            track_speed: state.track_speed,
            player: PlayerView {
                lane: p.lane,
                x: p.pos.x,
                y: p.pos.y,
                z: p.pos.z,
                airborne: p.is_airborne(),
                riding: p.riding.map(|r| r.obstacle_id),
            },
            trains: state
                .obstacles
                .iter()
                .map(|o| TrainView {
                    id: o.id,
                    lane: o.lane,
                    x: o.center_x(),
                    front_z: o.front_z(),
                    rear_z: o.rear_z(),
                    segments: o.segment_count,
                    segment_spacing: o.segment_spacing,
                })
                .collect(),
            coins: state
                .coins
                .iter()
                .map(|c| CoinView {
                    id: c.id,
                    x: c.center_x(),
                    y: c.y,
                    z: c.z,
                })
                .collect(),
            coins_collected: state.coins_collected,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    #[test]
    fn test_capture_reflects_state() {
        let mut state = GameState::new(1, Tuning::default());
        let id = state.obstacles.insert(2, -40.0, 2, 0.5);
        state.score = 12.9;
        state.coins.insert(0, crate::consts::COIN_GROUND_Y, -20.0);

        let snap = FrameSnapshot::capture(&state);
        assert_eq!(snap.score, 12);
        assert!(!snap.is_over);
        assert_eq!(snap.trains.len(), 1);
        assert_eq!(snap.trains[0].id, id);
        assert_eq!(snap.trains[0].rear_z, -52.5);
        assert_eq!(snap.coins.len(), 1);
        assert_eq!(snap.coins[0].x, -crate::consts::LANE_WIDTH);

        let json = snap.to_json().unwrap();
        assert!(json.contains("\"phase\":\"Ready\""));
    }
}
