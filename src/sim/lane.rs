//! Lane switching and lateral interpolation

use super::state::{LaneDirection, PlayerState};
use crate::consts::LANE_CHANGE_SPEED;
use crate::{clamp_lane, lane_center_x};

/// Request a one-lane shift. Ignored while riding (the train owns lateral
/// position). Returns true if the target lane changed.
pub fn request_lane_change(player: &mut PlayerState, direction: LaneDirection) -> bool {
    if player.is_riding() {
        return false;
    }
    let target = clamp_lane(player.lane as i32 + direction.delta());
    if target == player.target_lane {
        return false;
    }
    player.target_lane = target;
    // Logical lane switches at once; only the body interpolates
    player.lane = target;
    true
}

/// Move the body toward the target lane by a fixed step, snapping once
/// within one step so it never overshoots
pub fn step_toward_lane(player: &mut PlayerState, dt: f32) {
    let target_x = lane_center_x(player.target_lane);
    let step = LANE_CHANGE_SPEED * dt;
    let delta = target_x - player.pos.x;
    if delta.abs() <= step {
        player.pos.x = target_x;
    } else {
        player.pos.x += step * delta.signum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::state::Ride;
    use proptest::prelude::*;

    #[test]
    fn test_left_clamps_at_zero() {
        let mut player = PlayerState::default();
        let mut targets = vec![player.target_lane];
        for _ in 0..3 {
            request_lane_change(&mut player, LaneDirection::Left);
            targets.push(player.target_lane);
        }
        assert_eq!(targets, vec![1, 0, 0, 0]);
        assert_eq!(player.lane, 0);
    }

    #[test]
    fn test_right_clamps_at_two() {
        let mut player = PlayerState::default();
        assert!(request_lane_change(&mut player, LaneDirection::Right));
        assert!(!request_lane_change(&mut player, LaneDirection::Right));
        assert_eq!(player.lane, MAX_LANE);
    }

    #[test]
    fn test_riding_blocks_lateral_requests() {
        let mut player = PlayerState {
            riding: Some(Ride {
                obstacle_id: 4,
                contact_offset: -3.0,
            }),
            ..Default::default()
        };
        assert!(!request_lane_change(&mut player, LaneDirection::Left));
        assert_eq!(player.lane, 1);
    }

    #[test]
    fn test_interpolation_converges_without_overshoot() {
        let mut player = PlayerState::default();
        request_lane_change(&mut player, LaneDirection::Right);
        let target = lane_center_x(2);
        let mut last_gap = (target - player.pos.x).abs();
        for _ in 0..60 {
            step_toward_lane(&mut player, SIM_DT);
            assert!(player.pos.x <= target);
            let gap = (target - player.pos.x).abs();
            assert!(gap <= last_gap);
            last_gap = gap;
        }
        assert_eq!(player.pos.x, target);
    }

    #[test]
    fn test_snaps_within_one_step() {
        let mut player = PlayerState::default();
        player.target_lane = 2;
        player.pos.x = lane_center_x(2) - LANE_CHANGE_SPEED * SIM_DT * 0.5;
        step_toward_lane(&mut player, SIM_DT);
        assert_eq!(player.pos.x, lane_center_x(2));
        step_toward_lane(&mut player, SIM_DT);
        assert_eq!(player.pos.x, lane_center_x(2));
    }

    proptest! {
        #[test]
        fn lane_always_in_range(moves in proptest::collection::vec(any::<bool>(), 0..64)) {
            let mut player = PlayerState::default();
            for right in moves {
                let dir = if right { LaneDirection::Right } else { LaneDirection::Left };
                request_lane_change(&mut player, dir);
                prop_assert!(player.lane <= MAX_LANE);
                prop_assert_eq!(player.lane, player.target_lane);
            }
        }
    }
}
