//! Idle/demo mode: a simple bot that dodges or boards trains

use super::state::{GamePhase, GameState, LaneDirection, Obstacle};
use super::tick::TickInput;
use crate::consts::*;

/// Seconds of warning the bot wants before a train reaches it
const LOOKAHEAD_SECS: f32 = 0.9;
/// Jump when the train is this many seconds away (lands on the roof)
const JUMP_LEAD_SECS: f32 = 0.3;

fn threatens(obstacle: &Obstacle, horizon: f32) -> bool {
    obstacle.front_z() > PLAYER_Z - horizon && obstacle.rear_z() < PLAYER_Z + PLAYER_HALF_DEPTH
}

fn lane_is_safe(state: &GameState, lane: u8, horizon: f32) -> bool {
    !state.obstacles.in_lane(lane).any(|o| threatens(o, horizon))
}

/// Choose this tick's input for the demo player
pub fn steer(state: &GameState) -> TickInput {
    let mut input = TickInput::default();

    match state.phase {
        GamePhase::Ready => {
            input.start = true;
            return input;
        }
        GamePhase::Playing => {}
        _ => return input,
    }

    let player = &state.player;
    if player.is_riding() || player.is_airborne() {
        return input;
    }

    let horizon = state.obstacle_speed * LOOKAHEAD_SECS;
    let Some(nearest) = state
        .obstacles
        .in_lane(player.lane)
        .filter(|o| threatens(o, horizon))
        .max_by(|a, b| a.front_z().total_cmp(&b.front_z()))
    else {
        return input;
    };

    // Prefer stepping aside, but only once the body has finished the last change
    if player.lane == player.target_lane {
        for direction in [LaneDirection::Left, LaneDirection::Right] {
            let lane = player.lane as i32 + direction.delta();
            if !(MIN_LANE as i32..=MAX_LANE as i32).contains(&lane) {
                continue;
            }
            if lane_is_safe(state, lane as u8, horizon) {
                match direction {
                    LaneDirection::Left => input.move_left = true,
                    LaneDirection::Right => input.move_right = true,
                }
                return input;
            }
        }
    }

    let distance = PLAYER_Z - nearest.front_z();
    if distance <= state.obstacle_speed * JUMP_LEAD_SECS {
        input.jump = true;
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    fn playing_state() -> GameState {
        let mut state = GameState::new(3, Tuning::default());
        state.phase = GamePhase::Playing;
        state
    }

    #[test]
    fn test_starts_a_ready_game() {
        let state = GameState::new(3, Tuning::default());
        assert!(steer(&state).start);
    }

    #[test]
    fn test_idles_on_clear_track() {
        let state = playing_state();
        let input = steer(&state);
        assert!(!input.move_left && !input.move_right && !input.jump);
    }

    #[test]
    fn test_sidesteps_into_free_lane() {
        let mut state = playing_state();
        state.obstacles.insert(1, -10.0, 3, 0.5);
        state.obstacles.insert(0, -10.0, 3, 0.5);
        let input = steer(&state);
        assert!(input.move_right);
    }

    #[test]
    fn test_jumps_when_boxed_in() {
        let mut state = playing_state();
        for lane in 0..LANE_COUNT {
            state.obstacles.insert(lane, -5.0, 3, 0.5);
        }
        assert!(steer(&state).jump);
    }
}
