//! Vertical motion: jump arcs and falls
//!
//! Exactly one motion runs at a time. Each is sampled from its own elapsed
//! time, so a frame hitch moves it further along the curve rather than
//! changing the curve's shape.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use super::state::PlayerState;
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum VerticalMotion {
    /// Standing on the ground or on a roof
    #[default]
    Idle,
    /// `height = base + sin(pi * t) * amplitude`, depth eases back to the
    /// neutral plane
    Jumping {
        elapsed: f32,
        amplitude: f32,
        base: f32,
        from_depth: f32,
    },
    /// Drop from a roof to the ground
    Falling {
        elapsed: f32,
        from_height: f32,
        from_depth: f32,
    },
}

/// Result of a jump request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpOutcome {
    /// A motion was already running
    Rejected,
    FromGround,
    /// Launched off a train roof; the ride is over
    FromRoof { obstacle_id: u32 },
}

impl VerticalMotion {
    #[inline]
    pub fn is_active(&self) -> bool {
        !matches!(self, VerticalMotion::Idle)
    }

    /// Normalized progress in [0, 1]
    pub fn progress(&self) -> f32 {
        match *self {
            VerticalMotion::Idle => 0.0,
            VerticalMotion::Jumping { elapsed, .. } => normalized(elapsed, JUMP_DURATION),
            VerticalMotion::Falling { elapsed, .. } => normalized(elapsed, FALL_DURATION),
        }
    }

    /// Past the apex of a jump, or any point of a fall
    pub fn is_descending(&self) -> bool {
        match self {
            VerticalMotion::Idle => false,
            VerticalMotion::Jumping { .. } => self.progress() >= 0.5,
            VerticalMotion::Falling { .. } => true,
        }
    }
}

#[inline]
fn normalized(elapsed: f32, duration: f32) -> f32 {
    (elapsed / duration).clamp(0.0, 1.0)
}

#[inline]
fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Start a jump unless one is already running. Jumping from a roof ends
/// the ride and launches higher.
pub fn request_jump(player: &mut PlayerState) -> JumpOutcome {
    if player.motion.is_active() {
        return JumpOutcome::Rejected;
    }

    let outcome = match player.riding.take() {
        Some(ride) => JumpOutcome::FromRoof {
            obstacle_id: ride.obstacle_id,
        },
        None => JumpOutcome::FromGround,
    };
    let amplitude = match outcome {
        JumpOutcome::FromRoof { .. } => RIDE_JUMP_AMPLITUDE,
        _ => JUMP_AMPLITUDE,
    };

    player.motion = VerticalMotion::Jumping {
        elapsed: 0.0,
        amplitude,
        base: player.pos.y,
        from_depth: player.pos.z,
    };
    outcome
}

/// Start a fall from the current pose, cancelling any jump
pub fn start_fall(player: &mut PlayerState) {
    player.motion = VerticalMotion::Falling {
        elapsed: 0.0,
        from_height: player.pos.y,
        from_depth: player.pos.z,
    };
}

/// Cut a running jump short into a fall from the current pose. Anything
/// other than a jump is left alone.
pub fn request_fast_drop(player: &mut PlayerState) -> bool {
    if !matches!(player.motion, VerticalMotion::Jumping { .. }) {
        return false;
    }
    start_fall(player);
    true
}

/// Stop all vertical motion and stand on a roof
pub fn land_on_roof(player: &mut PlayerState) {
    player.motion = VerticalMotion::Idle;
    player.pos.y = RIDE_HEIGHT;
}

/// Advance the running motion. Returns true on the tick it completes.
///
/// `dt` is clamped so a long suspension cannot teleport the player, and
/// progress at or past 1 completes the motion instead of extrapolating.
pub fn advance(player: &mut PlayerState, dt: f32) -> bool {
    let dt = crate::sanitize_dt(dt, MAX_TICK_DT);

    match &mut player.motion {
        VerticalMotion::Idle => false,

        VerticalMotion::Jumping {
            elapsed,
            amplitude,
            base,
            from_depth,
        } => {
            *elapsed += dt;
            let t = *elapsed / JUMP_DURATION;
            let (amplitude, base, from_depth) = (*amplitude, *base, *from_depth);

            if t >= 1.0 {
                player.pos.z = PLAYER_Z;
                if base > 0.0 {
                    // Launched from a roof that is no longer underneath
                    player.pos.y = base;
                    start_fall(player);
                    return false;
                }
                player.pos.y = 0.0;
                player.motion = VerticalMotion::Idle;
                return true;
            }

            let t = t.max(0.0);
            player.pos.y = base + (PI * t).sin() * amplitude;
            player.pos.z = from_depth + (PLAYER_Z - from_depth) * t;
            false
        }

        VerticalMotion::Falling {
            elapsed,
            from_height,
            from_depth,
        } => {
            *elapsed += dt;
            let t = *elapsed / FALL_DURATION;
            let (from_height, from_depth) = (*from_height, *from_depth);

            if t >= 1.0 {
                player.pos.y = 0.0;
                player.pos.z = PLAYER_Z;
                player.motion = VerticalMotion::Idle;
                return true;
            }

            let t = t.max(0.0);
            player.pos.y = from_height * (1.0 - t * t);
            player.pos.z = from_depth + (PLAYER_Z - from_depth) * smoothstep(t);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Ride;

    fn run_until_idle(player: &mut PlayerState, max_ticks: usize) -> usize {
        for i in 0..max_ticks {
            if advance(player, SIM_DT) {
                return i + 1;
            }
        }
        panic!("motion did not complete in {} ticks", max_ticks);
    }

    #[test]
    fn test_jump_arc_peaks_and_lands() {
        let mut player = PlayerState::default();
        assert_eq!(request_jump(&mut player), JumpOutcome::FromGround);

        let mut peak = 0.0f32;
        for _ in 0..((JUMP_DURATION / SIM_DT) as usize + 2) {
            let done = advance(&mut player, SIM_DT);
            peak = peak.max(player.pos.y);
            assert!(player.pos.y >= 0.0);
            if done {
                break;
            }
        }
        assert!(peak > JUMP_AMPLITUDE * 0.95 && peak <= JUMP_AMPLITUDE + 1e-4);
        assert_eq!(player.pos.y, 0.0);
        assert_eq!(player.motion, VerticalMotion::Idle);
    }

    #[test]
    fn test_jump_request_mid_air_is_noop() {
        let mut player = PlayerState::default();
        request_jump(&mut player);
        for _ in 0..10 {
            advance(&mut player, SIM_DT);
        }
        let before = player.motion;
        assert_eq!(request_jump(&mut player), JumpOutcome::Rejected);
        assert_eq!(player.motion, before);
    }

    #[test]
    fn test_repeated_requests_do_not_extend_jump() {
        let mut single = PlayerState::default();
        request_jump(&mut single);
        let single_ticks = run_until_idle(&mut single, 200);

        let mut spammed = PlayerState::default();
        request_jump(&mut spammed);
        let mut ticks = 0;
        loop {
            request_jump(&mut spammed);
            ticks += 1;
            if advance(&mut spammed, SIM_DT) {
                break;
            }
        }
        assert_eq!(ticks, single_ticks);
    }

    #[test]
    fn test_huge_delta_is_clamped() {
        let mut player = PlayerState::default();
        request_jump(&mut player);
        // Ten seconds in one read must not finish a 0.6 s jump
        let done = advance(&mut player, 10.0);
        assert!(!done);
        assert!(player.motion.progress() < 0.1);
        assert!(player.pos.y > 0.0);
    }

    #[test]
    fn test_roof_jump_is_higher_and_ends_ride() {
        let mut player = PlayerState {
            riding: Some(Ride {
                obstacle_id: 9,
                contact_offset: -2.0,
            }),
            ..Default::default()
        };
        player.pos.y = RIDE_HEIGHT;
        assert_eq!(
            request_jump(&mut player),
            JumpOutcome::FromRoof { obstacle_id: 9 }
        );
        assert!(player.riding.is_none());
        match player.motion {
            VerticalMotion::Jumping { amplitude, base, .. } => {
                assert_eq!(amplitude, RIDE_JUMP_AMPLITUDE);
                assert_eq!(base, RIDE_HEIGHT);
            }
            other => panic!("expected jump, got {:?}", other),
        }
    }

    #[test]
    fn test_roof_jump_without_roof_hands_over_to_fall() {
        let mut player = PlayerState::default();
        player.pos.y = RIDE_HEIGHT;
        player.riding = Some(Ride {
            obstacle_id: 1,
            contact_offset: 0.0,
        });
        request_jump(&mut player);
        for _ in 0..((JUMP_DURATION / SIM_DT) as usize + 2) {
            advance(&mut player, SIM_DT);
        }
        assert!(matches!(player.motion, VerticalMotion::Falling { .. }));
        run_until_idle(&mut player, 100);
        assert_eq!(player.pos.y, 0.0);
    }

    #[test]
    fn test_fall_blends_depth_to_neutral() {
        let mut player = PlayerState::default();
        player.pos.y = RIDE_HEIGHT;
        player.pos.z = MAX_RIDE_DRIFT;
        start_fall(&mut player);

        let mut last_y = player.pos.y;
        let mut last_z = player.pos.z;
        loop {
            let done = advance(&mut player, SIM_DT);
            assert!(player.pos.y <= last_y);
            assert!(player.pos.z <= last_z);
            last_y = player.pos.y;
            last_z = player.pos.z;
            if done {
                break;
            }
        }
        assert_eq!(player.pos.y, 0.0);
        assert_eq!(player.pos.z, PLAYER_Z);
    }

    #[test]
    fn test_fast_drop_shortens_a_jump() {
        let mut full = PlayerState::default();
        request_jump(&mut full);
        let full_ticks = run_until_idle(&mut full, 200);

        let mut dropped = PlayerState::default();
        request_jump(&mut dropped);
        for _ in 0..6 {
            advance(&mut dropped, SIM_DT);
        }
        let height = dropped.pos.y;
        assert!(request_fast_drop(&mut dropped));
        match dropped.motion {
            VerticalMotion::Falling { from_height, .. } => assert_eq!(from_height, height),
            other => panic!("expected fall, got {:?}", other),
        }
        let rest = run_until_idle(&mut dropped, 200);
        assert!(6 + rest < full_ticks);
        assert_eq!(dropped.pos.y, 0.0);
    }

    #[test]
    fn test_fast_drop_ignored_unless_jumping() {
        let mut player = PlayerState::default();
        assert!(!request_fast_drop(&mut player));
        assert_eq!(player.motion, VerticalMotion::Idle);

        player.pos.y = RIDE_HEIGHT;
        start_fall(&mut player);
        let before = player.motion;
        assert!(!request_fast_drop(&mut player));
        assert_eq!(player.motion, before);
    }

    #[test]
    fn test_nan_delta_does_not_poison_motion() {
        let mut player = PlayerState::default();
        request_jump(&mut player);
        advance(&mut player, SIM_DT);
        advance(&mut player, f32::NAN);
        assert!(player.pos.y.is_finite());
        assert!(player.motion.progress().is_finite());
        run_until_idle(&mut player, 200);
    }

    #[test]
    fn test_descending_after_apex() {
        let mut player = PlayerState::default();
        request_jump(&mut player);
        advance(&mut player, SIM_DT);
        assert!(!player.motion.is_descending());
        for _ in 0..((JUMP_DURATION * 0.5 / SIM_DT) as usize + 1) {
            advance(&mut player, SIM_DT);
        }
        assert!(player.motion.is_descending());
    }
}
