//! Simulation tick
//!
//! Core game loop step: input, motion, trains, riding, collisions, score.

use super::autopilot;
use super::collision::{self, Resolution, RideStep};
use super::difficulty;
use super::lane;
use super::motion::{self, JumpOutcome};
use super::state::{DismountCause, GameEvent, GamePhase, GameState, LaneDirection, Ride};
use crate::consts::*;
use crate::sanitize_dt;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
    /// Cut a jump short
    pub fast_drop: bool,
    /// Pause toggle
    pub pause: bool,
    /// Leave the ready screen
    pub start: bool,
    /// Idle/demo mode - the bot plays the game
    pub idle_mode: bool,
}

impl TickInput {
    /// Any gameplay request (starts a ready game)
    pub fn any_action(&self) -> bool {
        self.move_left || self.move_right || self.jump || self.fast_drop || self.start
    }
}

/// Advance the game state by one step of `dt` seconds and report what
/// happened. `dt` is clamped to [0, MAX_TICK_DT]; a non-finite `dt` counts
/// as zero.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let dt = sanitize_dt(dt, MAX_TICK_DT);

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                events.push(GameEvent::Paused);
                log::info!("Paused at score {}", state.display_score());
                return events;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                events.push(GameEvent::Resumed);
                log::info!("Resumed");
            }
            _ => {}
        }
    }

    let input = if input.idle_mode {
        autopilot::steer(state)
    } else {
        input.clone()
    };

    match state.phase {
        GamePhase::Ready => {
            if !input.any_action() {
                return events;
            }
            state.phase = GamePhase::Playing;
            events.push(GameEvent::Started);
            log::info!("Run started (seed {})", state.seed);
        }
        GamePhase::Paused | GamePhase::GameOver => return events,
        GamePhase::Playing => {}
    }

    state.elapsed_ticks += 1;

    // Player requests
    if input.move_left {
        lane::request_lane_change(&mut state.player, LaneDirection::Left);
    }
    if input.move_right {
        lane::request_lane_change(&mut state.player, LaneDirection::Right);
    }
    if input.fast_drop && motion::request_fast_drop(&mut state.player) {
        events.push(GameEvent::FastDropped);
    }
    if input.jump {
        match motion::request_jump(&mut state.player) {
            JumpOutcome::Rejected => {}
            JumpOutcome::FromGround => events.push(GameEvent::Jumped { from_roof: false }),
            JumpOutcome::FromRoof { obstacle_id } => {
                events.push(GameEvent::Jumped { from_roof: true });
                events.push(GameEvent::Dismounted {
                    obstacle_id,
                    cause: DismountCause::Jumped,
                });
            }
        }
    }

    // Player pose
    motion::advance(&mut state.player, dt);
    lane::step_toward_lane(&mut state.player, dt);

    // Trains
    let report = state
        .obstacles
        .advance(state.obstacle_speed, dt, &state.tuning, &mut state.rng);
    if let Some((obstacle_id, lane)) = report.spawned {
        events.push(GameEvent::Spawned { obstacle_id, lane });
    }
    state.coins.advance(
        state.obstacle_speed,
        dt,
        &state.tuning,
        &mut state.rng,
        &state.obstacles,
    );
    state.track_offset = (state.track_offset + state.track_speed * dt) % TRACK_TILE_LENGTH;

    // Riding
    follow_ride(state, &mut events);

    // Collisions
    match collision::resolve(&state.player, state.obstacles.iter()) {
        Resolution::Clear => {}
        Resolution::Mount {
            obstacle_id,
            contact_offset,
        } => {
            state.player.riding = Some(Ride {
                obstacle_id,
                contact_offset,
            });
            motion::land_on_roof(&mut state.player);
            follow_ride(state, &mut events);
            log::debug!("Mounted train {}", obstacle_id);
            events.push(GameEvent::Mounted { obstacle_id });
        }
        Resolution::Fatal { obstacle_id } => {
            state.phase = GamePhase::GameOver;
            let final_score = state.display_score();
            log::info!(
                "Game over: hit train {} at score {} after {} ticks",
                obstacle_id,
                final_score,
                state.elapsed_ticks
            );
            events.push(GameEvent::GameOver { final_score });
            return events;
        }
    }

    // Pickups
    let mut bonus = 0.0;
    for coin_id in state.coins.collect(&state.player) {
        state.coins_collected += 1;
        bonus += state.tuning.coin_value as f64;
        events.push(GameEvent::CoinCollected { coin_id });
    }

    // Score and difficulty
    if difficulty::accrue(&mut state.score, bonus) {
        events.push(GameEvent::ScoreChanged {
            score: state.display_score(),
        });
    }
    state.obstacle_speed = difficulty::obstacle_speed(&state.tuning, state.score);
    state.track_speed = difficulty::track_speed(&state.tuning, state.score);

    events
}

/// Slave a riding player to their train; start the fall when the ride ends
fn follow_ride(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let ridden = state
        .player
        .riding
        .and_then(|ride| state.obstacles.get(ride.obstacle_id));

    let (obstacle_id, cause) = match collision::follow_ride(&mut state.player, ridden) {
        RideStep::NotRiding | RideStep::Riding => return,
        RideStep::Outrun { obstacle_id } => (obstacle_id, DismountCause::Outrun),
        RideStep::Vanished { obstacle_id } => (obstacle_id, DismountCause::Vanished),
    };

    motion::start_fall(&mut state.player);
    log::debug!("Fell off train {} ({:?})", obstacle_id, cause);
    events.push(GameEvent::Dismounted { obstacle_id, cause });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lane_center_x;
    use crate::sim::motion::VerticalMotion;
    use crate::tuning::{DifficultyPreset, Tuning};
    use proptest::prelude::*;

    fn playing(seed: u64) -> GameState {
        let mut state = GameState::new(seed, Tuning::default());
        tick(
            &mut state,
            &TickInput {
                start: true,
                ..Default::default()
            },
            SIM_DT,
        );
        assert_eq!(state.phase, GamePhase::Playing);
        state
    }

    /// Tuning that never spawns on its own, for scripted scenarios
    fn quiet(seed: u64) -> GameState {
        let mut state = playing(seed);
        state.tuning.spawn_interval = 1.0e6;
        state.tuning.coin_interval = 1.0e6;
        state
    }

    fn left() -> TickInput {
        TickInput {
            move_left: true,
            ..Default::default()
        }
    }

    fn jump() -> TickInput {
        TickInput {
            jump: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_ready_waits_for_input() {
        let mut state = GameState::new(1, Tuning::default());
        for _ in 0..10 {
            let events = tick(&mut state, &TickInput::default(), SIM_DT);
            assert!(events.is_empty());
        }
        assert_eq!(state.phase, GamePhase::Ready);
        assert_eq!(state.score, 0.0);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_three_lefts_clamp_and_settle() {
        let mut state = quiet(1);
        let mut targets = vec![state.player.target_lane];
        for _ in 0..3 {
            tick(&mut state, &left(), SIM_DT);
            targets.push(state.player.target_lane);
        }
        assert_eq!(targets, vec![1, 0, 0, 0]);
        assert_eq!(state.player.lane, 0);

        let settle_ticks = (LANE_WIDTH / (LANE_CHANGE_SPEED * SIM_DT)).ceil() as usize;
        for _ in 0..settle_ticks {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.player.pos.x, lane_center_x(0));
    }

    #[test]
    fn test_pause_freezes_score() {
        let mut state = playing(2);
        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        let events = tick(&mut state, &pause, SIM_DT);
        assert_eq!(events, vec![GameEvent::Paused]);
        let frozen = state.score;
        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.score, frozen);

        let events = tick(&mut state, &pause, SIM_DT);
        assert_eq!(events.first(), Some(&GameEvent::Resumed));
        assert!(state.score > frozen);
    }

    #[test]
    fn test_crash_ends_run_and_freezes_score() {
        let mut state = quiet(3);
        state.obstacles.insert(1, -2.0, 3, 0.5);

        let mut over = None;
        for _ in 0..60 {
            let events = tick(&mut state, &TickInput::default(), SIM_DT);
            if let Some(e) = events
                .iter()
                .find(|e| matches!(e, GameEvent::GameOver { .. }))
            {
                over = Some(*e);
                break;
            }
        }
        let Some(GameEvent::GameOver { final_score }) = over else {
            panic!("expected game over");
        };
        assert!(state.is_over());
        assert_eq!(final_score, state.display_score());

        let score = state.score;
        let before = state.player.pos;
        for _ in 0..30 {
            let events = tick(&mut state, &left(), SIM_DT);
            assert!(events.is_empty());
        }
        assert_eq!(state.score, score);
        assert_eq!(state.player.pos, before);
    }

    #[test]
    fn test_jump_onto_train_then_fall_off() {
        let mut state = quiet(4);
        // Train arrives about when the jump starts descending
        let train = state.obstacles.insert(1, -12.0, 3, 0.5);
        tick(&mut state, &jump(), SIM_DT);

        let mut mounted = false;
        let mut dismounted = None;
        for _ in 0..240 {
            let events = tick(&mut state, &TickInput::default(), SIM_DT);
            assert!(!state.is_over(), "crashed instead of boarding");
            for e in events {
                match e {
                    GameEvent::Mounted { obstacle_id } => {
                        assert_eq!(obstacle_id, train);
                        mounted = true;
                    }
                    GameEvent::Dismounted { cause, .. } => dismounted = Some(cause),
                    _ => {}
                }
            }
            if dismounted.is_some() {
                break;
            }
        }
        assert!(mounted);
        assert_eq!(dismounted, Some(DismountCause::Outrun));
        assert!(matches!(state.player.motion, VerticalMotion::Falling { .. }));

        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!(!state.is_over());
        assert_eq!(state.player.pos.y, 0.0);
        assert_eq!(state.player.pos.z, PLAYER_Z);
    }

    #[test]
    fn test_riding_player_jumps_off() {
        let mut state = quiet(5);
        let id = state.obstacles.insert(1, 5.0, 3, 0.5);
        state.player.riding = Some(Ride {
            obstacle_id: id,
            contact_offset: -5.0,
        });
        state.player.pos.y = RIDE_HEIGHT;

        let events = tick(&mut state, &jump(), SIM_DT);
        assert!(events.contains(&GameEvent::Jumped { from_roof: true }));
        assert!(events.contains(&GameEvent::Dismounted {
            obstacle_id: id,
            cause: DismountCause::Jumped,
        }));
        assert!(state.player.pos.y > RIDE_HEIGHT);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut state = playing(6);
        for _ in 0..200 {
            tick(&mut state, &jump(), SIM_DT);
            if state.is_over() {
                break;
            }
        }
        assert!(state.score > 0.0);

        state.restart(6);
        assert_eq!(state.phase, GamePhase::Ready);
        assert_eq!(state.score, 0.0);
        assert!(state.obstacles.is_empty());
        assert!(state.coins.is_empty());
        assert_eq!(state.coins_collected, 0);
        assert_eq!(state.obstacles.since_spawn(), 0.0);
        assert!(state.player.riding.is_none());
        assert_eq!(state.player.motion, VerticalMotion::Idle);
        assert_eq!(state.player.lane, START_LANE);
        assert_eq!(state.obstacle_speed, state.tuning.base_obstacle_speed);
    }

    /// Put a riding player on a lane-1 train whose front is `front` units
    /// past the player, then tick until the train slides out and the fall
    /// lands
    fn ride_off_the_back(tuning: Tuning, dt: f32, front: f32) -> GameState {
        let mut state = GameState::new(12, tuning);
        state.phase = GamePhase::Playing;
        state.tuning.spawn_interval = 1.0e6;
        state.tuning.coin_interval = 1.0e6;
        let id = state.obstacles.insert(1, front, TRAIN_SEGMENTS, TRAIN_SEGMENT_GAP);
        state.player.riding = Some(Ride {
            obstacle_id: id,
            contact_offset: -front,
        });
        state.player.pos.y = RIDE_HEIGHT;

        let mut outrun = false;
        for _ in 0..2000 {
            for e in tick(&mut state, &TickInput::default(), dt) {
                if let GameEvent::Dismounted { cause, .. } = e {
                    assert_eq!(cause, DismountCause::Outrun);
                    outrun = true;
                }
            }
            if state.is_over() || (outrun && !state.player.is_airborne()) {
                break;
            }
        }
        assert!(outrun, "never slid off train starting at {}", front);
        state
    }

    #[test]
    fn test_sliding_off_a_slow_train_is_safe() {
        let relaxed = DifficultyPreset::Relaxed.tuning();
        for i in 0..100 {
            let front = i as f32 * 0.19;
            let state = ride_off_the_back(relaxed.clone(), SIM_DT, front);
            assert!(!state.is_over(), "crashed leaving a Relaxed train at {}", front);
        }
    }

    #[test]
    fn test_sliding_off_at_high_tick_rate_is_safe() {
        for i in 0..100 {
            let front = i as f32 * 0.19;
            let state = ride_off_the_back(Tuning::default(), 1.0 / 120.0, front);
            assert!(!state.is_over(), "crashed leaving a train at {} (120 Hz)", front);
            assert_eq!(state.player.pos.y, 0.0);
        }
    }

    #[test]
    fn test_nan_delta_is_ignored() {
        let mut state = quiet(13);
        state.obstacles.insert(0, -40.0, 3, 0.5);
        tick(&mut state, &jump(), SIM_DT);
        tick(&mut state, &TickInput::default(), f32::NAN);
        assert!(state.player.pos.is_finite());
        assert!(state.obstacles.iter().all(|o| o.z.is_finite()));
        assert!(state.track_offset.is_finite());
        assert!(!state.is_over());
    }

    #[test]
    fn test_coin_pickup_adds_bonus() {
        let mut state = quiet(14);
        let before = state.score;
        state.coins.insert(1, COIN_GROUND_Y, -0.2);
        let events = tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(events.iter().any(|e| matches!(e, GameEvent::CoinCollected { .. })));
        assert!(events.iter().any(|e| matches!(e, GameEvent::ScoreChanged { .. })));
        assert_eq!(state.coins_collected, 1);
        assert_eq!(state.score, before + SCORE_PER_TICK + state.tuning.coin_value as f64);
        assert!(state.coins.is_empty());
    }

    #[test]
    fn test_coins_in_other_lanes_are_missed() {
        let mut state = quiet(15);
        state.coins.insert(0, COIN_GROUND_Y, -0.2);
        state.coins.insert(2, COIN_GROUND_Y, -0.2);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.coins_collected, 0);
    }

    #[test]
    fn test_fast_drop_lands_early() {
        let mut state = quiet(16);
        tick(&mut state, &jump(), SIM_DT);
        tick(&mut state, &TickInput::default(), SIM_DT);
        let drop = TickInput {
            fast_drop: true,
            ..Default::default()
        };
        let events = tick(&mut state, &drop, SIM_DT);
        assert!(events.contains(&GameEvent::FastDropped));
        assert!(matches!(state.player.motion, VerticalMotion::Falling { .. }));

        let fall_ticks = (FALL_DURATION / SIM_DT).ceil() as usize + 1;
        for _ in 0..fall_ticks {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.player.pos.y, 0.0);
        assert!(!state.player.is_airborne());

        // Nothing to cut short on the ground
        let events = tick(&mut state, &drop, SIM_DT);
        assert!(!events.contains(&GameEvent::FastDropped));
    }

    #[test]
    fn test_score_changed_events_track_display() {
        let mut state = quiet(7);
        let mut last = 0;
        for _ in 0..50 {
            for e in tick(&mut state, &TickInput::default(), SIM_DT) {
                if let GameEvent::ScoreChanged { score } = e {
                    assert_eq!(score, last + 1);
                    last = score;
                }
            }
        }
        assert_eq!(last, state.display_score());
    }

    #[test]
    fn test_speeds_follow_score() {
        let mut state = quiet(8);
        for _ in 0..600 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!(state.obstacle_speed > state.tuning.base_obstacle_speed);
        assert!(state.track_speed > state.tuning.base_track_speed);
    }

    #[test]
    fn test_determinism() {
        let inputs = [left(), jump(), TickInput::default(), TickInput::default()];
        let mut a = playing(99999);
        let mut b = playing(99999);
        for i in 0..600 {
            let input = &inputs[i % inputs.len()];
            let ea = tick(&mut a, input, SIM_DT);
            let eb = tick(&mut b, input, SIM_DT);
            assert_eq!(ea, eb);
        }
        assert_eq!(a.elapsed_ticks, b.elapsed_ticks);
        assert_eq!(a.score, b.score);
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.obstacles.len(), b.obstacles.len());
    }

    #[test]
    fn test_idle_mode_survives_a_while() {
        let mut state = GameState::new(11, Tuning::default());
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..120 {
            tick(&mut state, &input, SIM_DT);
        }
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.score > 0.0);
    }

    proptest! {
        #[test]
        fn score_never_decreases(
            seed in any::<u64>(),
            script in proptest::collection::vec(0u8..5, 1..300),
        ) {
            let mut state = playing(seed);
            let mut last = state.score;
            for step in script {
                let input = TickInput {
                    move_left: step == 0,
                    move_right: step == 1,
                    jump: step == 2,
                    ..Default::default()
                };
                let was_over = state.is_over();
                tick(&mut state, &input, SIM_DT);
                prop_assert!(state.score >= last);
                if was_over {
                    prop_assert_eq!(state.score, last);
                }
                prop_assert!(state.player.lane <= MAX_LANE);
                last = state.score;
            }
        }
    }
}
