//! A play session: the simulation plus the things around it that touch
//! the outside world (frame timing, the leaderboard, name entry)

use crate::consts::*;
use crate::highscores::HighScoreLedger;
use crate::persistence::{KeyValueStore, StoreError};
use crate::sim::{GameEvent, GameState, TickInput, tick};
use crate::tuning::Tuning;

/// Discrete player request from the input layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Jump,
    FastDrop,
    Pause,
    Start,
}

pub struct Session<S: KeyValueStore> {
    state: GameState,
    ledger: HighScoreLedger<S>,
    /// Unsimulated time carried to the next frame
    accumulator: f32,
    /// One-shot requests waiting for the next tick
    pending: TickInput,
    /// Final score waiting for a name
    awaiting_name: Option<u64>,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(seed: u64, tuning: Tuning, ledger: HighScoreLedger<S>) -> Self {
        Self {
            state: GameState::new(seed, tuning.validated()),
            ledger,
            accumulator: 0.0,
            pending: TickInput::default(),
            awaiting_name: None,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn ledger(&self) -> &HighScoreLedger<S> {
        &self.ledger
    }

    /// Final score that qualified and still needs a name
    pub fn awaiting_name(&self) -> Option<u64> {
        self.awaiting_name
    }

    /// Queue a request for the next tick. Repeats before that tick collapse
    /// into one.
    pub fn queue(&mut self, action: Action) {
        match action {
            Action::MoveLeft => self.pending.move_left = true,
            Action::MoveRight => self.pending.move_right = true,
            Action::Jump => self.pending.jump = true,
            Action::FastDrop => self.pending.fast_drop = true,
            Action::Pause => self.pending.pause = true,
            Action::Start => self.pending.start = true,
        }
    }

    pub fn set_idle_mode(&mut self, on: bool) {
        self.pending.idle_mode = on;
    }

    pub fn idle_mode(&self) -> bool {
        self.pending.idle_mode
    }

    /// Run as many fixed ticks as `frame_dt` covers
    pub fn advance_frame(&mut self, frame_dt: f32) -> Vec<GameEvent> {
        let dt = crate::sanitize_dt(frame_dt, MAX_FRAME_DT);
        self.accumulator += dt;

        let mut events = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            events.extend(self.step());
            self.accumulator -= SIM_DT;
            substeps += 1;

            if self.state.is_over() {
                self.accumulator = 0.0;
                break;
            }
        }
        events
    }

    /// Exactly one simulation tick with the queued input
    pub fn step(&mut self) -> Vec<GameEvent> {
        let input = self.pending.clone();
        let mut events = tick(&mut self.state, &input, SIM_DT);

        // Clear one-shot inputs after processing
        self.pending = TickInput {
            idle_mode: self.pending.idle_mode,
            ..Default::default()
        };

        let final_score = events.iter().find_map(|e| match e {
            GameEvent::GameOver { final_score } => Some(*final_score),
            _ => None,
        });
        if let Some(final_score) = final_score {
            if let Some(rank) = self.ledger.potential_rank(final_score) {
                log::info!("Score {} qualifies for rank {}", final_score, rank);
                self.awaiting_name = Some(final_score);
                events.push(GameEvent::HighScoreQualified { final_score, rank });
            }
        }
        events
    }

    /// Enter the pending qualified score under `name`
    pub fn submit_name(&mut self, name: &str) -> Result<Option<usize>, StoreError> {
        let Some(score) = self.awaiting_name.take() else {
            return Ok(None);
        };
        self.ledger.record(name, score)
    }

    /// Start over with the same tuning; an unsubmitted score is forfeited
    pub fn restart(&mut self, seed: u64) {
        self.state.restart(seed);
        self.accumulator = 0.0;
        self.awaiting_name = None;
        self.pending = TickInput {
            idle_mode: self.pending.idle_mode,
            ..Default::default()
        };
    }

    /// Start over with different tuning
    pub fn restart_with(&mut self, seed: u64, tuning: Tuning) {
        self.state.tuning = tuning.validated();
        self.restart(seed);
    }
}
