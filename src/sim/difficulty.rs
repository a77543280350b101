//! Score and difficulty curve

use crate::consts::SCORE_PER_TICK;
use crate::tuning::Tuning;

/// Train speed for a given score
#[inline]
pub fn obstacle_speed(tuning: &Tuning, score: f64) -> f32 {
    tuning.base_obstacle_speed + (score / tuning.obstacle_speed_divisor as f64) as f32
}

/// Ground scroll speed for a given score
#[inline]
pub fn track_speed(tuning: &Tuning, score: f64) -> f32 {
    tuning.base_track_speed + (score / tuning.track_speed_divisor as f64) as f32
}

/// Add one tick of score plus any pickup `bonus`; true if the displayed
/// value changed
pub fn accrue(score: &mut f64, bonus: f64) -> bool {
    let before = score.floor();
    *score += SCORE_PER_TICK + bonus.max(0.0);
    score.floor() > before
}
