//! Data-driven game balance
//!
//! Speeds are in world units per second. Both speed curves are linear in
//! score; the track divisor is larger so trains pull away from the
//! scrolling ground as a run gets longer.

use serde::{Deserialize, Serialize};

/// Difficulty presets selectable from settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DifficultyPreset {
    Relaxed,
    #[default]
    Normal,
    Frantic,
}

impl DifficultyPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyPreset::Relaxed => "Relaxed",
            DifficultyPreset::Normal => "Normal",
            DifficultyPreset::Frantic => "Frantic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relaxed" | "easy" => Some(DifficultyPreset::Relaxed),
            "normal" => Some(DifficultyPreset::Normal),
            "frantic" | "hard" => Some(DifficultyPreset::Frantic),
            _ => None,
        }
    }

    pub fn tuning(&self) -> Tuning {
        let base = Tuning::default();
        match self {
            DifficultyPreset::Relaxed => Tuning {
                base_obstacle_speed: 24.0,
                base_track_speed: 16.0,
                spawn_interval: 1.6,
                ..base
            },
            DifficultyPreset::Normal => base,
            DifficultyPreset::Frantic => Tuning {
                base_obstacle_speed: 38.0,
                base_track_speed: 26.0,
                obstacle_speed_divisor: 35.0,
                track_speed_divisor: 80.0,
                spawn_interval: 0.9,
                ..base
            },
        }
    }
}

/// Balance values for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub base_obstacle_speed: f32,
    pub obstacle_speed_divisor: f32,
    pub base_track_speed: f32,
    /// Must exceed `obstacle_speed_divisor`
    pub track_speed_divisor: f32,
    /// Seconds between train spawns
    pub spawn_interval: f32,
    pub segments_per_train: u32,
    pub segment_spacing: f32,
    /// Seconds between coin spawns
    pub coin_interval: f32,
    /// Score added per coin picked up
    pub coin_value: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_obstacle_speed: 30.0,
            obstacle_speed_divisor: 50.0,
            base_track_speed: 20.0,
            track_speed_divisor: 100.0,
            spawn_interval: 1.2,
            segments_per_train: crate::consts::TRAIN_SEGMENTS,
            segment_spacing: crate::consts::TRAIN_SEGMENT_GAP,
            coin_interval: 0.5,
            coin_value: 5.0,
        }
    }
}

impl Tuning {
    /// Whether the values describe a playable curve
    pub fn is_valid(&self) -> bool {
        self.base_obstacle_speed > 0.0
            && self.base_track_speed > 0.0
            && self.obstacle_speed_divisor > 0.0
            && self.track_speed_divisor > self.obstacle_speed_divisor
            && self.spawn_interval > 0.0
            && self.segments_per_train >= 1
            && self.segment_spacing >= 0.0
            && self.coin_interval > 0.0
            && self.coin_value >= 0.0
    }

    /// Replace an unplayable tuning with the defaults
    pub fn validated(self) -> Self {
        if self.is_valid() {
            self
        } else {
            log::warn!("Rejecting invalid tuning {:?}, using defaults", self);
            Self::default()
        }
    }
}
