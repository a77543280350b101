//! Player preferences
//!
//! Persisted separately from the leaderboard.

use serde::{Deserialize, Serialize};

use crate::highscores::sanitize_name;
use crate::persistence::{self, KeyValueStore, StoreError};
use crate::tuning::{DifficultyPreset, Tuning};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Balance preset for new runs
    pub difficulty: DifficultyPreset,
    /// Name pre-filled into the high score prompt
    pub last_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: DifficultyPreset::Normal,
            last_name: String::new(),
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "lane_runner_settings";

    /// Tuning for the next run
    pub fn tuning(&self) -> Tuning {
        self.difficulty.tuning()
    }

    /// Remember the name used for the last leaderboard entry
    pub fn remember_name(&mut self, name: &str) {
        self.last_name = sanitize_name(name);
    }

    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        match persistence::load_json(store, Self::STORAGE_KEY) {
            Some(settings) => {
                log::info!("Loaded settings");
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        persistence::save_json(store, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
