//! High score leaderboard system
//!
//! Top 5 name/score pairs, persisted as one JSON value through whatever
//! [`KeyValueStore`] the caller injects (LocalStorage on the web, files
//! natively).

use serde::{Deserialize, Serialize};

use crate::persistence::{self, KeyValueStore, StoreError};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 5;
/// Names are stored uppercased and cut to this many characters
pub const MAX_NAME_LEN: usize = 6;
/// Storage key
pub const STORAGE_KEY: &str = "lane_runner_highscores";

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u64,
}

impl HighScoreEntry {
    pub fn new(name: &str, score: u64) -> Self {
        Self {
            name: sanitize_name(name),
            score,
        }
    }
}

/// Uppercase, strip control characters and cut to `MAX_NAME_LEN`
pub fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_NAME_LEN)
        .collect();
    if cleaned.is_empty() {
        "???".to_string()
    } else {
        cleaned
    }
}

/// Ordered leaderboard, highest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Board shown before anyone has played
    pub fn seeded() -> Self {
        Self {
            entries: [("BLAZE", 500), ("COMET", 400), ("DASH", 300), ("ECHO", 200), ("FLINT", 100)]
                .into_iter()
                .map(|(name, score)| HighScoreEntry::new(name, score))
                .collect(),
        }
    }

    /// Sort, cap and clean a list that may have come from storage
    pub fn normalized(mut self) -> Self {
        for entry in &mut self.entries {
            entry.name = sanitize_name(&entry.name);
        }
        // Stable: among equal scores the earlier entry stays ahead
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(MAX_HIGH_SCORES);
        self
    }

    /// True if the board has a free slot or the score beats the lowest entry
    pub fn qualifies(&self, score: u64) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Get the rank a score would achieve (1-indexed, None if doesn't qualify)
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert, keep sorted descending, trim to the top 5.
    /// Returns the rank achieved, or None if the entry fell off the end.
    pub fn insert(&mut self, name: &str, score: u64) -> Option<usize> {
        let pos = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, HighScoreEntry::new(name, score));
        self.entries.truncate(MAX_HIGH_SCORES);
        (pos < MAX_HIGH_SCORES).then_some(pos + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn scores(&self) -> Vec<u64> {
        self.entries.iter().map(|e| e.score).collect()
    }
}

/// The leaderboard bound to its store
pub struct HighScoreLedger<S: KeyValueStore> {
    store: S,
    scores: HighScores,
}

impl<S: KeyValueStore> HighScoreLedger<S> {
    /// Load the persisted board, or the seed board if nothing usable is stored
    pub fn load(store: S) -> Self {
        let scores = match persistence::load_json::<HighScores, _>(&store, STORAGE_KEY) {
            Some(scores) => {
                log::info!("Loaded {} high scores", scores.entries.len());
                scores.normalized()
            }
            None => {
                log::info!("No high scores found, using the default board");
                HighScores::seeded()
            }
        };
        Self { store, scores }
    }

    pub fn scores(&self) -> &HighScores {
        &self.scores
    }

    pub fn qualifies(&self, score: u64) -> bool {
        self.scores.qualifies(score)
    }

    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        self.scores.potential_rank(score)
    }

    /// Record a finished run and persist the whole board. The in-memory
    /// board is updated even if the write fails.
    pub fn record(&mut self, name: &str, score: u64) -> Result<Option<usize>, StoreError> {
        let rank = self.scores.insert(name, score);
        self.save()?;
        Ok(rank)
    }

    pub fn save(&mut self) -> Result<(), StoreError> {
        persistence::save_json(&mut self.store, STORAGE_KEY, &self.scores)?;
        log::info!("High scores saved ({} entries)", self.scores.entries.len());
        Ok(())
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
