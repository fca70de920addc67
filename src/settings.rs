//! Player settings and preferences
//!
//! Persisted as JSON through a [`SettingsStore`]. The resumable single-player
//! save slot lives here too.

use serde::{Deserialize, Serialize};

use crate::persistence::{PersistenceError, SavedGame, SettingsStore};

/// Difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Hard,
    Insanity,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Hard => "Hard",
            Difficulty::Insanity => "Insanity",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "hard" => Some(Difficulty::Hard),
            "insanity" | "insane" => Some(Difficulty::Insanity),
            _ => None,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub version: u32,

    // === Gameplay ===
    /// Draw the aiming guide
    pub show_guide_lines: bool,
    pub high_score: u32,
    pub difficulty: Difficulty,

    // === Audio ===
    pub sfx_muted: bool,
    pub bgm_muted: bool,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Bonus tracks found in chests (1-based)
    pub unlocked_bonus_tracks: Vec<u32>,

    /// Resumable single-player game
    pub saved_game: Option<SavedGame>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: 0,
            show_guide_lines: true,
            high_score: 0,
            difficulty: Difficulty::Hard,
            sfx_muted: false,
            bgm_muted: false,
            music_volume: 0.5,
            unlocked_bonus_tracks: Vec::new(),
            saved_game: None,
        }
    }
}

impl Settings {
    /// Keep `score` if it beats the current high score
    pub fn record_high_score(&mut self, score: u32) -> bool {
        if score > self.high_score {
            self.high_score = score;
            true
        } else {
            false
        }
    }

    /// Record a found bonus track; false if it was already known
    pub fn unlock_bonus_track(&mut self, track: u32) -> bool {
        if self.unlocked_bonus_tracks.contains(&track) {
            return false;
        }
        self.unlocked_bonus_tracks.push(track);
        self.unlocked_bonus_tracks.sort_unstable();
        true
    }

    /// Load settings from a store, falling back to defaults
    pub fn load(store: &dyn SettingsStore) -> Self {
        match store.load() {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(err) => {
                log::warn!("Failed to load settings ({err}), using defaults");
                Self::default()
            }
        }
    }

    /// Save settings; failures are logged, never fatal
    pub fn save(&self, store: &mut dyn SettingsStore) {
        match store.save(self) {
            Ok(()) => log::debug!("Settings saved"),
            Err(err) => log::warn!("Failed to save settings: {err}"),
        }
    }

    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        Ok(serde_json::from_str(json)?)
    }
}
