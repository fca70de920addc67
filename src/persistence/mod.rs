//! Saved-game records and the settings storage boundary
//!
//! Storage itself is external; hosts implement [`SettingsStore`]. Saved
//! bubbles keep only position and kind code, display colour is re-derived on
//! load.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::sim::{Bubble, BubbleKind, ShotCounters};

/// One saved board bubble
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedBubble {
    pub pos: Vec2,
    /// Signed kind code
    pub kind: i32,
}

impl SavedBubble {
    pub fn from_bubble(bubble: &Bubble) -> Self {
        Self {
            pos: bubble.pos,
            kind: bubble.kind.code(),
        }
    }

    pub fn kind(&self) -> Option<BubbleKind> {
        BubbleKind::from_code(self.kind)
    }
}

/// Everything needed to resume a single-player stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedGame {
    pub score: u32,
    pub stage: u32,
    pub shots_until_drop: u32,
    pub time_until_drop: f32,
    pub helper_line_active: bool,
    pub bubbles: Vec<SavedBubble>,
    /// Kind code of the loaded ammo
    pub next_bubble: Option<i32>,
    /// Ceiling offset at save time (older saves start from the stage default)
    #[serde(default)]
    pub ceiling_y: Option<f32>,
    #[serde(default)]
    pub counters: ShotCounters,
}

#[derive(Debug)]
pub enum PersistenceError {
    Serde(serde_json::Error),
    /// The host store could not be reached
    Unavailable(String),
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serde(err) => write!(f, "settings json: {err}"),
            Self::Unavailable(reason) => write!(f, "settings store unavailable: {reason}"),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serde(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err)
    }
}

/// Host-provided settings storage
pub trait SettingsStore {
    /// `Ok(None)` when nothing has been saved yet
    fn load(&self) -> Result<Option<Settings>, PersistenceError>;
    fn save(&mut self, settings: &Settings) -> Result<(), PersistenceError>;
}

/// Store keeping the JSON text in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    json: Option<String>,
}

impl MemoryStore {
    pub fn with_json(json: impl Into<String>) -> Self {
        Self {
            json: Some(json.into()),
        }
    }

    pub fn json(&self) -> Option<&str> {
        self.json.as_deref()
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Option<Settings>, PersistenceError> {
        self.json
            .as_deref()
            .map(Settings::from_json)
            .transpose()
    }

    fn save(&mut self, settings: &Settings) -> Result<(), PersistenceError> {
        self.json = Some(settings.to_json()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_json_reports_error() {
        let store = MemoryStore::with_json("{not json");
        assert!(matches!(store.load(), Err(PersistenceError::Serde(_))));
        // the settings layer recovers with defaults
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_saved_game_round_trip() {
        let saved = SavedGame {
            score: 420,
            stage: 6,
            shots_until_drop: 3,
            time_until_drop: 12.5,
            helper_line_active: true,
            bubbles: vec![SavedBubble { pos: Vec2::new(3.0, 1.0), kind: -3 }],
            next_bubble: Some(2),
            ceiling_y: Some(2.732),
            counters: ShotCounters { since_bomb: 4, ..Default::default() },
        };
        let settings = Settings {
            saved_game: Some(saved.clone()),
            ..Default::default()
        };
        let mut store = MemoryStore::default();
        store.save(&settings).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.saved_game, Some(saved));
        assert_eq!(
            loaded.saved_game.unwrap().bubbles[0].kind(),
            Some(BubbleKind::Bomb)
        );
    }

    #[test]
    fn test_old_save_without_ceiling() {
        let json = r#"{"score":1,"stage":2,"shots_until_drop":8,"time_until_drop":30.0,
            "helper_line_active":false,"bubbles":[],"next_bubble":null}"#;
        let saved: SavedGame = serde_json::from_str(json).unwrap();
        assert_eq!(saved.ceiling_y, None);
        assert_eq!(saved.counters, ShotCounters::default());
    }
}
