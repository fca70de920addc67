//! Hexpop - a hex-grid bubble shooter engine
//!
//! Core modules:
//! - `sim`: Deterministic board simulation (lattice, snapping, matching, effects, scoring)
//! - `session`: Single-player stage progression
//! - `versus`: Seeded two-player matches over a peer link
//! - `net`: Wire codec and peer boundary
//! - `persistence`: Saved-game records and the settings store boundary
//! - `settings`: Player preferences and the resumable save slot
//! - `audio`: Sound cues for the host's mixer
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod net;
pub mod persistence;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod versus;

pub use session::GameSession;
pub use settings::{Difficulty, Settings};
pub use tuning::Tuning;
pub use versus::VersusSession;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed host timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per host frame
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Bubble radius in board units
    pub const BUBBLE_RADIUS: f32 = 1.0;
    /// Centre-to-centre distance between lattice neighbours
    pub const GRID_SPACING: f32 = 2.0;
    /// Adjacency band as a multiple of `GRID_SPACING` (absorbs snap error)
    pub const ADJACENCY_TOLERANCE: f32 = 1.1;
    /// Ceiling anchor band as a multiple of the ceiling offset
    pub const CEILING_BAND: f32 = 1.1;
    /// Bomb blast radius as a multiple of `GRID_SPACING`
    pub const BLAST_CELLS: f32 = 2.0;

    /// Reference window the host lays the board into (pixels)
    pub const BASE_WINDOW_WIDTH: f32 = 540.0;
    pub const BASE_WINDOW_HEIGHT: f32 = 720.0;
    /// HUD strip below the play field (pixels)
    pub const HUD_AREA_HEIGHT: f32 = 110.0;

    /// Stage clear bonus per stage number
    pub const STAGE_CLEAR_BONUS: u32 = 1000;
    /// Starting seconds between forced ceiling advances
    pub const BASE_MAX_TIME: f32 = 30.0;

    /// Pop animation duration hint (seconds)
    pub const POP_DURATION: f32 = 0.2;
    /// Drop animation duration hint (seconds)
    pub const DROP_DURATION: f32 = 1.5;
}

/// Height of one lattice row: `spacing * sqrt(3) / 2`
#[inline]
pub fn row_height(spacing: f32) -> f32 {
    spacing * (3.0_f32.sqrt() / 2.0)
}

/// Board units from the top of the field to the game-over line
///
/// The host window keeps a fixed aspect ratio, so the line scales with the
/// board width minus the HUD allowance.
pub fn game_over_line(abstract_width: f32) -> f32 {
    use consts::*;
    let game_height = abstract_width * (BASE_WINDOW_HEIGHT / BASE_WINDOW_WIDTH);
    let hud_height = abstract_width * (HUD_AREA_HEIGHT / BASE_WINDOW_WIDTH);
    game_height - hud_height
}

/// Clamp a raw aim vector away from horizontal and renormalize
///
/// Screen space has y pointing down, so a shot must keep at least a -0.1
/// upward component. Returns `None` for a zero vector.
pub fn aim_direction(raw: Vec2) -> Option<Vec2> {
    let dir = raw.normalize_or_zero();
    if dir == Vec2::ZERO {
        return None;
    }
    let clamped = Vec2::new(dir.x, dir.y.min(-0.1));
    Some(clamped.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aim_direction_clamps_flat_shots() {
        let dir = aim_direction(Vec2::new(1.0, 0.0)).unwrap();
        assert!(dir.y < 0.0);
        assert!((dir.length() - 1.0).abs() < 1e-5);

        let down = aim_direction(Vec2::new(0.3, 1.0)).unwrap();
        assert!(down.y < 0.0);

        assert!(aim_direction(Vec2::ZERO).is_none());
    }

    #[test]
    fn test_aim_direction_keeps_steep_shots() {
        let raw = Vec2::new(0.2, -1.0);
        let dir = aim_direction(raw).unwrap();
        let expected = raw.normalize();
        assert!((dir - expected).length() < 1e-5);
    }

    #[test]
    fn test_game_over_line_scales_with_width() {
        let narrow = game_over_line(14.0);
        let wide = game_over_line(22.0);
        assert!(wide > narrow);
        assert!((narrow - (14.0 * 610.0 / 540.0)).abs() < 1e-4);
    }
}
