//! Deterministic simulation module
//!
//! All board logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only, owned by the board
//! - Stable iteration order (insertion order, ties broken by first seen)
//! - No audio, network or storage dependencies

pub mod ammo;
pub mod board;
pub mod bubble;
pub mod clear;
pub mod collision;
pub mod effects;
pub mod lattice;
pub mod layout;
pub mod state;

pub use ammo::{AmmoRules, ShotCounters, SpecialRule, draw_ammo};
pub use board::{Board, MATCH_SIZE, RowGrowth};
pub use bubble::{Bubble, BubbleId, BubbleKind, COLOR_COUNT, all_colors, stage_colors};
pub use clear::ClearResult;
pub use collision::{Contact, WallHit, step_projectile};
pub use lattice::Lattice;
pub use layout::{VERSUS_ROWS, VERSUS_WIDTH, stage_rows, stage_width};
pub use state::{AnimationBatch, AnimationKind, GamePhase, TextCue, TextStyle, TickReport};
