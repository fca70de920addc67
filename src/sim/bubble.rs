//! Bubble entities and the kind table
//!
//! Kinds are a closed set: ordinary colours carry a palette index, every
//! special behaviour has its own variant. The signed integer codes are only
//! used at the persistence and wire boundaries.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::BUBBLE_RADIUS;

/// Number of ordinary colours in the palette
pub const COLOR_COUNT: u8 = 4;

/// Display values for the ordinary colours (ABGR), indexed by palette slot
pub const COLOR_TABLE: [u32; COLOR_COUNT as usize] = [
    0xFF2727F5, // Red
    0xFF22B922, // Green
    0xFFD3B01A, // Blue
    0xFF1AD3D3, // Yellow
];

/// Stable per-board bubble identity
///
/// Two bubbles with identical fields are still different bubbles; every
/// deduplication in the board goes through this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BubbleId(pub u32);

/// What a bubble does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BubbleKind {
    /// Ordinary matchable colour (palette index)
    Color(u8),
    /// Neutral obstacle, never matches
    Junk,
    /// Unlocks the aiming helper when cleared as a bystander
    PowerUp,
    /// Blasts everything within two cells
    Bomb,
    /// Clears every bubble of one colour
    Star,
    /// Repaints the neighbours of the contact point
    Paint,
    /// Adopts the colour of whatever hits it
    Mirror,
    /// Bonus track unlock when cleared
    Chest,
}

impl BubbleKind {
    /// Signed type code used by saved games and board snapshots
    pub fn code(self) -> i32 {
        match self {
            BubbleKind::Color(i) => i as i32,
            BubbleKind::Junk => -1,
            BubbleKind::PowerUp => -2,
            BubbleKind::Bomb => -3,
            BubbleKind::Star => -4,
            BubbleKind::Paint => -5,
            BubbleKind::Mirror => -6,
            BubbleKind::Chest => -7,
        }
    }

    /// Inverse of [`BubbleKind::code`]; `None` for codes outside the table
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0..=3 => Some(BubbleKind::Color(code as u8)),
            -1 => Some(BubbleKind::Junk),
            -2 => Some(BubbleKind::PowerUp),
            -3 => Some(BubbleKind::Bomb),
            -4 => Some(BubbleKind::Star),
            -5 => Some(BubbleKind::Paint),
            -6 => Some(BubbleKind::Mirror),
            -7 => Some(BubbleKind::Chest),
            _ => None,
        }
    }

    /// Single-byte wire form (two's complement of the code)
    pub fn to_byte(self) -> u8 {
        self.code() as i8 as u8
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::from_code(byte as i8 as i32)
    }

    /// True for matchable colours
    #[inline]
    pub fn is_ordinary(self) -> bool {
        matches!(self, BubbleKind::Color(_))
    }

    /// Display colour for this kind
    pub fn color(self) -> u32 {
        match self {
            BubbleKind::Color(i) => COLOR_TABLE[(i % COLOR_COUNT) as usize],
            BubbleKind::Junk => 0xFF000000,
            BubbleKind::PowerUp => 0xFFC000C0,
            BubbleKind::Bomb => 0xFF1F75E6,
            BubbleKind::Star => 0xFF24C5F5,
            BubbleKind::Paint => 0xFF9A5CF5,
            BubbleKind::Mirror => 0xFFCCCCCC,
            BubbleKind::Chest => 0xFF3C64A8,
        }
    }
}

/// Every ordinary colour, in palette order
pub fn all_colors() -> Vec<BubbleKind> {
    (0..COLOR_COUNT).map(BubbleKind::Color).collect()
}

/// Ordinary colours allowed on a single-player stage
pub fn stage_colors(stage: u32) -> Vec<BubbleKind> {
    let count = match stage {
        1 => 2,
        2 => 3,
        _ => COLOR_COUNT,
    };
    (0..count).map(BubbleKind::Color).collect()
}

/// A bubble on the board or in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bubble {
    pub id: BubbleId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Display colour, follows `kind`
    pub color: u32,
    pub kind: BubbleKind,
}

impl Bubble {
    pub fn new(id: BubbleId, kind: BubbleKind, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            radius: BUBBLE_RADIUS,
            color: kind.color(),
            kind,
        }
    }

    /// Change kind and display colour together
    pub fn recolor(&mut self, kind: BubbleKind) {
        self.kind = kind;
        self.color = kind.color();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip() {
        let kinds = [
            BubbleKind::Color(0),
            BubbleKind::Color(3),
            BubbleKind::Junk,
            BubbleKind::PowerUp,
            BubbleKind::Bomb,
            BubbleKind::Star,
            BubbleKind::Paint,
            BubbleKind::Mirror,
            BubbleKind::Chest,
        ];
        for kind in kinds {
            assert_eq!(BubbleKind::from_code(kind.code()), Some(kind));
            assert_eq!(BubbleKind::from_byte(kind.to_byte()), Some(kind));
        }
        assert_eq!(BubbleKind::from_code(-99), None);
        assert_eq!(BubbleKind::from_code(4), None);
    }

    #[test]
    fn test_negative_codes_wrap_to_high_bytes() {
        assert_eq!(BubbleKind::Bomb.to_byte(), 253);
        assert_eq!(BubbleKind::Junk.to_byte(), 255);
    }

    #[test]
    fn test_stage_colors() {
        assert_eq!(stage_colors(1).len(), 2);
        assert_eq!(stage_colors(2).len(), 3);
        assert_eq!(stage_colors(9).len(), 4);
    }

    #[test]
    fn test_recolor_updates_display_color() {
        let mut bubble = Bubble::new(BubbleId(1), BubbleKind::Mirror, Vec2::ZERO);
        bubble.recolor(BubbleKind::Color(2));
        assert_eq!(bubble.color, COLOR_TABLE[2]);
        assert!(bubble.kind.is_ordinary());
    }
}
