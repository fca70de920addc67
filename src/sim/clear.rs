//! Clear results and scoring
//!
//! A `ClearResult` is built for one landing, blast or ceiling advance, folded
//! into the session and then dropped.

use super::bubble::{Bubble, BubbleKind};

/// Points per popped bubble
pub const POP_POINTS: u32 = 10;
/// Points per dropped bubble before the combo multiplier
pub const DROP_POINTS: u32 = 20;
/// Drops above this count start a combo
pub const COMBO_THRESHOLD: usize = 3;

/// Bubbles removed by one event
#[derive(Debug, Clone)]
pub struct ClearResult {
    /// Removed by matching or blasts
    pub popped: Vec<Bubble>,
    /// Removed because they lost ceiling support
    pub dropped: Vec<Bubble>,
    /// A power-up was cleared
    pub helper_line_activated: bool,
    base_score: u32,
    bonus_score: u32,
    combo_multiplier: u32,
}

impl Default for ClearResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ClearResult {
    pub fn new() -> Self {
        Self {
            popped: Vec::new(),
            dropped: Vec::new(),
            helper_line_activated: false,
            base_score: 0,
            bonus_score: 0,
            combo_multiplier: 1,
        }
    }

    /// Recompute the score from the current popped/dropped counts
    ///
    /// More than three drops multiply every drop by `dropped - 2`. The
    /// multiplier is already part of the bonus; it is reported for display.
    pub fn compute_score(&mut self) {
        let popped = self.popped.len() as u32;
        let dropped = self.dropped.len() as u32;

        self.base_score = popped * POP_POINTS;
        if self.dropped.len() > COMBO_THRESHOLD {
            self.combo_multiplier = dropped - 2;
            self.bonus_score = dropped * DROP_POINTS * self.combo_multiplier;
        } else {
            self.combo_multiplier = 1;
            self.bonus_score = dropped * DROP_POINTS;
        }
    }

    pub fn base_score(&self) -> u32 {
        self.base_score
    }

    pub fn bonus_score(&self) -> u32 {
        self.bonus_score
    }

    pub fn combo_multiplier(&self) -> u32 {
        self.combo_multiplier
    }

    pub fn total_score(&self) -> u32 {
        self.base_score + self.bonus_score
    }

    /// Popped plus dropped
    pub fn cleared_count(&self) -> usize {
        self.popped.len() + self.dropped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.popped.is_empty() && self.dropped.is_empty()
    }

    /// Any removed bubble of the given kind
    pub fn contains_kind(&self, kind: BubbleKind) -> bool {
        self.popped
            .iter()
            .chain(self.dropped.iter())
            .any(|b| b.kind == kind)
    }
}
