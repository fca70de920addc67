//! Session phases and per-tick output types
//!
//! Everything a host needs to draw one frame besides the board itself.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bubble::Bubble;
use crate::consts::{DROP_DURATION, POP_DURATION};

/// Current phase of a single-player session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for new game / continue
    #[default]
    MainMenu,
    /// Active gameplay
    InGame,
    /// Game is paused
    Paused,
    /// Board cleared, waiting for the player to continue
    StageCleared,
    /// Run ended
    GameOver,
}

/// Animation flavour for a batch of removed bubbles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationKind {
    Pop,
    Drop,
}

impl AnimationKind {
    /// Duration hint in seconds
    pub fn duration(self) -> f32 {
        match self {
            AnimationKind::Pop => POP_DURATION,
            AnimationKind::Drop => DROP_DURATION,
        }
    }
}

/// Bubbles removed together, for the host to animate
#[derive(Debug, Clone)]
pub struct AnimationBatch {
    pub kind: AnimationKind,
    pub bubbles: Vec<Bubble>,
    pub duration: f32,
}

impl AnimationBatch {
    pub fn new(kind: AnimationKind, bubbles: Vec<Bubble>) -> Self {
        Self {
            kind,
            bubbles,
            duration: kind.duration(),
        }
    }
}

/// How a floating text behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    /// Drifts upward while fading (score popups)
    FloatAndFade,
    /// Stays put and fades (bonus banners)
    FadeOut,
}

/// A floating text popup in board units
#[derive(Debug, Clone, PartialEq)]
pub struct TextCue {
    pub text: String,
    pub pos: Vec2,
    /// ABGR display colour
    pub color: u32,
    pub duration: f32,
    pub style: TextStyle,
    pub scale: f32,
}

impl TextCue {
    /// Small score popup
    pub fn score(text: impl Into<String>, pos: Vec2, color: u32) -> Self {
        Self {
            text: text.into(),
            pos,
            color,
            duration: 0.7,
            style: TextStyle::FloatAndFade,
            scale: 1.0,
        }
    }

    /// Large stationary banner
    pub fn banner(text: impl Into<String>, pos: Vec2, color: u32, duration: f32) -> Self {
        Self {
            text: text.into(),
            pos,
            color,
            duration,
            style: TextStyle::FadeOut,
            scale: 1.8,
        }
    }
}

/// Side effects produced during one tick, drained by the host
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub animations: Vec<AnimationBatch>,
    pub texts: Vec<TextCue>,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.animations.is_empty() && self.texts.is_empty()
    }

    /// Bubbles in all batches of one kind
    pub fn count(&self, kind: AnimationKind) -> usize {
        self.animations
            .iter()
            .filter(|a| a.kind == kind)
            .map(|a| a.bubbles.len())
            .sum()
    }

    pub(crate) fn push_batch(&mut self, kind: AnimationKind, bubbles: Vec<Bubble>) {
        if !bubbles.is_empty() {
            self.animations.push(AnimationBatch::new(kind, bubbles));
        }
    }

    pub(crate) fn merge(&mut self, other: TickReport) {
        self.animations.extend(other.animations);
        self.texts.extend(other.texts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bubble::{BubbleId, BubbleKind};

    #[test]
    fn test_empty_batches_are_skipped() {
        let mut report = TickReport::default();
        report.push_batch(AnimationKind::Pop, Vec::new());
        assert!(report.is_empty());

        let b = Bubble::new(BubbleId(1), BubbleKind::Color(0), Vec2::ZERO);
        report.push_batch(AnimationKind::Drop, vec![b.clone(), b]);
        assert_eq!(report.count(AnimationKind::Drop), 2);
        assert_eq!(report.animations[0].duration, DROP_DURATION);
    }
}
