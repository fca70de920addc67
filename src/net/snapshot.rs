//! Board preview codec
//!
//! `[count:4 LE i32]` then per bubble `[x:4 LE f32][y:4 LE f32][kind:1]`.
//! Previews are lossy and never fed back into a simulation.

use glam::Vec2;

use super::protocol::ProtocolError;
use crate::sim::{Bubble, BubbleKind};

const BUBBLE_SIZE: usize = 9;

/// Serialize a board for the opponent's preview
pub fn encode(bubbles: &[Bubble]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(4 + bubbles.len() * BUBBLE_SIZE);
    buf.extend_from_slice(&(bubbles.len() as i32).to_le_bytes());
    for bubble in bubbles {
        buf.extend_from_slice(&bubble.pos.x.to_le_bytes());
        buf.extend_from_slice(&bubble.pos.y.to_le_bytes());
        buf.push(bubble.kind.to_byte());
    }
    buf
}

/// One bubble of a decoded preview
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapshotBubble {
    pub pos: Vec2,
    /// Raw kind byte as sent
    pub kind_byte: u8,
}

impl SnapshotBubble {
    /// `None` for a kind byte this build does not know
    pub fn kind(&self) -> Option<BubbleKind> {
        BubbleKind::from_byte(self.kind_byte)
    }
}

/// Opponent board as last received
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardSnapshot {
    pub bubbles: Vec<SnapshotBubble>,
}

impl BoardSnapshot {
    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        let Some((count, body)) = buf.split_first_chunk::<4>() else {
            return Err(ProtocolError::MalformedBoard);
        };
        let count = usize::try_from(i32::from_le_bytes(*count)).map_err(|_| ProtocolError::MalformedBoard)?;
        if body.len() != count * BUBBLE_SIZE {
            return Err(ProtocolError::MalformedBoard);
        }

        let bubbles = body
            .chunks_exact(BUBBLE_SIZE)
            .map(|c| SnapshotBubble {
                pos: Vec2::new(
                    f32::from_le_bytes([c[0], c[1], c[2], c[3]]),
                    f32::from_le_bytes([c[4], c[5], c[6], c[7]]),
                ),
                kind_byte: c[8],
            })
            .collect();
        Ok(Self { bubbles })
    }

    pub fn len(&self) -> usize {
        self.bubbles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bubbles.is_empty()
    }
}
