//! Wire protocol for peer messages
//!
//! Frame: `[kind:1][action:1][len:4 LE i32][data:len]`. Frames arrive already
//! delimited by the transport, so a frame must be consumed exactly.

use std::fmt;

/// Message kinds (first byte of every frame)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageKind {
    /// Junk-row attack
    Attack = 0,
    /// Board preview for the opponent
    GameStateUpdate = 1,
    /// Round / match flow
    MatchControl = 2,
}

impl MessageKind {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Attack),
            1 => Some(Self::GameStateUpdate),
            2 => Some(Self::MatchControl),
            _ => None,
        }
    }
}

/// Action codes carried inside a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PayloadAction {
    SendJunkRows = 0,
    /// Sender lost the round
    UpdateScore = 1,
    OpponentBoardState = 2,
    Ready = 3,
    Rematch = 4,
    Disconnect = 5,
}

impl PayloadAction {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::SendJunkRows),
            1 => Some(Self::UpdateScore),
            2 => Some(Self::OpponentBoardState),
            3 => Some(Self::Ready),
            4 => Some(Self::Rematch),
            5 => Some(Self::Disconnect),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Zero-length frame
    EmptyFrame,
    UnknownKind(u8),
    UnknownAction(u8),
    /// Fewer bytes than a header or length field promised
    Truncated { needed: usize, available: usize },
    NegativeLength(i32),
    /// Bytes left over after the declared payload
    TrailingBytes(usize),
    /// Attack data is not a single non-negative i32
    MalformedAttack,
    /// Board snapshot count and length disagree
    MalformedBoard,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFrame => write!(f, "empty frame"),
            Self::UnknownKind(v) => write!(f, "unknown message kind {v}"),
            Self::UnknownAction(v) => write!(f, "unknown payload action {v}"),
            Self::Truncated { needed, available } => {
                write!(f, "truncated frame: need {needed} bytes, have {available}")
            }
            Self::NegativeLength(len) => write!(f, "negative payload length {len}"),
            Self::TrailingBytes(n) => write!(f, "{n} trailing bytes after payload"),
            Self::MalformedAttack => write!(f, "malformed attack payload"),
            Self::MalformedBoard => write!(f, "malformed board snapshot"),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Action plus optional raw data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub action: PayloadAction,
    /// Empty when the action carries no data
    pub data: Vec<u8>,
}

impl Payload {
    /// Size of action byte plus length field
    pub const HEADER_SIZE: usize = 5;

    pub fn new(action: PayloadAction, data: Vec<u8>) -> Self {
        Self { action, data }
    }

    pub fn bare(action: PayloadAction) -> Self {
        Self::new(action, Vec::new())
    }

    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.reserve(Self::HEADER_SIZE + self.data.len());
        buf.push(self.action as u8);
        buf.extend_from_slice(&(self.data.len() as i32).to_le_bytes());
        buf.extend_from_slice(&self.data);
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode_into(&mut buf);
        buf
    }

    /// Decode a payload that must fill `buf` exactly
    pub fn decode(buf: &[u8]) -> Result<Self, ProtocolError> {
        if buf.len() < Self::HEADER_SIZE {
            return Err(ProtocolError::Truncated {
                needed: Self::HEADER_SIZE,
                available: buf.len(),
            });
        }
        let action = PayloadAction::from_u8(buf[0]).ok_or(ProtocolError::UnknownAction(buf[0]))?;
        let len = i32::from_le_bytes([buf[1], buf[2], buf[3], buf[4]]);
        if len < 0 {
            return Err(ProtocolError::NegativeLength(len));
        }
        let rest = &buf[Self::HEADER_SIZE..];
        let len = len as usize;
        if rest.len() < len {
            return Err(ProtocolError::Truncated {
                needed: Self::HEADER_SIZE + len,
                available: buf.len(),
            });
        }
        if rest.len() > len {
            return Err(ProtocolError::TrailingBytes(rest.len() - len));
        }
        Ok(Self::new(action, rest.to_vec()))
    }
}

/// One framed message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub payload: Payload,
}

impl Message {
    pub fn attack(rows: u32) -> Self {
        let rows = rows.min(i32::MAX as u32) as i32;
        Self {
            kind: MessageKind::Attack,
            payload: Payload::new(PayloadAction::SendJunkRows, rows.to_le_bytes().to_vec()),
        }
    }

    pub fn board_state(snapshot: Vec<u8>) -> Self {
        Self {
            kind: MessageKind::GameStateUpdate,
            payload: Payload::new(PayloadAction::OpponentBoardState, snapshot),
        }
    }

    pub fn control(action: PayloadAction) -> Self {
        Self {
            kind: MessageKind::MatchControl,
            payload: Payload::bare(action),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = vec![self.kind as u8];
        self.payload.encode_into(&mut buf);
        buf
    }

    pub fn decode(frame: &[u8]) -> Result<Self, ProtocolError> {
        let (&kind, rest) = frame.split_first().ok_or(ProtocolError::EmptyFrame)?;
        let kind = MessageKind::from_u8(kind).ok_or(ProtocolError::UnknownKind(kind))?;
        Ok(Self {
            kind,
            payload: Payload::decode(rest)?,
        })
    }

    /// Junk-row count of an attack payload
    pub fn attack_rows(&self) -> Result<u32, ProtocolError> {
        let data: [u8; 4] = self
            .payload
            .data
            .as_slice()
            .try_into()
            .map_err(|_| ProtocolError::MalformedAttack)?;
        u32::try_from(i32::from_le_bytes(data)).map_err(|_| ProtocolError::MalformedAttack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attack_frame_layout() {
        let bytes = Message::attack(7).encode();
        assert_eq!(bytes, vec![0, 0, 4, 0, 0, 0, 7, 0, 0, 0]);

        let decoded = Message::decode(&bytes).unwrap();
        assert_eq!(decoded.kind, MessageKind::Attack);
        assert_eq!(decoded.attack_rows(), Ok(7));
    }

    #[test]
    fn test_bare_control_has_zero_length() {
        let bytes = Message::control(PayloadAction::Rematch).encode();
        assert_eq!(bytes, vec![2, 4, 0, 0, 0, 0]);
        let decoded = Message::decode(&bytes).unwrap();
        assert_eq!(decoded.payload.action, PayloadAction::Rematch);
        assert!(decoded.payload.data.is_empty());
    }

    #[test]
    fn test_truncated_payload_rejected() {
        let mut bytes = Message::board_state(vec![1, 2, 3, 4, 5]).encode();
        bytes.pop();
        assert!(matches!(
            Message::decode(&bytes),
            Err(ProtocolError::Truncated { .. })
        ));
        assert!(matches!(
            Message::decode(&[1, 2, 0]),
            Err(ProtocolError::Truncated { .. })
        ));
    }

    #[test]
    fn test_inconsistent_lengths_rejected() {
        assert_eq!(
            Payload::decode(&[0, 0xFF, 0xFF, 0xFF, 0xFF]),
            Err(ProtocolError::NegativeLength(-1))
        );
        assert_eq!(
            Payload::decode(&[3, 0, 0, 0, 0, 9]),
            Err(ProtocolError::TrailingBytes(1))
        );
    }

    #[test]
    fn test_unknown_bytes_rejected() {
        assert_eq!(Message::decode(&[]), Err(ProtocolError::EmptyFrame));
        assert_eq!(
            Message::decode(&[9, 0, 0, 0, 0, 0]),
            Err(ProtocolError::UnknownKind(9))
        );
        assert_eq!(
            Message::decode(&[0, 42, 0, 0, 0, 0]),
            Err(ProtocolError::UnknownAction(42))
        );
    }

    #[test]
    fn test_malformed_attack_data() {
        let short = Message {
            kind: MessageKind::Attack,
            payload: Payload::new(PayloadAction::SendJunkRows, vec![1, 0]),
        };
        assert_eq!(short.attack_rows(), Err(ProtocolError::MalformedAttack));

        let negative = Message {
            kind: MessageKind::Attack,
            payload: Payload::new(PayloadAction::SendJunkRows, (-3i32).to_le_bytes().to_vec()),
        };
        assert_eq!(negative.attack_rows(), Err(ProtocolError::MalformedAttack));
    }
}
