//! Peer link boundary
//!
//! Outbound frames go through a [`PeerLink`]. Inbound frames may arrive on a
//! transport thread, so they are decoded into [`PeerEvent`]s and queued on a
//! crossbeam channel; the session drains the [`Inbox`] once per tick.

use std::fmt;

use crossbeam_channel::{Receiver, Sender};

use super::protocol::{Message, MessageKind, PayloadAction, ProtocolError};
use super::snapshot::BoardSnapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The other end is gone
    Closed,
    /// Send failed for a transport-specific reason
    Failed(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "peer link closed"),
            Self::Failed(reason) => write!(f, "send failed: {reason}"),
        }
    }
}

impl std::error::Error for TransportError {}

/// Outbound half of a framed duplex channel
pub trait PeerLink {
    fn send(&mut self, frame: Vec<u8>) -> Result<(), TransportError>;
}

/// Link that drops everything (offline play)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLink;

impl PeerLink for NullLink {
    fn send(&mut self, _frame: Vec<u8>) -> Result<(), TransportError> {
        Ok(())
    }
}

/// A decoded inbound message
#[derive(Debug, Clone, PartialEq)]
pub enum PeerEvent {
    Attack(u32),
    OpponentBoard(BoardSnapshot),
    Control(PayloadAction),
    /// The transport reported a failure or the peer went away
    Disconnected,
}

impl PeerEvent {
    pub fn from_message(message: &Message) -> Result<Self, ProtocolError> {
        match message.kind {
            MessageKind::Attack => Ok(Self::Attack(message.attack_rows()?)),
            MessageKind::GameStateUpdate => {
                Ok(Self::OpponentBoard(BoardSnapshot::decode(&message.payload.data)?))
            }
            MessageKind::MatchControl => Ok(Self::Control(message.payload.action)),
        }
    }
}

/// Single-consumer queue of inbound events
#[derive(Debug)]
pub struct Inbox {
    rx: Receiver<PeerEvent>,
}

impl Inbox {
    /// Everything queued so far, in arrival order
    pub fn drain(&self) -> Vec<PeerEvent> {
        self.rx.try_iter().collect()
    }
}

/// Producer side handed to the transport
#[derive(Debug, Clone)]
pub struct InboxSender {
    tx: Sender<PeerEvent>,
}

impl InboxSender {
    /// Decode a raw frame and queue it
    ///
    /// Malformed frames are rejected whole; nothing is queued for them.
    pub fn deliver_frame(&self, frame: &[u8]) -> Result<(), ProtocolError> {
        let event = Message::decode(frame).and_then(|m| PeerEvent::from_message(&m));
        match event {
            Ok(event) => {
                self.push(event);
                Ok(())
            }
            Err(err) => {
                log::warn!("Dropping malformed peer frame: {err}");
                Err(err)
            }
        }
    }

    /// Report a transport failure to the session
    pub fn report_disconnect(&self) {
        self.push(PeerEvent::Disconnected);
    }

    fn push(&self, event: PeerEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

/// Create a connected sender/inbox pair
pub fn inbox() -> (InboxSender, Inbox) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (InboxSender { tx }, Inbox { rx })
}

/// In-process link that delivers straight into a peer's inbox
#[derive(Debug, Clone)]
pub struct ChannelLink {
    peer: InboxSender,
}

impl ChannelLink {
    pub fn new(peer: InboxSender) -> Self {
        Self { peer }
    }
}

impl PeerLink for ChannelLink {
    fn send(&mut self, frame: Vec<u8>) -> Result<(), TransportError> {
        let event = Message::decode(&frame)
            .and_then(|m| PeerEvent::from_message(&m))
            .map_err(|e| TransportError::Failed(e.to_string()))?;
        if self.peer.push(event) {
            Ok(())
        } else {
            Err(TransportError::Closed)
        }
    }
}
