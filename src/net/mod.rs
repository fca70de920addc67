//! Peer networking: wire codec and the transport boundary
//!
//! The raw transport is external. This module only frames, parses and
//! queues messages.

pub mod link;
pub mod protocol;
pub mod snapshot;

pub use link::{ChannelLink, Inbox, InboxSender, NullLink, PeerEvent, PeerLink, TransportError, inbox};
pub use protocol::{Message, MessageKind, Payload, PayloadAction, ProtocolError};
pub use snapshot::{BoardSnapshot, SnapshotBubble};
