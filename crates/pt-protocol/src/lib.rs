//! pt-protocol: Wire protocol for the panel console socket
//!
//! This crate defines the JSON frames exchanged with the daemon's console
//! WebSocket and the classification of inbound frames into the handful of
//! events the console cares about.

pub mod error;
pub mod frame;
pub mod message;

pub use error::ProtocolError;
pub use frame::{Frame, MAX_FRAME_SIZE};
pub use message::{
    InboundMessage, OutboundMessage, EVENT_AUTH, EVENT_CONSOLE_OUTPUT, EVENT_SEND_COMMAND,
    EVENT_STATUS,
};
