//! Message types for the console socket protocol
//!
//! This module maps raw socket text to the few events the console acts on,
//! and builds the frames the console sends.
//!
//! # Message Flow
//!
//! 1. Client opens the socket and sends `auth` with the descriptor token
//! 2. Daemon pushes `status` (power state) and `console output` frames
//! 3. Client sends one `send command` frame per submitted line
//! 4. Either side closes the socket
//!
//! Authentication is fire-and-forget: the client does not wait for the
//! daemon's `auth success` before sending commands.
//!
//! # Classification
//!
//! Inbound text is classified in order of precedence:
//!
//! 1. `status` frames are discarded
//! 2. `console output` frames forward their text argument
//! 3. Text that is not a frame at all (early boot output can precede the
//!    framing) is forwarded unchanged
//!
//! Any other well-formed frame is reported as [`InboundMessage::Other`] so
//! the caller can log and drop it.

use crate::frame::Frame;

/// Power state / heartbeat event
pub const EVENT_STATUS: &str = "status";
/// Console text pushed by the daemon
pub const EVENT_CONSOLE_OUTPUT: &str = "console output";
/// Client authentication
pub const EVENT_AUTH: &str = "auth";
/// Console command submitted by the client
pub const EVENT_SEND_COMMAND: &str = "send command";

/// Classified inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// Power state update
    Status,
    /// Console text to display
    ConsoleOutput(String),
    /// Unstructured text, displayed verbatim
    Raw(String),
    /// Well-formed frame with an event the console ignores
    Other {
        /// Event kind tag
        event: String,
    },
}

impl InboundMessage {
    /// Classify raw socket text
    pub fn classify(raw: &str) -> Self {
        let frame = match Frame::parse(raw) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::trace!("Treating unstructured frame as raw text: {}", e);
                return Self::Raw(raw.to_string());
            }
        };

        match frame.event.as_str() {
            EVENT_STATUS => Self::Status,
            EVENT_CONSOLE_OUTPUT => match frame.text_arg(0) {
                Some(text) => Self::ConsoleOutput(text.to_string()),
                None => Self::Raw(raw.to_string()),
            },
            _ => Self::Other { event: frame.event },
        }
    }

    /// Text this message contributes to the console, if any
    pub fn display_text(&self) -> Option<&str> {
        match self {
            Self::ConsoleOutput(text) | Self::Raw(text) => Some(text),
            Self::Status | Self::Other { .. } => None,
        }
    }
}

/// Outbound intents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    /// Authenticate the socket with the descriptor token
    Authenticate {
        /// Short-lived access token
        token: String,
    },
    /// Run a console command on the server
    SubmitCommand {
        /// Command line, already trimmed
        text: String,
    },
}

impl OutboundMessage {
    /// Build the wire frame for this intent
    pub fn to_frame(&self) -> Frame {
        match self {
            Self::Authenticate { token } => Frame::new(EVENT_AUTH, [token.clone()]),
            Self::SubmitCommand { text } => Frame::new(EVENT_SEND_COMMAND, [text.clone()]),
        }
    }

    /// Encode this intent as socket text
    pub fn encode(&self) -> String {
        // A frame of string arguments always serializes
        self.to_frame()
            .encode()
            .unwrap_or_else(|_| String::from("{}"))
    }
}
