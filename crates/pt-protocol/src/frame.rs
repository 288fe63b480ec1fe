//! Frame encoding/decoding
//!
//! Every message on the console socket is a single JSON text frame:
//!
//! ```text
//! {"event": "<kind>", "args": [<value>, ...]}
//! ```
//!
//! `args` is a free-form argument list. The daemon sends strings for every
//! event the console cares about, but other events (`stats`) carry JSON
//! encoded as a string, so arguments are kept as raw JSON values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;

/// Maximum frame size accepted by [`Frame::parse`] (1MB)
pub const MAX_FRAME_SIZE: usize = 1024 * 1024;

/// A decoded console socket frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Event kind tag
    pub event: String,
    /// Argument list (may be absent on the wire)
    #[serde(default)]
    pub args: Vec<Value>,
}

impl Frame {
    /// Create a frame whose arguments are all strings
    pub fn new(event: impl Into<String>, args: impl IntoIterator<Item = String>) -> Self {
        Self {
            event: event.into(),
            args: args.into_iter().map(Value::String).collect(),
        }
    }

    /// Parse a frame from raw socket text
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        if raw.len() > MAX_FRAME_SIZE {
            return Err(ProtocolError::FrameTooLarge {
                size: raw.len(),
                max: MAX_FRAME_SIZE,
            });
        }
        let value: Value = serde_json::from_str(raw)?;
        if !value.is_object() {
            return Err(ProtocolError::NotAnObject);
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Encode the frame as socket text
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Get argument `index` if it is a string
    pub fn text_arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).and_then(Value::as_str)
    }
}
