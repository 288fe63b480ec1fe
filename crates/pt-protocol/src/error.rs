//! Protocol error types

use thiserror::Error;

/// Errors that can occur during protocol operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Frame is not valid JSON, or lacks an `event` tag
    #[error("Malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Frame is valid JSON but not an object
    #[error("Malformed frame: expected a JSON object")]
    NotAnObject,

    /// Frame exceeds maximum size
    #[error("Frame too large: {size} bytes exceeds maximum of {max} bytes")]
    FrameTooLarge { size: usize, max: usize },
}
