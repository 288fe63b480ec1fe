//! Core error types for paneltty

use pt_protocol::ProtocolError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the paneltty ecosystem
#[derive(Error, Debug)]
pub enum PtError {
    /// Protocol error
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Panel API error
    #[error("Panel API error: {0}")]
    Api(#[from] ApiError),

    /// Console session error
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Panel HTTP API errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Panel could not be reached, timed out, or answered a descriptor
    /// request with a non-success status
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Panel rejected the request
    #[error("Request rejected ({status}): {detail}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// First error detail reported by the panel
        detail: String,
    },

    /// Response body did not have the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Request could not be built (bad URL, bad header value)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Console session errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Connection descriptor could not be acquired
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Socket-level failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Send attempted on a connection that is not open
    #[error("Connection closed")]
    ConnectionClosed,

    /// The local terminal could not be set up
    #[error("Terminal error: {0}")]
    Terminal(String),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),
}
