//! Interactive console configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::{duration_millis, duration_secs};
use crate::error::ConfigError;

/// Settings for the interactive console session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Quiet period after the last output chunk before it is drawn
    #[serde(rename = "debounce_ms", with = "duration_millis")]
    pub debounce: Duration,

    /// Line that ends the session locally instead of being sent
    pub exit_token: String,

    /// Prompt drawn in front of the input line
    pub prompt: String,

    /// Timeout for the socket handshake
    #[serde(with = "duration_secs")]
    pub connect_timeout: Duration,

    /// How long to wait for the daemon to acknowledge a local close
    #[serde(rename = "close_grace_ms", with = "duration_millis")]
    pub close_grace: Duration,

    /// Send the panel URL as the socket `Origin` header (the daemon
    /// rejects connections from unknown origins)
    pub send_origin: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(50),
            exit_token: "!exit".to_string(),
            prompt: "> ".to_string(),
            connect_timeout: Duration::from_secs(10),
            close_grace: Duration::from_secs(2),
            send_origin: true,
        }
    }
}

impl ConsoleConfig {
    /// Check settings the session cannot run without
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.exit_token.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "console.exit_token must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
