//! Panel connection configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::duration_secs;
use crate::error::ConfigError;

/// Where the panel lives and how to authenticate against it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Base URL of the panel (e.g. `https://panel.example.com`)
    pub url: String,

    /// Client API key (`ptlc_...`)
    pub api_key: String,

    /// Timeout for each HTTP request
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            request_timeout: Duration::from_secs(15),
        }
    }
}

impl PanelConfig {
    /// Check that the fields needed to talk to the panel are present
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::MissingField("panel.url".to_string()));
        }
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingField("panel.api_key".to_string()));
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "panel.url must start with http:// or https://, got {}",
                self.url
            )));
        }
        Ok(())
    }

    /// Panel URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}
