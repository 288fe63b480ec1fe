//! Configuration management for paneltty

mod console;
mod panel;
pub mod serde_utils;

pub use console::ConsoleConfig;
pub use panel::PanelConfig;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Get the default configuration directory
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("paneltty")
}

/// Get the default configuration file path
pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// On-disk configuration file layout
///
/// ```toml
/// [panel]
/// url = "https://panel.example.com"
/// api_key = "ptlc_..."
///
/// [console]
/// debounce_ms = 50
/// exit_token = "!exit"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Panel connection settings
    pub panel: PanelConfig,
    /// Interactive console settings
    pub console: ConsoleConfig,
}

impl ConfigFile {
    /// Load from `path`, or from the default location if `path` is `None`.
    ///
    /// A missing file at the default location yields the defaults; a missing
    /// file that was asked for explicitly is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => load_config(path),
            None => {
                let default_path = default_config_path();
                if default_path.exists() {
                    load_config(&default_path)
                } else {
                    tracing::debug!("No config at {:?}, using defaults", default_path);
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Load configuration from a file
pub fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config: {}", e)))?;

    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to a file
pub fn save_config<T: serde::Serialize>(path: &Path, config: &T) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(config)?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ConfigError::Invalid(format!("Failed to create config dir: {}", e)))?;
    }

    std::fs::write(path, content)
        .map_err(|e| ConfigError::Invalid(format!("Failed to write config: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[panel]
url = "https://panel.example.com"
api_key = "ptlc_abc"

[console]
debounce_ms = 80
"#,
        )
        .unwrap();

        let config: ConfigFile = load_config(&path).unwrap();
        assert_eq!(config.panel.url, "https://panel.example.com");
        assert_eq!(config.console.debounce, Duration::from_millis(80));
        assert_eq!(config.console.exit_token, "!exit");
        assert_eq!(config.panel.request_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ConfigFile::default();
        config.panel.url = "https://panel.test".to_string();
        config.console.prompt = "$ ".to_string();
        save_config(&path, &config).unwrap();

        let loaded: ConfigFile = load_config(&path).unwrap();
        assert_eq!(loaded.panel.url, "https://panel.test");
        assert_eq!(loaded.console.prompt, "$ ");
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        assert!(matches!(
            ConfigFile::load_or_default(Some(&path)),
            Err(ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[panel\nurl = ").unwrap();
        assert!(matches!(
            load_config::<ConfigFile>(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
