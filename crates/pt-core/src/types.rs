//! Core domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Short identifier of a server on the panel
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerId(pub String);

impl ServerId {
    /// Create a new server ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw ID string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ServerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ServerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One-time connection descriptor for a console session
///
/// Created once per session by the token broker and consumed by the
/// connection open step. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionDescriptor {
    /// WebSocket endpoint of the daemon
    pub endpoint: String,
    /// Short-lived access token sent in the `auth` frame
    pub token: String,
}

impl fmt::Debug for SessionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionDescriptor")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Resource limits of a server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerLimits {
    /// Memory limit in MiB (0 = unlimited)
    pub memory: u64,
    /// Disk limit in MiB (0 = unlimited)
    pub disk: u64,
    /// CPU limit in percent (0 = unlimited)
    pub cpu: u64,
}

/// A server as listed by the panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSummary {
    /// Short identifier used in API paths
    pub identifier: String,
    /// Full UUID
    #[serde(default)]
    pub uuid: String,
    /// Display name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub description: String,
    /// Node the server runs on
    #[serde(default)]
    pub node: String,
    /// Whether the server is suspended
    #[serde(default)]
    pub is_suspended: bool,
    /// Resource limits
    #[serde(default)]
    pub limits: ServerLimits,
}

impl ServerSummary {
    /// Identifier as a typed ID
    pub fn id(&self) -> ServerId {
        ServerId::new(self.identifier.clone())
    }
}

/// Live resource usage counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceCounters {
    /// Resident memory in bytes
    pub memory_bytes: u64,
    /// CPU usage in percent of one core
    pub cpu_absolute: f64,
    /// Disk usage in bytes
    pub disk_bytes: u64,
    /// Bytes received
    pub network_rx_bytes: u64,
    /// Bytes sent
    pub network_tx_bytes: u64,
    /// Uptime in milliseconds
    pub uptime: u64,
}

/// Power state plus resource usage of a server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceUsage {
    /// Power state (`running`, `offline`, `starting`, `stopping`)
    pub current_state: String,
    /// Whether the server is suspended
    #[serde(default)]
    pub is_suspended: bool,
    /// Counters
    #[serde(default)]
    pub resources: ResourceCounters,
}

/// Power signal accepted by the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerSignal {
    /// Start the server
    Start,
    /// Graceful stop
    Stop,
    /// Stop then start
    Restart,
    /// Terminate immediately
    Kill,
}

impl PowerSignal {
    /// Wire name of the signal
    pub fn as_str(&self) -> &'static str {
        match self {
            PowerSignal::Start => "start",
            PowerSignal::Stop => "stop",
            PowerSignal::Restart => "restart",
            PowerSignal::Kill => "kill",
        }
    }
}

impl fmt::Display for PowerSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerSignal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(PowerSignal::Start),
            "stop" => Ok(PowerSignal::Stop),
            "restart" => Ok(PowerSignal::Restart),
            "kill" => Ok(PowerSignal::Kill),
            other => Err(format!(
                "unknown power signal '{}' (expected start, stop, restart or kill)",
                other
            )),
        }
    }
}

/// An entry in a server's file tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// File name (no directory part)
    pub name: String,
    /// Unix mode string (e.g. `-rw-r--r--`)
    #[serde(default)]
    pub mode: String,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    /// Regular file (false for directories)
    #[serde(default)]
    pub is_file: bool,
    /// Symbolic link
    #[serde(default)]
    pub is_symlink: bool,
    /// Detected MIME type
    #[serde(default)]
    pub mimetype: String,
    /// Last modification time (RFC 3339)
    #[serde(default)]
    pub modified_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_signal_parse_is_case_insensitive() {
        assert_eq!("Restart".parse::<PowerSignal>(), Ok(PowerSignal::Restart));
        assert_eq!(" kill ".parse::<PowerSignal>(), Ok(PowerSignal::Kill));
        assert!("reboot".parse::<PowerSignal>().is_err());
    }

    #[test]
    fn test_power_signal_serializes_lowercase() {
        let json = serde_json::to_string(&PowerSignal::Stop).unwrap();
        assert_eq!(json, r#""stop""#);
    }

    #[test]
    fn test_descriptor_debug_redacts_token() {
        let descriptor = SessionDescriptor {
            endpoint: "wss://node.example:8080/api/servers/abc/ws".to_string(),
            token: "secret-jwt".to_string(),
        };
        let debug = format!("{:?}", descriptor);
        assert!(debug.contains("wss://node.example"));
        assert!(!debug.contains("secret-jwt"));
    }

    #[test]
    fn test_server_summary_tolerates_missing_fields() {
        let server: ServerSummary =
            serde_json::from_str(r#"{"identifier":"1a2b3c4d","name":"Survival"}"#).unwrap();
        assert_eq!(server.id(), ServerId::from("1a2b3c4d"));
        assert_eq!(server.limits.memory, 0);
    }
}
