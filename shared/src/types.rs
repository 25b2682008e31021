use serde::{Deserialize, Serialize};

/// A wakeable machine on the local network.
/// This is the canonical data model used by the daemon's store, API, and front ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    /// Unique identifier, assigned as 1 + the highest existing id
    pub id: u64,

    /// Human-readable name, e.g. "Desktop"
    pub name: String,

    /// IPv4 address in dotted-quad form
    pub ip: String,

    /// Hardware address, absent until the first successful resolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
}

/// Request body for add and update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub ip: String,
}

/// Uniform result shape returned by every registry operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<Host>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OpResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            host: None,
            message: None,
            error: None,
        }
    }

    pub fn with_host(host: Host) -> Self {
        Self {
            host: Some(host),
            ..Self::ok()
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            host: None,
            message: None,
            error: Some(error.into()),
        }
    }
}
