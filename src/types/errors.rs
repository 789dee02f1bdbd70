use std::fmt;

use super::tab::TabId;

// === HostError ===

/// Errors surfaced by the browser host when querying or mutating tabs,
/// messaging pages or injecting into them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The page has no listening overlay (closed, navigated, never injected).
    NoReceiver(TabId),
    /// The host has no tab with the given ID.
    NoSuchTab(TabId),
    /// The host forbids scripting on the page.
    Restricted(String),
    /// The host service is not ready or refused the call.
    Unavailable(String),
    /// The host did not answer within the bridge timeout.
    Timeout(String),
    /// The connection to the host is gone.
    Disconnected,
    /// The host answered with something that could not be decoded.
    Protocol(String),
}

impl HostError {
    /// Routine failures are expected during normal operation (pages come and
    /// go) and are never reported above debug level.
    pub fn is_routine(&self) -> bool {
        matches!(
            self,
            HostError::NoReceiver(_) | HostError::NoSuchTab(_) | HostError::Restricted(_)
        )
    }

    /// Classifies an error string reported by the host for a request that
    /// targeted `tab_id`.
    pub fn from_host_message(tab_id: Option<TabId>, message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        if lower.contains("receiving end does not exist")
            || lower.contains("could not establish connection")
        {
            if let Some(id) = tab_id {
                return HostError::NoReceiver(id);
            }
        }
        if lower.contains("no tab with id") {
            if let Some(id) = tab_id {
                return HostError::NoSuchTab(id);
            }
        }
        if lower.contains("cannot access")
            || lower.contains("cannot be scripted")
            || lower.contains("chrome://")
            || lower.contains("permission")
        {
            return HostError::Restricted(message.to_string());
        }
        HostError::Unavailable(message.to_string())
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::NoReceiver(id) => write!(f, "No receiver in tab: {}", id),
            HostError::NoSuchTab(id) => write!(f, "No such tab: {}", id),
            HostError::Restricted(msg) => write!(f, "Restricted page: {}", msg),
            HostError::Unavailable(msg) => write!(f, "Host unavailable: {}", msg),
            HostError::Timeout(method) => write!(f, "Host request timed out: {}", method),
            HostError::Disconnected => write!(f, "Host disconnected"),
            HostError::Protocol(msg) => write!(f, "Host protocol error: {}", msg),
        }
    }
}

impl std::error::Error for HostError {}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

// === ProtocolError ===

/// Errors decoding lines received over the stdio bridge.
#[derive(Debug, PartialEq, Eq)]
pub enum ProtocolError {
    /// The line is not a JSON object.
    MalformedLine(String),
    /// The `event` name is not one the coordinator subscribes to.
    UnknownEvent(String),
    /// A field required by the message kind is absent or mistyped.
    MissingField(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::MalformedLine(msg) => write!(f, "Malformed bridge line: {}", msg),
            ProtocolError::UnknownEvent(name) => write!(f, "Unknown bridge event: {}", name),
            ProtocolError::MissingField(field) => {
                write!(f, "Missing or invalid field: {}", field)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}
