use serde::{Deserialize, Serialize};

/// Upper bound accepted for the debounce delay.
pub const MAX_DEBOUNCE_MS: u64 = 10_000;

/// Top-level coordinator settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CoordinatorSettings {
    /// Quiet period before a scheduled rebuild and broadcast runs.
    pub debounce_ms: u64,
    pub overlay: OverlaySettings,
    /// Re-read the host's pin state before toggling instead of trusting the
    /// flag supplied by the page.
    pub reread_pin_state: bool,
    pub bridge: BridgeSettings,
    pub logging: LoggingSettings,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 80,
            overlay: OverlaySettings::default(),
            reread_pin_state: false,
            bridge: BridgeSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Resources injected into pages and the marker the presence probe looks for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OverlaySettings {
    pub script: String,
    pub style: String,
    pub marker_element_id: String,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            script: "overlay.js".to_string(),
            style: "overlay.css".to_string(),
            marker_element_id: "__tinyTabRail__rail".to_string(),
        }
    }
}

/// Stdio bridge settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BridgeSettings {
    pub request_timeout_ms: u64,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self { request_timeout_ms: 5000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct LoggingSettings {
    pub debug: bool,
}
