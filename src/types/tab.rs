use std::fmt;

use serde::{Deserialize, Serialize};

/// Host-assigned tab identifier. Unique within a browser session and stable
/// until the tab closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host-assigned window identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u64);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One open tab, exactly as the host reports it.
///
/// Field names on the wire follow the host's tab object so records can be
/// passed through to overlay pages unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabRecord {
    pub id: TabId,
    pub window_id: WindowId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, rename = "favIconUrl", skip_serializing_if = "Option::is_none")]
    pub fav_icon_url: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub pinned: bool,
}

/// A host window together with its tabs in strip order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostWindow {
    pub id: WindowId,
    #[serde(default)]
    pub tabs: Vec<TabRecord>,
}

/// Mutation applied to a single tab. Unset fields are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
}

impl TabUpdate {
    pub fn activate() -> Self {
        Self { active: Some(true), pinned: None }
    }

    pub fn pinned(pinned: bool) -> Self {
        Self { active: None, pinned: Some(pinned) }
    }
}

/// All tabs across all windows at one instant, in window order then strip order.
///
/// A snapshot is always a full replacement for the previous one; there is
/// no delta form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    tabs: Vec<TabRecord>,
}

impl Snapshot {
    pub fn new(tabs: Vec<TabRecord>) -> Self {
        Self { tabs }
    }

    /// Flattens host windows into a single ordered sequence.
    pub fn from_windows(windows: Vec<HostWindow>) -> Self {
        Self {
            tabs: windows.into_iter().flat_map(|w| w.tabs).collect(),
        }
    }

    pub fn tabs(&self) -> &[TabRecord] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn get(&self, tab_id: TabId) -> Option<&TabRecord> {
        self.tabs.iter().find(|t| t.id == tab_id)
    }

    pub fn ids(&self) -> Vec<TabId> {
        self.tabs.iter().map(|t| t.id).collect()
    }

    /// Tabs belonging to one window, in order.
    pub fn window_tabs(&self, window_id: WindowId) -> Vec<TabRecord> {
        self.tabs
            .iter()
            .filter(|t| t.window_id == window_id)
            .cloned()
            .collect()
    }
}
