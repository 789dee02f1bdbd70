use serde::{Deserialize, Serialize};

use super::tab::{Snapshot, TabId, WindowId};

/// Messages an overlay page sends to the coordinator.
///
/// Tagged by `type` on the wire, e.g. `{"type":"togglePin","tabId":2,"pinned":true}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PageMessage {
    /// Liveness plus request for the cached snapshot.
    GetTabsSnapshot,
    /// Liveness announced by a freshly started overlay; answered with a fresh snapshot.
    OverlayLoaded,
    /// Tabs of the sender's own window, freshly queried.
    #[serde(alias = "getTabs")]
    GetWindowTabs,
    #[serde(rename_all = "camelCase")]
    ActivateTab { tab_id: TabId },
    /// `pinned` is the caller's view of the current pin state.
    #[serde(rename_all = "camelCase")]
    TogglePin { tab_id: TabId, pinned: bool },
}

/// Messages the coordinator pushes to overlay pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CoordinatorMessage {
    TabsUpdated { tabs: Snapshot },
}

/// Reply to `getTabsSnapshot` and `overlayLoaded`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotResponse {
    pub tabs: Snapshot,
}

/// Reply to `getWindowTabs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowTabsResponse {
    pub tabs: Snapshot,
    pub window_id: Option<WindowId>,
}

/// The tab a page message originated from, as reported by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderTab {
    pub id: TabId,
    #[serde(default)]
    pub window_id: Option<WindowId>,
    #[serde(default)]
    pub url: Option<String>,
}
