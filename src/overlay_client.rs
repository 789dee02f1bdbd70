//! Overlay client state.
//!
//! The per-page half of the system, minus the DOM: it keeps the last
//! snapshot received, derives what the rail shows, turns user gestures into
//! intent messages, and decides when to ask the coordinator for a resync.

use serde_json::Value;

use crate::types::protocol::{CoordinatorMessage, PageMessage, SnapshotResponse};
use crate::types::tab::{Snapshot, TabId};

/// One icon on the rail.
#[derive(Debug, Clone, PartialEq)]
pub struct RailItem {
    pub tab_id: TabId,
    pub fav_icon_url: String,
    pub tooltip: String,
    pub active: bool,
    pub pinned: bool,
}

/// Rail contents: pinned tabs in their own group above the rest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RailView {
    pub pinned: Vec<RailItem>,
    pub others: Vec<RailItem>,
}

impl RailView {
    /// Tabs without a favicon are not shown.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let mut view = RailView::default();
        for tab in snapshot.tabs() {
            let Some(icon) = tab.fav_icon_url.as_deref().filter(|u| !u.is_empty()) else {
                continue;
            };
            let tooltip = if tab.title.is_empty() { tab.url.clone() } else { tab.title.clone() };
            let item = RailItem {
                tab_id: tab.id,
                fav_icon_url: icon.to_string(),
                tooltip,
                active: tab.active,
                pinned: tab.pinned,
            };
            if tab.pinned {
                view.pinned.push(item);
            } else {
                view.others.push(item);
            }
        }
        view
    }

    pub fn len(&self) -> usize {
        self.pinned.len() + self.others.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn item(&self, tab_id: TabId) -> Option<&RailItem> {
        self.pinned
            .iter()
            .chain(self.others.iter())
            .find(|i| i.tab_id == tab_id)
    }
}

#[derive(Debug, Default)]
pub struct OverlayClient {
    tabs: Snapshot,
    view: RailView,
    visible: bool,
    renders: u64,
}

impl OverlayClient {
    pub fn new() -> Self {
        Self { visible: true, ..Self::default() }
    }

    /// Message sent once the overlay has been mounted.
    pub fn startup_message(&self) -> PageMessage {
        PageMessage::GetTabsSnapshot
    }

    /// Apply the coordinator's answer to a snapshot request. A missing or
    /// undecodable response leaves the rail as it was.
    pub fn apply_response(&mut self, response: Option<&Value>) -> bool {
        let Some(value) = response else {
            return false;
        };
        match serde_json::from_value::<SnapshotResponse>(value.clone()) {
            Ok(r) => {
                self.render(r.tabs);
                true
            }
            Err(_) => false,
        }
    }

    /// Apply a pushed coordinator message. Returns true if the rail changed.
    pub fn handle_message(&mut self, message: &Value) -> bool {
        match serde_json::from_value::<CoordinatorMessage>(message.clone()) {
            Ok(CoordinatorMessage::TabsUpdated { tabs }) => {
                self.render(tabs);
                true
            }
            Err(_) => false,
        }
    }

    fn render(&mut self, tabs: Snapshot) {
        self.view = RailView::from_snapshot(&tabs);
        self.tabs = tabs;
        self.renders += 1;
    }

    pub fn view(&self) -> &RailView {
        &self.view
    }

    pub fn tabs(&self) -> &Snapshot {
        &self.tabs
    }

    pub fn renders(&self) -> u64 {
        self.renders
    }

    /// Tooltip text for an icon under the pointer.
    pub fn tooltip(&self, tab_id: TabId) -> Option<&str> {
        self.view.item(tab_id).map(|i| i.tooltip.as_str())
    }

    // ─── Gestures ───

    /// Left click on an icon.
    pub fn click(&self, tab_id: TabId) -> Option<PageMessage> {
        self.view.item(tab_id).map(|i| PageMessage::ActivateTab { tab_id: i.tab_id })
    }

    /// Right click on an icon: toggle pin, reporting the pin state this
    /// page last saw.
    pub fn context_menu(&self, tab_id: TabId) -> Option<PageMessage> {
        self.view
            .item(tab_id)
            .map(|i| PageMessage::TogglePin { tab_id: i.tab_id, pinned: i.pinned })
    }

    // ─── Resync triggers ───

    /// Page visibility changed. Becoming visible asks for a fresh snapshot.
    pub fn on_visibility_change(&mut self, visible: bool) -> Option<PageMessage> {
        let became_visible = visible && !self.visible;
        self.visible = visible;
        became_visible.then_some(PageMessage::GetTabsSnapshot)
    }

    /// Window regained focus.
    pub fn on_focus(&mut self) -> Option<PageMessage> {
        self.visible = true;
        Some(PageMessage::GetTabsSnapshot)
    }

    /// `pageshow`; `persisted` means the page came back from the
    /// back/forward cache and may have missed broadcasts.
    pub fn on_page_show(&mut self, persisted: bool) -> Option<PageMessage> {
        persisted.then_some(PageMessage::GetTabsSnapshot)
    }
}
