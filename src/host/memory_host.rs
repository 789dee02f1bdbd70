//! In-memory browser host.
//!
//! Models windows, tabs, and the pages loaded in them: whether an overlay
//! rail is in the DOM and whether a listener answers messages. Used by the
//! test suite and for running the coordinator without a browser.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::services::url_matching::{is_eligible_url, url_matches_any};
use crate::types::errors::HostError;
use crate::types::protocol::CoordinatorMessage;
use crate::types::settings::OverlaySettings;
use crate::types::tab::{HostWindow, TabId, TabRecord, TabUpdate, WindowId};

use super::TabHost;

/// Everything the host was asked to do, in call order.
#[derive(Debug, Clone, Default)]
pub struct HostJournal {
    pub list_calls: usize,
    pub updates: Vec<(TabId, TabUpdate)>,
    pub scripts: Vec<(TabId, String)>,
    pub styles: Vec<(TabId, String)>,
    pub probes: Vec<TabId>,
    pub delivered: Vec<(TabId, CoordinatorMessage)>,
}

impl HostJournal {
    /// Messages delivered to one page, oldest first.
    pub fn delivered_to(&self, tab_id: TabId) -> Vec<&CoordinatorMessage> {
        self.delivered
            .iter()
            .filter(|(id, _)| *id == tab_id)
            .map(|(_, m)| m)
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
struct PageFixture {
    rail_count: usize,
    receiver: bool,
    blocked: bool,
}

#[derive(Debug)]
struct WindowEntry {
    id: WindowId,
    tabs: Vec<TabRecord>,
}

#[derive(Debug)]
struct Inner {
    windows: Vec<WindowEntry>,
    pages: HashMap<TabId, PageFixture>,
    next_tab_id: u64,
    next_window_id: u64,
    marker_element_id: String,
    unavailable: Option<String>,
    journal: HostJournal,
}

impl Inner {
    fn locate(&self, tab_id: TabId) -> Option<(usize, usize)> {
        self.windows.iter().enumerate().find_map(|(wi, w)| {
            w.tabs.iter().position(|t| t.id == tab_id).map(|ti| (wi, ti))
        })
    }

    fn tab(&self, tab_id: TabId) -> Option<&TabRecord> {
        self.locate(tab_id).map(|(wi, ti)| &self.windows[wi].tabs[ti])
    }

    fn check_available(&self) -> Result<(), HostError> {
        match &self.unavailable {
            Some(msg) => Err(HostError::Unavailable(msg.clone())),
            None => Ok(()),
        }
    }

    /// Scripting is allowed on existing, eligible, non-blocked pages only.
    fn check_scriptable(&self, tab_id: TabId) -> Result<(), HostError> {
        self.check_available()?;
        let tab = self.tab(tab_id).ok_or(HostError::NoSuchTab(tab_id))?;
        if !is_eligible_url(&tab.url) {
            return Err(HostError::Restricted(format!("Cannot access contents of {}", tab.url)));
        }
        if self.pages.get(&tab_id).map(|p| p.blocked).unwrap_or(false) {
            return Err(HostError::Restricted(format!("Page cannot be scripted: {}", tab.url)));
        }
        Ok(())
    }

    fn activate(&mut self, wi: usize, ti: usize) {
        for (i, tab) in self.windows[wi].tabs.iter_mut().enumerate() {
            tab.active = i == ti;
        }
    }

    /// Removes a tab from its window strip, handing `active` to the nearest
    /// neighbor. Empty windows are closed.
    fn detach(&mut self, wi: usize, ti: usize) -> TabRecord {
        let removed = self.windows[wi].tabs.remove(ti);
        let remaining = self.windows[wi].tabs.len();
        if remaining == 0 {
            self.windows.remove(wi);
        } else if removed.active {
            let next = if ti < remaining { ti } else { remaining - 1 };
            self.activate(wi, next);
        }
        removed
    }

    fn pinned_count(&self, wi: usize) -> usize {
        self.windows[wi].tabs.iter().filter(|t| t.pinned).count()
    }

    fn set_pinned(&mut self, wi: usize, ti: usize, pinned: bool) {
        if self.windows[wi].tabs[ti].pinned == pinned {
            return;
        }
        let pinned_before = self.pinned_count(wi);
        let mut tab = self.windows[wi].tabs.remove(ti);
        tab.pinned = pinned;
        // Pinned tabs stay at the left of the strip; pinning appends to the
        // pinned section, unpinning puts the tab right after it.
        let insert_pos = if pinned { pinned_before } else { pinned_before - 1 };
        let insert_pos = insert_pos.min(self.windows[wi].tabs.len());
        self.windows[wi].tabs.insert(insert_pos, tab);
    }
}

/// Shared handle to an in-memory host. Clones observe the same state.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                windows: Vec::new(),
                pages: HashMap::new(),
                next_tab_id: 1,
                next_window_id: 1,
                marker_element_id: OverlaySettings::default().marker_element_id,
                unavailable: None,
                journal: HostJournal::default(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Element id the injected overlay script creates.
    pub fn set_marker_element_id(&self, marker: &str) {
        self.lock().marker_element_id = marker.to_string();
    }

    pub fn open_window(&self) -> WindowId {
        let mut inner = self.lock();
        let id = WindowId(inner.next_window_id);
        inner.next_window_id += 1;
        inner.windows.push(WindowEntry { id, tabs: Vec::new() });
        id
    }

    /// Create a tab at the end of the window's strip. The first tab of a
    /// window is always active. Unknown windows are opened on the fly.
    pub fn create_tab(&self, window_id: WindowId, url: &str, active: bool) -> TabId {
        let mut inner = self.lock();
        let id = TabId(inner.next_tab_id);
        inner.next_tab_id += 1;

        let wi = match inner.windows.iter().position(|w| w.id == window_id) {
            Some(wi) => wi,
            None => {
                inner.next_window_id = inner.next_window_id.max(window_id.0 + 1);
                inner.windows.push(WindowEntry { id: window_id, tabs: Vec::new() });
                inner.windows.len() - 1
            }
        };
        let first = inner.windows[wi].tabs.is_empty();
        inner.windows[wi].tabs.push(TabRecord {
            id,
            window_id,
            title: url.to_string(),
            url: url.to_string(),
            fav_icon_url: None,
            active: false,
            pinned: false,
        });
        if active || first {
            let ti = inner.windows[wi].tabs.len() - 1;
            inner.activate(wi, ti);
        }
        inner.pages.insert(id, PageFixture::default());
        id
    }

    /// Close a tab. If it was active, its nearest neighbor becomes active.
    pub fn close_tab(&self, tab_id: TabId) -> Result<(), HostError> {
        let mut inner = self.lock();
        let (wi, ti) = inner.locate(tab_id).ok_or(HostError::NoSuchTab(tab_id))?;
        inner.detach(wi, ti);
        inner.pages.remove(&tab_id);
        Ok(())
    }

    /// Move a tab into another (or the same) window at `index`. The index is
    /// clamped so pinned tabs stay ahead of unpinned ones.
    pub fn move_tab(&self, tab_id: TabId, window_id: WindowId, index: usize) -> Result<(), HostError> {
        let mut inner = self.lock();
        let (wi, ti) = inner.locate(tab_id).ok_or(HostError::NoSuchTab(tab_id))?;
        let mut tab = inner.detach(wi, ti);
        let target = match inner.windows.iter().position(|w| w.id == window_id) {
            Some(t) => t,
            None => {
                inner.windows.push(WindowEntry { id: window_id, tabs: Vec::new() });
                inner.windows.len() - 1
            }
        };
        let first = inner.windows[target].tabs.is_empty();
        tab.window_id = window_id;
        tab.active = false;
        let pinned = inner.pinned_count(target);
        let pos = if tab.pinned {
            index.min(pinned)
        } else {
            index.clamp(pinned, inner.windows[target].tabs.len())
        };
        inner.windows[target].tabs.insert(pos, tab);
        if first {
            inner.activate(target, pos);
        }
        Ok(())
    }

    pub fn set_title(&self, tab_id: TabId, title: &str) -> Result<(), HostError> {
        let mut inner = self.lock();
        let (wi, ti) = inner.locate(tab_id).ok_or(HostError::NoSuchTab(tab_id))?;
        inner.windows[wi].tabs[ti].title = title.to_string();
        Ok(())
    }

    pub fn set_fav_icon(&self, tab_id: TabId, fav_icon_url: Option<&str>) -> Result<(), HostError> {
        let mut inner = self.lock();
        let (wi, ti) = inner.locate(tab_id).ok_or(HostError::NoSuchTab(tab_id))?;
        inner.windows[wi].tabs[ti].fav_icon_url = fav_icon_url.map(str::to_string);
        Ok(())
    }

    /// Full navigation: the old document and any overlay in it are gone.
    pub fn navigate(&self, tab_id: TabId, url: &str) -> Result<(), HostError> {
        let mut inner = self.lock();
        let (wi, ti) = inner.locate(tab_id).ok_or(HostError::NoSuchTab(tab_id))?;
        let tab = &mut inner.windows[wi].tabs[ti];
        tab.url = url.to_string();
        tab.title = url.to_string();
        let page = inner.pages.entry(tab_id).or_default();
        page.rail_count = 0;
        page.receiver = false;
        Ok(())
    }

    /// Same-document navigation: the URL changes, the overlay survives.
    pub fn soft_navigate(&self, tab_id: TabId, url: &str) -> Result<(), HostError> {
        let mut inner = self.lock();
        let (wi, ti) = inner.locate(tab_id).ok_or(HostError::NoSuchTab(tab_id))?;
        inner.windows[wi].tabs[ti].url = url.to_string();
        Ok(())
    }

    /// Put a running overlay into the page as if it had been loaded by the
    /// host itself (declared content script).
    pub fn attach_overlay(&self, tab_id: TabId) {
        let mut inner = self.lock();
        let page = inner.pages.entry(tab_id).or_default();
        page.rail_count = page.rail_count.max(1);
        page.receiver = true;
    }

    /// Tear the overlay out of the page (reload, extension update).
    pub fn detach_overlay(&self, tab_id: TabId) {
        let mut inner = self.lock();
        if let Some(page) = inner.pages.get_mut(&tab_id) {
            page.rail_count = 0;
            page.receiver = false;
        }
    }

    /// Forbid scripting on the page regardless of its URL.
    pub fn block_scripting(&self, tab_id: TabId) {
        self.lock().pages.entry(tab_id).or_default().blocked = true;
    }

    /// Make every host call fail with [`HostError::Unavailable`].
    pub fn set_unavailable(&self, reason: Option<&str>) {
        self.lock().unavailable = reason.map(str::to_string);
    }

    pub fn tab(&self, tab_id: TabId) -> Option<TabRecord> {
        self.lock().tab(tab_id).cloned()
    }

    /// All tabs in window order then strip order.
    pub fn tabs(&self) -> Vec<TabRecord> {
        self.lock()
            .windows
            .iter()
            .flat_map(|w| w.tabs.iter().cloned())
            .collect()
    }

    pub fn tab_count(&self) -> usize {
        self.lock().windows.iter().map(|w| w.tabs.len()).sum()
    }

    /// Number of overlay rails currently in the page's DOM.
    pub fn rail_count(&self, tab_id: TabId) -> usize {
        self.lock().pages.get(&tab_id).map(|p| p.rail_count).unwrap_or(0)
    }

    pub fn journal(&self) -> HostJournal {
        self.lock().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.lock().journal = HostJournal::default();
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl TabHost for MemoryHost {
    async fn list_windows_with_tabs(&self) -> Result<Vec<HostWindow>, HostError> {
        let mut inner = self.lock();
        inner.check_available()?;
        inner.journal.list_calls += 1;
        Ok(inner
            .windows
            .iter()
            .map(|w| HostWindow { id: w.id, tabs: w.tabs.clone() })
            .collect())
    }

    async fn query_tabs_by_url_pattern(&self, patterns: &[&str]) -> Result<Vec<TabRecord>, HostError> {
        let inner = self.lock();
        inner.check_available()?;
        Ok(inner
            .windows
            .iter()
            .flat_map(|w| w.tabs.iter())
            .filter(|t| url_matches_any(&t.url, patterns))
            .cloned()
            .collect())
    }

    async fn update_tab(&self, tab_id: TabId, update: TabUpdate) -> Result<(), HostError> {
        let mut inner = self.lock();
        inner.check_available()?;
        inner.journal.updates.push((tab_id, update));
        let (wi, ti) = inner.locate(tab_id).ok_or(HostError::NoSuchTab(tab_id))?;
        if update.active == Some(true) {
            inner.activate(wi, ti);
        }
        if let Some(pinned) = update.pinned {
            inner.set_pinned(wi, ti, pinned);
        }
        Ok(())
    }

    async fn send_message_to_page(&self, tab_id: TabId, message: &CoordinatorMessage) -> Result<(), HostError> {
        let mut inner = self.lock();
        inner.check_available()?;
        let listening = inner.tab(tab_id).is_some()
            && inner.pages.get(&tab_id).map(|p| p.receiver).unwrap_or(false);
        if !listening {
            return Err(HostError::NoReceiver(tab_id));
        }
        inner.journal.delivered.push((tab_id, message.clone()));
        Ok(())
    }

    async fn inject_script(&self, tab_id: TabId, resource: &str) -> Result<(), HostError> {
        let mut inner = self.lock();
        inner.check_scriptable(tab_id)?;
        inner.journal.scripts.push((tab_id, resource.to_string()));
        let page = inner.pages.entry(tab_id).or_default();
        page.rail_count += 1;
        page.receiver = true;
        Ok(())
    }

    async fn inject_style(&self, tab_id: TabId, resource: &str) -> Result<(), HostError> {
        let mut inner = self.lock();
        inner.check_scriptable(tab_id)?;
        inner.journal.styles.push((tab_id, resource.to_string()));
        Ok(())
    }

    async fn probe_element(&self, tab_id: TabId, element_id: &str) -> Result<bool, HostError> {
        let mut inner = self.lock();
        inner.check_scriptable(tab_id)?;
        inner.journal.probes.push(tab_id);
        if element_id != inner.marker_element_id {
            return Ok(false);
        }
        Ok(inner.pages.get(&tab_id).map(|p| p.rail_count > 0).unwrap_or(false))
    }
}
