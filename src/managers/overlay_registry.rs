use std::collections::BTreeMap;

use crate::types::overlay::PageState;
use crate::types::tab::TabId;

/// Tracks which pages have been injected and which confirmed a live overlay.
///
/// Entries are never removed. A page that closed or navigated away simply
/// stops answering, and delivery to it is a no-op.
#[derive(Debug, Default)]
pub struct OverlayRegistry {
    pages: BTreeMap<TabId, PageState>,
}

impl OverlayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, tab_id: TabId) -> PageState {
        self.pages.get(&tab_id).copied().unwrap_or_default()
    }

    /// Unknown -> InjectionAttempted. A Live page stays Live.
    pub fn mark_injection_attempted(&mut self, tab_id: TabId) {
        let state = self.pages.entry(tab_id).or_default();
        if *state == PageState::Unknown {
            *state = PageState::InjectionAttempted;
        }
    }

    /// Promotes a page to Live. Returns true if it was not Live before.
    pub fn mark_live(&mut self, tab_id: TabId) -> bool {
        let previous = self.pages.insert(tab_id, PageState::Live);
        previous != Some(PageState::Live)
    }

    pub fn is_live(&self, tab_id: TabId) -> bool {
        self.state(tab_id) == PageState::Live
    }

    /// Live pages in ascending tab id order.
    pub fn live_pages(&self) -> Vec<TabId> {
        self.pages
            .iter()
            .filter(|(_, s)| **s == PageState::Live)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn live_count(&self) -> usize {
        self.pages.values().filter(|s| **s == PageState::Live).count()
    }

    /// Number of pages the registry has ever seen.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
