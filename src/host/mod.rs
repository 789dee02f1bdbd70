//! Browser host capability surface.
//!
//! The coordinator never talks to a browser directly. Everything it needs,
//! tab inspection, tab mutation, page messaging and page scripting, goes
//! through [`TabHost`]. Every call may suspend; none of them is retried here.

pub mod memory_host;
pub mod stdio_host;

use crate::types::errors::HostError;
use crate::types::protocol::CoordinatorMessage;
use crate::types::tab::{HostWindow, TabId, TabRecord, TabUpdate};

/// Trait defining the host operations the coordinator consumes.
#[allow(async_fn_in_trait)]
pub trait TabHost {
    /// Every window with its tabs populated.
    async fn list_windows_with_tabs(&self) -> Result<Vec<HostWindow>, HostError>;
    /// Tabs whose URL matches any of the match patterns.
    async fn query_tabs_by_url_pattern(&self, patterns: &[&str]) -> Result<Vec<TabRecord>, HostError>;
    async fn update_tab(&self, tab_id: TabId, update: TabUpdate) -> Result<(), HostError>;
    /// Fails with [`HostError::NoReceiver`] when no overlay listens in the page.
    async fn send_message_to_page(&self, tab_id: TabId, message: &CoordinatorMessage) -> Result<(), HostError>;
    async fn inject_script(&self, tab_id: TabId, resource: &str) -> Result<(), HostError>;
    async fn inject_style(&self, tab_id: TabId, resource: &str) -> Result<(), HostError>;
    /// Evaluates a presence check in the page: is an element with this id in the DOM?
    async fn probe_element(&self, tab_id: TabId, element_id: &str) -> Result<bool, HostError>;
}

/// Kinds of tab lifecycle events the coordinator subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabEventKind {
    Created,
    Removed,
    Updated,
    Activated,
    Moved,
    Attached,
    Detached,
}

/// Reasons to sweep all open pages and inject the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionTrigger {
    Installed,
    Startup,
    ManualTrigger,
}

/// Events delivered by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Tab {
        kind: TabEventKind,
        tab_id: Option<TabId>,
    },
    /// A frame finished loading. Only `frame_id == 0` is the top-level page.
    NavigationCompleted {
        tab_id: TabId,
        url: String,
        frame_id: u64,
    },
    Lifecycle(InjectionTrigger),
}
