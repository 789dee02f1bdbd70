//! Page message handler.
//!
//! Decodes messages sent by overlay pages and dispatches them to the
//! coordinator. The return value is the response to hand back to the page,
//! or `None` when the message kind has no response or could not be decoded.
//! Malformed input is dropped silently; nothing here ever fails.

use serde_json::{json, Value};

use crate::coordinator::Coordinator;
use crate::host::TabHost;
use crate::types::protocol::{PageMessage, SenderTab};

/// Dispatch one page message.
pub async fn handle_page_message<H: TabHost>(
    coordinator: &mut Coordinator<H>,
    sender: Option<&SenderTab>,
    message: &Value,
) -> Option<Value> {
    let Some(sender) = sender else {
        tracing::debug!("message without sender tab ignored");
        return None;
    };

    let parsed: PageMessage = match serde_json::from_value(message.clone()) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(tab_id = %sender.id, error = %e, "unrecognized page message ignored");
            return None;
        }
    };

    match parsed {
        // ─── Liveness ───
        PageMessage::GetTabsSnapshot => {
            coordinator.register_live(sender);
            Some(json!({ "tabs": coordinator.cached_snapshot() }))
        }
        PageMessage::OverlayLoaded => {
            coordinator.register_live(sender);
            if let Err(e) = coordinator.rebuild().await {
                tracing::warn!(error = %e, "fresh snapshot failed, answering from cache");
            }
            // Other overlays converge on the next broadcast.
            coordinator.schedule_rebroadcast();
            Some(json!({ "tabs": coordinator.cached_snapshot() }))
        }
        PageMessage::GetWindowTabs => {
            if let Err(e) = coordinator.rebuild().await {
                tracing::warn!(error = %e, "fresh snapshot failed, answering from cache");
            }
            let tabs = match sender.window_id {
                Some(window_id) => coordinator.cached_snapshot().window_tabs(window_id),
                None => Vec::new(),
            };
            Some(json!({ "tabs": tabs, "windowId": sender.window_id }))
        }

        // ─── Intents ───
        PageMessage::ActivateTab { tab_id } => {
            coordinator.activate_tab(tab_id).await.ok();
            None
        }
        PageMessage::TogglePin { tab_id, pinned } => {
            coordinator.toggle_pin(tab_id, pinned).await.ok();
            None
        }
    }
}
