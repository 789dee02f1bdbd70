//! Host reached over the stdio bridge.
//!
//! Each capability call becomes a request line with a fresh id; the reply
//! line carrying that id completes the call. Replies are routed in by
//! whoever reads the inbound stream, via [`StdioHost::complete`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::{mpsc, oneshot};

use crate::bridge::request_line;
use crate::types::errors::HostError;
use crate::types::protocol::CoordinatorMessage;
use crate::types::tab::{HostWindow, TabId, TabRecord, TabUpdate};

use super::TabHost;

type PendingReply = oneshot::Sender<Result<Value, String>>;

struct Shared {
    next_id: AtomicU64,
    pending: Mutex<HashMap<u64, PendingReply>>,
    disconnected: AtomicBool,
    out: mpsc::UnboundedSender<Value>,
    timeout: Duration,
}

#[derive(Clone)]
pub struct StdioHost {
    shared: Arc<Shared>,
}

impl StdioHost {
    /// `out` receives every request line to write to the shim.
    pub fn new(out: mpsc::UnboundedSender<Value>, timeout: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                next_id: AtomicU64::new(1),
                pending: Mutex::new(HashMap::new()),
                disconnected: AtomicBool::new(false),
                out,
                timeout,
            }),
        }
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<u64, PendingReply>> {
        self.shared.pending.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Resolve the request with this id. Returns false for unknown or
    /// already-abandoned ids.
    pub fn complete(&self, id: u64, outcome: Result<Value, String>) -> bool {
        match self.pending().remove(&id) {
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }

    /// Fail every outstanding request with [`HostError::Disconnected`].
    /// Later requests fail immediately without writing a line.
    pub fn disconnect(&self) {
        self.shared.disconnected.store(true, Ordering::SeqCst);
        self.pending().clear();
    }

    pub fn is_disconnected(&self) -> bool {
        self.shared.disconnected.load(Ordering::SeqCst)
    }

    pub fn pending_count(&self) -> usize {
        self.pending().len()
    }

    async fn request(&self, method: &str, params: Value, tab_id: Option<TabId>) -> Result<Value, HostError> {
        if self.is_disconnected() {
            return Err(HostError::Disconnected);
        }
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending().insert(id, tx);

        if self.shared.out.send(request_line(id, method, params)).is_err() {
            self.pending().remove(&id);
            return Err(HostError::Disconnected);
        }

        match tokio::time::timeout(self.shared.timeout, rx).await {
            Err(_) => {
                self.pending().remove(&id);
                Err(HostError::Timeout(method.to_string()))
            }
            Ok(Err(_)) => Err(HostError::Disconnected),
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(message))) => Err(HostError::from_host_message(tab_id, &message)),
        }
    }

    async fn request_as<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
        tab_id: Option<TabId>,
    ) -> Result<T, HostError> {
        let value = self.request(method, params, tab_id).await?;
        serde_json::from_value(value).map_err(|e| HostError::Protocol(format!("{}: {}", method, e)))
    }
}

/// Probe results arrive either as a bare bool or as the host's
/// `[{"result": bool}]` frame list.
fn probe_result(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Array(frames) => frames
            .first()
            .and_then(|f| f.get("result"))
            .and_then(|r| r.as_bool()),
        _ => None,
    }
}

impl TabHost for StdioHost {
    async fn list_windows_with_tabs(&self) -> Result<Vec<HostWindow>, HostError> {
        self.request_as("windows.getAll", json!({"populate": true}), None).await
    }

    async fn query_tabs_by_url_pattern(&self, patterns: &[&str]) -> Result<Vec<TabRecord>, HostError> {
        self.request_as("tabs.query", json!({"url": patterns}), None).await
    }

    async fn update_tab(&self, tab_id: TabId, update: TabUpdate) -> Result<(), HostError> {
        self.request(
            "tabs.update",
            json!({"tabId": tab_id, "updateProperties": update}),
            Some(tab_id),
        )
        .await
        .map(|_| ())
    }

    async fn send_message_to_page(&self, tab_id: TabId, message: &CoordinatorMessage) -> Result<(), HostError> {
        self.request("tabs.sendMessage", json!({"tabId": tab_id, "message": message}), Some(tab_id))
            .await
            .map(|_| ())
    }

    async fn inject_script(&self, tab_id: TabId, resource: &str) -> Result<(), HostError> {
        self.request(
            "scripting.executeScript",
            json!({"target": {"tabId": tab_id}, "files": [resource]}),
            Some(tab_id),
        )
        .await
        .map(|_| ())
    }

    async fn inject_style(&self, tab_id: TabId, resource: &str) -> Result<(), HostError> {
        self.request(
            "scripting.insertCSS",
            json!({"target": {"tabId": tab_id}, "files": [resource]}),
            Some(tab_id),
        )
        .await
        .map(|_| ())
    }

    async fn probe_element(&self, tab_id: TabId, element_id: &str) -> Result<bool, HostError> {
        let value = self
            .request(
                "scripting.probe",
                json!({"target": {"tabId": tab_id}, "elementId": element_id}),
                Some(tab_id),
            )
            .await?;
        probe_result(&value)
            .ok_or_else(|| HostError::Protocol(format!("scripting.probe: unexpected result {}", value)))
    }
}
