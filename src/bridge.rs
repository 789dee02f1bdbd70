//! Line protocol between the coordinator process and the browser-side shim.
//!
//! One JSON object per line in each direction.
//!
//! Inbound (shim -> coordinator):
//! - host reply:    `{"id":3,"result":[...]}` or `{"id":3,"error":"No tab with id: 9"}`
//! - host event:    `{"event":"tabs.onActivated","tabId":4}`
//! - page message:  `{"event":"runtime.onMessage","reply":7,"sender":{"tab":{...}},"message":{...}}`
//!
//! Outbound (coordinator -> shim):
//! - `{"event":"ready","version":"0.1.0","session":"<uuid>"}`
//! - host request:  `{"id":3,"method":"tabs.update","params":{...}}`
//! - page reply:    `{"reply":7,"response":{...}}`

use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::event_loop::{CoordinatorEvent, Responder};
use crate::host::stdio_host::StdioHost;
use crate::host::{HostEvent, InjectionTrigger, TabEventKind};
use crate::types::errors::ProtocolError;
use crate::types::protocol::SenderTab;
use crate::types::tab::TabId;

/// A decoded inbound line.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeInput {
    HostReply {
        id: u64,
        outcome: Result<Value, String>,
    },
    Event(HostEvent),
    PageMessage {
        reply: Option<u64>,
        sender: Option<SenderTab>,
        message: Value,
    },
}

pub fn parse_line(line: &str) -> Result<BridgeInput, ProtocolError> {
    let value: Value =
        serde_json::from_str(line).map_err(|e| ProtocolError::MalformedLine(e.to_string()))?;
    if !value.is_object() {
        return Err(ProtocolError::MalformedLine("expected a JSON object".to_string()));
    }

    if let Some(name) = value.get("event").and_then(|v| v.as_str()) {
        if name == "runtime.onMessage" {
            return Ok(parse_page_message(&value));
        }
        return parse_event(name, &value).map(BridgeInput::Event);
    }

    let id = value
        .get("id")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| ProtocolError::MissingField("id".to_string()))?;
    // `"error": null` is a success reply.
    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        let message = match error {
            Value::String(s) => s.clone(),
            Value::Object(map) => map
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown host error")
                .to_string(),
            other => other.to_string(),
        };
        return Ok(BridgeInput::HostReply { id, outcome: Err(message) });
    }
    let result = value.get("result").cloned().unwrap_or(Value::Null);
    Ok(BridgeInput::HostReply { id, outcome: Ok(result) })
}

fn parse_page_message(value: &Value) -> BridgeInput {
    let reply = value.get("reply").and_then(|v| v.as_u64());
    // A sender without a usable tab is kept as `None`; the handler drops it.
    let sender = value
        .get("sender")
        .and_then(|s| s.get("tab"))
        .and_then(|t| serde_json::from_value::<SenderTab>(t.clone()).ok());
    let message = value.get("message").cloned().unwrap_or(Value::Null);
    BridgeInput::PageMessage { reply, sender, message }
}

fn tab_id_field(value: &Value, field: &str) -> Option<TabId> {
    value.get(field).and_then(|v| v.as_u64()).map(TabId)
}

fn parse_event(name: &str, value: &Value) -> Result<HostEvent, ProtocolError> {
    let tab = |kind: TabEventKind| HostEvent::Tab { kind, tab_id: tab_id_field(value, "tabId") };
    let event = match name {
        "tabs.onCreated" => tab(TabEventKind::Created),
        "tabs.onRemoved" => tab(TabEventKind::Removed),
        "tabs.onUpdated" => tab(TabEventKind::Updated),
        "tabs.onActivated" => tab(TabEventKind::Activated),
        "tabs.onMoved" => tab(TabEventKind::Moved),
        "tabs.onAttached" => tab(TabEventKind::Attached),
        "tabs.onDetached" => tab(TabEventKind::Detached),
        "webNavigation.onCompleted" => {
            let tab_id = tab_id_field(value, "tabId")
                .ok_or_else(|| ProtocolError::MissingField("tabId".to_string()))?;
            let url = value
                .get("url")
                .and_then(|v| v.as_str())
                .ok_or_else(|| ProtocolError::MissingField("url".to_string()))?
                .to_string();
            let frame_id = value.get("frameId").and_then(|v| v.as_u64()).unwrap_or(0);
            HostEvent::NavigationCompleted { tab_id, url, frame_id }
        }
        "runtime.onInstalled" => HostEvent::Lifecycle(InjectionTrigger::Installed),
        "runtime.onStartup" => HostEvent::Lifecycle(InjectionTrigger::Startup),
        "action.onClicked" => HostEvent::Lifecycle(InjectionTrigger::ManualTrigger),
        other => return Err(ProtocolError::UnknownEvent(other.to_string())),
    };
    Ok(event)
}

/// Route inbound lines until the reader is exhausted, then disconnect the
/// host. Replies complete pending host requests; events and page messages
/// go to the event loop. Page replies are written to `out`.
pub async fn route_input<R>(
    reader: R,
    host: &StdioHost,
    events: &mpsc::UnboundedSender<CoordinatorEvent>,
    out: &mpsc::UnboundedSender<Value>,
) where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "bridge input read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(&line) {
            Ok(BridgeInput::HostReply { id, outcome }) => {
                if !host.complete(id, outcome) {
                    tracing::debug!(id, "reply for unknown or expired request");
                }
            }
            Ok(BridgeInput::Event(event)) => {
                if events.send(CoordinatorEvent::Host(event)).is_err() {
                    break;
                }
            }
            Ok(BridgeInput::PageMessage { reply, sender, message }) => {
                let respond = reply.map(|reply| {
                    let out = out.clone();
                    Box::new(move |response: Option<Value>| {
                        out.send(reply_line(reply, response)).ok();
                    }) as Responder
                });
                if events.send(CoordinatorEvent::PageMessage { sender, message, respond }).is_err() {
                    break;
                }
            }
            Err(e) => tracing::warn!(error = %e, "bridge line ignored"),
        }
    }
    host.disconnect();
}

// ─── Outbound ───

pub fn ready_line(session: Uuid) -> Value {
    json!({"event": "ready", "version": env!("CARGO_PKG_VERSION"), "session": session})
}

pub fn request_line(id: u64, method: &str, params: Value) -> Value {
    json!({"id": id, "method": method, "params": params})
}

pub fn reply_line(reply: u64, response: Option<Value>) -> Value {
    json!({"reply": reply, "response": response})
}
