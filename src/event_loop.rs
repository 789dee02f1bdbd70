//! Single-task event loop.
//!
//! Host events and page messages arrive on one channel and are handled one
//! at a time, each to completion. The pending broadcast deadline is raced
//! against the channel; incoming events win ties so a steady burst keeps
//! pushing the broadcast back.

use std::time::Instant;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::coordinator::Coordinator;
use crate::host::{HostEvent, TabHost};
use crate::message_handler::handle_page_message;
use crate::types::protocol::SenderTab;

/// Callback receiving the response to a page message (`None` = no response).
pub type Responder = Box<dyn FnOnce(Option<Value>) + Send>;

pub enum CoordinatorEvent {
    Host(HostEvent),
    PageMessage {
        sender: Option<SenderTab>,
        message: Value,
        respond: Option<Responder>,
    },
}

impl std::fmt::Debug for CoordinatorEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinatorEvent::Host(event) => f.debug_tuple("Host").field(event).finish(),
            CoordinatorEvent::PageMessage { sender, message, respond } => f
                .debug_struct("PageMessage")
                .field("sender", sender)
                .field("message", message)
                .field("respond", &respond.is_some())
                .finish(),
        }
    }
}

/// Handle one event to completion.
pub async fn dispatch<H: TabHost>(coordinator: &mut Coordinator<H>, event: CoordinatorEvent) {
    match event {
        CoordinatorEvent::Host(host_event) => coordinator.handle_host_event(host_event).await,
        CoordinatorEvent::PageMessage { sender, message, respond } => {
            let response = handle_page_message(coordinator, sender.as_ref(), &message).await;
            if let Some(respond) = respond {
                respond(response);
            }
        }
    }
}

/// Build the startup cache, then process events until every sender is
/// dropped. A broadcast still pending at that point is abandoned.
pub async fn run<H: TabHost>(
    coordinator: &mut Coordinator<H>,
    mut events: mpsc::UnboundedReceiver<CoordinatorEvent>,
) {
    coordinator.startup().await;
    loop {
        let deadline = coordinator.broadcast_deadline();
        tokio::select! {
            biased;
            event = events.recv() => match event {
                Some(event) => dispatch(coordinator, event).await,
                None => break,
            },
            _ = wait_until(deadline) => {
                coordinator.fire_due_broadcast().await;
            }
        }
    }
    tracing::debug!("event channel closed, coordinator loop stopped");
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending::<()>().await,
    }
}
