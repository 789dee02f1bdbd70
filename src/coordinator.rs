//! Coordinator core.
//!
//! Owns the snapshot cache, the overlay registry and the broadcast
//! debouncer, and mediates every interaction with the host. A coordinator
//! is a plain value: construct one per host (or per test) and drive it from
//! a single task; no method runs concurrently with another.

use std::sync::Arc;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::host::{HostEvent, InjectionTrigger, TabHost};
use crate::managers::broadcast_scheduler::{Clock, Debouncer, RuntimeClock};
use crate::managers::overlay_registry::OverlayRegistry;
use crate::managers::snapshot_cache::SnapshotCache;
use crate::services::injection_service::{inject_into_all_pages, inject_overlay};
use crate::services::url_matching::is_eligible_url;
use crate::types::errors::HostError;
use crate::types::overlay::{DeliveryOutcome, DeliveryReport, InjectionOutcome};
use crate::types::protocol::{CoordinatorMessage, SenderTab};
use crate::types::settings::CoordinatorSettings;
use crate::types::tab::{Snapshot, TabId, TabUpdate};

pub struct Coordinator<H: TabHost> {
    host: H,
    settings: CoordinatorSettings,
    session_id: Uuid,
    cache: SnapshotCache,
    registry: OverlayRegistry,
    scheduler: Debouncer,
    clock: Arc<dyn Clock>,
}

impl<H: TabHost> Coordinator<H> {
    pub fn new(host: H, settings: CoordinatorSettings) -> Self {
        let scheduler = Debouncer::new(Duration::from_millis(settings.debounce_ms));
        Self {
            host,
            settings,
            session_id: Uuid::new_v4(),
            cache: SnapshotCache::new(),
            registry: OverlayRegistry::new(),
            scheduler,
            clock: Arc::new(RuntimeClock),
        }
    }

    /// Replace the time source used for debounce decisions.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn settings(&self) -> &CoordinatorSettings {
        &self.settings
    }

    /// Identifies this coordinator instance; changes on every restart.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn registry(&self) -> &OverlayRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &Debouncer {
        &self.scheduler
    }

    /// Builds the initial cache so early snapshot requests have something
    /// to answer with.
    pub async fn startup(&mut self) {
        if let Err(e) = self.rebuild().await {
            tracing::warn!(error = %e, "initial tab snapshot failed");
        }
    }

    // ─── Snapshot cache ───

    /// Query every window and tab, flatten, and replace the cache.
    ///
    /// On failure the previous cache is kept untouched.
    pub async fn rebuild(&mut self) -> Result<Snapshot, HostError> {
        let windows = self.host.list_windows_with_tabs().await?;
        let snapshot = self.cache.store_windows(windows).clone();
        tracing::debug!(tabs = snapshot.len(), generation = self.cache.generation(), "snapshot rebuilt");
        Ok(snapshot)
    }

    /// The last built snapshot, without querying the host.
    pub fn cached_snapshot(&self) -> &Snapshot {
        self.cache.get()
    }

    pub fn cache_generation(&self) -> u64 {
        self.cache.generation()
    }

    // ─── Debounced broadcast ───

    /// (Re)start the broadcast delay window from now.
    pub fn schedule_rebroadcast(&mut self) {
        let now = self.clock.now();
        if self.scheduler.schedule(now) {
            tracing::trace!("pending broadcast postponed");
        }
    }

    /// When the pending broadcast is due, if any.
    pub fn broadcast_deadline(&self) -> Option<Instant> {
        self.scheduler.deadline()
    }

    /// Run the rebuild+broadcast cycle if the debounce window has elapsed.
    pub async fn fire_due_broadcast(&mut self) -> Option<DeliveryReport> {
        if !self.scheduler.take_due(self.clock.now()) {
            return None;
        }
        self.run_broadcast_cycle().await
    }

    /// Rebuild and broadcast immediately. A failed rebuild skips the
    /// broadcast; the next lifecycle event schedules another attempt.
    pub async fn run_broadcast_cycle(&mut self) -> Option<DeliveryReport> {
        match self.rebuild().await {
            Ok(snapshot) => Some(self.broadcast(&snapshot).await),
            Err(e) => {
                tracing::warn!(error = %e, "rebuild failed, broadcast skipped");
                None
            }
        }
    }

    /// Best-effort multicast of `snapshot` to every live page that still
    /// exists in it and still shows an http(s) URL.
    pub async fn broadcast(&mut self, snapshot: &Snapshot) -> DeliveryReport {
        let targets: Vec<TabId> = self
            .registry
            .live_pages()
            .into_iter()
            .filter(|id| {
                snapshot
                    .get(*id)
                    .map(|tab| is_eligible_url(&tab.url))
                    .unwrap_or(false)
            })
            .collect();

        let message = CoordinatorMessage::TabsUpdated { tabs: snapshot.clone() };
        let mut report = DeliveryReport::default();
        for tab_id in targets {
            let outcome = match self.host.send_message_to_page(tab_id, &message).await {
                Ok(()) => DeliveryOutcome::Delivered,
                Err(e) => {
                    tracing::debug!(tab_id = %tab_id, error = %e, "broadcast not delivered");
                    DeliveryOutcome::NoReceiver
                }
            };
            report.outcomes.push((tab_id, outcome));
        }
        tracing::debug!(
            delivered = report.delivered_count(),
            no_receiver = report.no_receiver_count(),
            "tabs broadcast"
        );
        report
    }

    // ─── Injection & liveness ───

    /// Idempotently inject the overlay into one page.
    pub async fn inject(&mut self, tab_id: TabId, url: &str) -> InjectionOutcome {
        inject_overlay(&self.host, &mut self.registry, &self.settings.overlay, tab_id, url).await
    }

    /// Inject into every open http(s) page.
    pub async fn inject_all(&mut self, trigger: InjectionTrigger) -> Vec<(TabId, InjectionOutcome)> {
        let outcomes = inject_into_all_pages(&self.host, &mut self.registry, &self.settings.overlay).await;
        tracing::info!(
            ?trigger,
            pages = outcomes.len(),
            injected = outcomes.iter().filter(|(_, o)| o.injected()).count(),
            "overlay sweep"
        );
        outcomes
    }

    /// Record a liveness confirmation from `sender`. Pages on ineligible
    /// URLs are never registered. Returns true if the page became Live.
    pub fn register_live(&mut self, sender: &SenderTab) -> bool {
        if let Some(url) = sender.url.as_deref() {
            if !is_eligible_url(url) {
                tracing::debug!(tab_id = %sender.id, "liveness from ineligible page ignored");
                return false;
            }
        }
        let promoted = self.registry.mark_live(sender.id);
        if promoted {
            tracing::info!(tab_id = %sender.id, live = self.registry.live_count(), "overlay live");
        }
        promoted
    }

    // ─── Intents ───

    /// Activate a tab, then schedule a rebroadcast whether or not the host
    /// accepted the mutation.
    pub async fn activate_tab(&mut self, tab_id: TabId) -> Result<(), HostError> {
        let result = self.host.update_tab(tab_id, TabUpdate::activate()).await;
        if let Err(e) = &result {
            log_intent_failure(tab_id, e, "activate failed");
        }
        self.schedule_rebroadcast();
        result
    }

    /// Set the tab's pin state to the negation of `caller_pinned`.
    ///
    /// With `reread_pin_state` the host's own pin state is read first and
    /// the caller's flag is used only if the tab cannot be found.
    pub async fn toggle_pin(&mut self, tab_id: TabId, caller_pinned: bool) -> Result<(), HostError> {
        let current = if self.settings.reread_pin_state {
            match self.rebuild().await {
                Ok(snapshot) => snapshot.get(tab_id).map(|t| t.pinned).unwrap_or(caller_pinned),
                Err(e) => {
                    tracing::debug!(error = %e, "pin state re-read failed, trusting caller");
                    caller_pinned
                }
            }
        } else {
            caller_pinned
        };

        let result = self.host.update_tab(tab_id, TabUpdate::pinned(!current)).await;
        if let Err(e) = &result {
            log_intent_failure(tab_id, e, "pin toggle failed");
        }
        self.schedule_rebroadcast();
        result
    }

    // ─── Host events ───

    pub async fn handle_host_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Tab { kind, tab_id } => {
                tracing::trace!(?kind, ?tab_id, "tab event");
                self.schedule_rebroadcast();
            }
            HostEvent::NavigationCompleted { tab_id, url, frame_id } => {
                if frame_id != 0 || !is_eligible_url(&url) {
                    return;
                }
                let outcome = self.inject(tab_id, &url).await;
                tracing::debug!(tab_id = %tab_id, ?outcome, "navigation injection");
            }
            HostEvent::Lifecycle(trigger) => {
                if trigger == InjectionTrigger::Startup {
                    self.startup().await;
                }
                self.inject_all(trigger).await;
            }
        }
    }
}

fn log_intent_failure(tab_id: TabId, error: &HostError, what: &str) {
    if error.is_routine() {
        tracing::debug!(tab_id = %tab_id, error = %error, "{}", what);
    } else {
        tracing::warn!(tab_id = %tab_id, error = %error, "{}", what);
    }
}
