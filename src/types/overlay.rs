use super::errors::HostError;
use super::tab::TabId;

/// Liveness state of a page, from the coordinator's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageState {
    #[default]
    Unknown,
    /// An inject command was issued (or the probe found an overlay already
    /// present); awaiting the page's liveness message.
    InjectionAttempted,
    /// The page confirmed a running overlay and is a broadcast target.
    Live,
}

/// Result of one injection attempt.
#[derive(Debug)]
pub enum InjectionOutcome {
    /// Stylesheet and script were issued to the page.
    Injected,
    /// The presence probe found an overlay; nothing was injected.
    AlreadyPresent,
    /// The page URL is not http(s); the host was never contacted.
    Ineligible,
    /// The host refused the probe or the script. Swallowed by callers.
    Failed(HostError),
}

impl InjectionOutcome {
    pub fn injected(&self) -> bool {
        matches!(self, InjectionOutcome::Injected)
    }
}

/// Per-target outcome of a best-effort multicast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    NoReceiver,
}

/// Outcome of one broadcast cycle, one entry per targeted page in target order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub outcomes: Vec<(TabId, DeliveryOutcome)>,
}

impl DeliveryReport {
    pub fn delivered_count(&self) -> usize {
        self.count(DeliveryOutcome::Delivered)
    }

    pub fn no_receiver_count(&self) -> usize {
        self.count(DeliveryOutcome::NoReceiver)
    }

    pub fn targets(&self) -> Vec<TabId> {
        self.outcomes.iter().map(|(id, _)| *id).collect()
    }

    pub fn outcome_for(&self, tab_id: TabId) -> Option<DeliveryOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| *id == tab_id)
            .map(|(_, outcome)| *outcome)
    }

    fn count(&self, wanted: DeliveryOutcome) -> usize {
        self.outcomes.iter().filter(|(_, o)| *o == wanted).count()
    }
}
