//! Overlay injection.
//!
//! Injection is idempotent per page: before anything is inserted the page
//! is probed for the overlay's marker element, so a rail that survived a
//! same-document navigation is never duplicated. Only http(s) pages are
//! ever touched.

use crate::host::TabHost;
use crate::managers::overlay_registry::OverlayRegistry;
use crate::services::url_matching::{is_eligible_url, ELIGIBLE_PATTERNS};
use crate::types::errors::HostError;
use crate::types::overlay::InjectionOutcome;
use crate::types::settings::OverlaySettings;
use crate::types::tab::TabId;

/// Probe the page and, if no overlay is present, insert the stylesheet then
/// the script. Host failures are returned in the outcome, never raised.
pub async fn inject_overlay<H: TabHost>(
    host: &H,
    registry: &mut OverlayRegistry,
    overlay: &OverlaySettings,
    tab_id: TabId,
    url: &str,
) -> InjectionOutcome {
    if !is_eligible_url(url) {
        return InjectionOutcome::Ineligible;
    }

    match host.probe_element(tab_id, &overlay.marker_element_id).await {
        Ok(true) => {
            registry.mark_injection_attempted(tab_id);
            return InjectionOutcome::AlreadyPresent;
        }
        Ok(false) => {}
        Err(e) => {
            log_failure(tab_id, &e, "presence probe failed, skipping injection");
            return InjectionOutcome::Failed(e);
        }
    }

    registry.mark_injection_attempted(tab_id);

    if let Err(e) = host.inject_style(tab_id, &overlay.style).await {
        tracing::debug!(tab_id = %tab_id, error = %e, "overlay style injection failed");
    }
    match host.inject_script(tab_id, &overlay.script).await {
        Ok(()) => InjectionOutcome::Injected,
        Err(e) => {
            log_failure(tab_id, &e, "overlay script injection failed");
            InjectionOutcome::Failed(e)
        }
    }
}

/// Closed tabs and restricted pages are expected; anything else is worth a warning.
fn log_failure(tab_id: TabId, error: &HostError, what: &str) {
    if error.is_routine() {
        tracing::debug!(tab_id = %tab_id, error = %error, "{}", what);
    } else {
        tracing::warn!(tab_id = %tab_id, error = %error, "{}", what);
    }
}

/// Inject into every open http(s) page.
pub async fn inject_into_all_pages<H: TabHost>(
    host: &H,
    registry: &mut OverlayRegistry,
    overlay: &OverlaySettings,
) -> Vec<(TabId, InjectionOutcome)> {
    let tabs = match host.query_tabs_by_url_pattern(&ELIGIBLE_PATTERNS).await {
        Ok(tabs) => tabs,
        Err(e) => {
            tracing::warn!(error = %e, "could not list pages for injection");
            return Vec::new();
        }
    };

    let mut outcomes = Vec::with_capacity(tabs.len());
    for tab in tabs {
        // The host's pattern matching is trusted only as a pre-filter.
        if !is_eligible_url(&tab.url) {
            continue;
        }
        let outcome = inject_overlay(host, registry, overlay, tab.id, &tab.url).await;
        outcomes.push((tab.id, outcome));
    }
    outcomes
}
