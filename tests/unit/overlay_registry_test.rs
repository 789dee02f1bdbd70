use tabrail::managers::overlay_registry::OverlayRegistry;
use tabrail::types::overlay::PageState;
use tabrail::types::tab::TabId;

#[test]
fn test_unseen_page_is_unknown() {
    let registry = OverlayRegistry::new();
    assert_eq!(registry.state(TabId(1)), PageState::Unknown);
    assert!(registry.is_empty());
}

#[test]
fn test_injection_attempt_is_not_live() {
    let mut registry = OverlayRegistry::new();
    registry.mark_injection_attempted(TabId(1));
    assert_eq!(registry.state(TabId(1)), PageState::InjectionAttempted);
    assert!(!registry.is_live(TabId(1)));
    assert!(registry.live_pages().is_empty());
}

#[test]
fn test_liveness_promotes_regardless_of_prior_state() {
    let mut registry = OverlayRegistry::new();
    registry.mark_injection_attempted(TabId(1));
    assert!(registry.mark_live(TabId(1)));
    // Overlays loaded by the host itself announce without any injection.
    assert!(registry.mark_live(TabId(2)));
    assert_eq!(registry.live_pages(), vec![TabId(1), TabId(2)]);
}

#[test]
fn test_repeated_liveness_is_idempotent() {
    let mut registry = OverlayRegistry::new();
    assert!(registry.mark_live(TabId(3)));
    assert!(!registry.mark_live(TabId(3)));
    assert_eq!(registry.live_count(), 1);
}

#[test]
fn test_injection_attempt_never_demotes_live_page() {
    let mut registry = OverlayRegistry::new();
    registry.mark_live(TabId(4));
    registry.mark_injection_attempted(TabId(4));
    assert!(registry.is_live(TabId(4)));
}

#[test]
fn test_live_pages_sorted_by_tab_id() {
    let mut registry = OverlayRegistry::new();
    for id in [9, 2, 5] {
        registry.mark_live(TabId(id));
    }
    registry.mark_injection_attempted(TabId(1));
    assert_eq!(registry.live_pages(), vec![TabId(2), TabId(5), TabId(9)]);
    assert_eq!(registry.len(), 4);
}
