//! Property-based tests for snapshot completeness.
//!
//! After any sequence of tab operations, a rebuilt snapshot must contain
//! every open tab exactly once, in window order then strip order, with the
//! host's active and pinned flags.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use tabrail::coordinator::Coordinator;
use tabrail::host::memory_host::MemoryHost;
use tabrail::host::TabHost;
use tabrail::types::settings::CoordinatorSettings;
use tabrail::types::tab::{TabId, TabUpdate, WindowId};

#[derive(Debug, Clone)]
enum TabOp {
    Create { window: u64, active: bool },
    Close(usize),
    Move { pick: usize, window: u64, index: usize },
    Activate(usize),
    TogglePin(usize),
}

fn arb_tab_ops() -> impl Strategy<Value = Vec<TabOp>> {
    prop::collection::vec(
        prop_oneof![
            4 => (1..4u64, any::<bool>()).prop_map(|(window, active)| TabOp::Create { window, active }),
            1 => (0..20usize).prop_map(TabOp::Close),
            2 => (0..20usize, 1..4u64, 0..8usize).prop_map(|(pick, window, index)| TabOp::Move { pick, window, index }),
            2 => (0..20usize).prop_map(TabOp::Activate),
            2 => (0..20usize).prop_map(TabOp::TogglePin),
        ],
        1..50,
    )
}

fn pick(host: &MemoryHost, idx: usize) -> Option<TabId> {
    let tabs = host.tabs();
    if tabs.is_empty() {
        None
    } else {
        Some(tabs[idx % tabs.len()].id)
    }
}

async fn apply(host: &MemoryHost, op: &TabOp) {
    match op {
        TabOp::Create { window, active } => {
            let id = host.create_tab(WindowId(*window), "https://example.com", *active);
            host.set_title(id, &format!("Tab {}", id)).unwrap();
        }
        TabOp::Close(idx) => {
            if let Some(id) = pick(host, *idx) {
                host.close_tab(id).unwrap();
            }
        }
        TabOp::Move { pick: idx, window, index } => {
            if let Some(id) = pick(host, *idx) {
                host.move_tab(id, WindowId(*window), *index).unwrap();
            }
        }
        TabOp::Activate(idx) => {
            if let Some(id) = pick(host, *idx) {
                host.update_tab(id, TabUpdate::activate()).await.unwrap();
            }
        }
        TabOp::TogglePin(idx) => {
            if let Some(id) = pick(host, *idx) {
                let pinned = host.tab(id).unwrap().pinned;
                host.update_tab(id, TabUpdate::pinned(!pinned)).await.unwrap();
            }
        }
    }
}

// **Property 5: Snapshot completeness**
//
// *For any* sequence of creations, closures, moves, activations and pin
// toggles, the rebuilt snapshot lists every open tab exactly once, each
// non-empty window has exactly one active tab, and pinned tabs lead their
// window's strip.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn rebuilt_snapshot_is_complete(ops in arb_tab_ops()) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        rt.block_on(async {
            let host = MemoryHost::new();
            for op in &ops {
                apply(&host, op).await;
            }

            let mut coordinator = Coordinator::new(host.clone(), CoordinatorSettings::default());
            let snapshot = coordinator.rebuild().await.unwrap();

            let host_tabs = host.tabs();
            prop_assert_eq!(snapshot.tabs(), host_tabs.as_slice());

            let ids: HashSet<TabId> = snapshot.ids().into_iter().collect();
            prop_assert_eq!(ids.len(), snapshot.len());

            let mut active_per_window: HashMap<WindowId, usize> = HashMap::new();
            let mut unpinned_seen: HashSet<WindowId> = HashSet::new();
            for tab in snapshot.tabs() {
                *active_per_window.entry(tab.window_id).or_default() += usize::from(tab.active);
                if tab.pinned {
                    prop_assert!(!unpinned_seen.contains(&tab.window_id), "pinned tab {} after unpinned", tab.id);
                } else {
                    unpinned_seen.insert(tab.window_id);
                }
            }
            for (window, active) in &active_per_window {
                prop_assert_eq!(*active, 1, "window {}", window);
            }

            // Windows appear as contiguous runs.
            let mut seen: Vec<WindowId> = Vec::new();
            for tab in snapshot.tabs() {
                if seen.last() != Some(&tab.window_id) {
                    prop_assert!(!seen.contains(&tab.window_id));
                    seen.push(tab.window_id);
                }
            }
            Ok(())
        })?;
    }
}
