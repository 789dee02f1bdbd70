//! Property-based tests for broadcast debouncing.
//!
//! These tests verify trailing-edge coalescing: a broadcast runs only after a
//! full quiet period, and a burst of events shorter than the delay yields
//! exactly one rebuild+broadcast cycle.

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use tabrail::coordinator::Coordinator;
use tabrail::host::memory_host::MemoryHost;
use tabrail::host::{HostEvent, TabEventKind};
use tabrail::managers::broadcast_scheduler::{Clock, Debouncer, ManualClock};
use tabrail::types::protocol::SenderTab;
use tabrail::types::settings::CoordinatorSettings;
use tabrail::types::tab::{TabId, WindowId};

const DELAY_MS: u64 = 80;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

// **Property 1: Fires exactly once per quiet period**
//
// *For any* sequence of schedule calls separated by arbitrary gaps, the
// debouncer fires once for every gap of at least the delay, plus once after
// the final call if it was still pending.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn debouncer_fires_once_per_quiet_period(gaps in prop::collection::vec(0u64..200, 1..40)) {
        let clock = ManualClock::new();
        let mut debouncer = Debouncer::new(Duration::from_millis(DELAY_MS));
        let mut fires = 0u64;

        for gap in &gaps {
            debouncer.schedule(clock.now());
            clock.advance(Duration::from_millis(*gap));
            if debouncer.take_due(clock.now()) {
                fires += 1;
            }
        }
        clock.advance(Duration::from_millis(DELAY_MS));
        if debouncer.take_due(clock.now()) {
            fires += 1;
        }

        let quiet_gaps = gaps.iter().filter(|g| **g >= DELAY_MS).count() as u64;
        let trailing = u64::from(*gaps.last().unwrap() < DELAY_MS);
        prop_assert_eq!(fires, quiet_gaps + trailing);
        prop_assert_eq!(debouncer.fired(), fires);
        prop_assert!(!debouncer.is_pending());
    }
}

// **Property 2: Bursts coalesce into one broadcast**
//
// *For any* burst of tab events whose spacing stays below the delay, the
// coordinator performs exactly one host query and one delivery per live page
// once the burst settles.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn event_burst_yields_single_broadcast(spacing in prop::collection::vec(0u64..DELAY_MS, 1..30)) {
        let rt = runtime();
        rt.block_on(async {
            let host = MemoryHost::new();
            let tab = host.create_tab(WindowId(1), "https://live.example", true);
            host.attach_overlay(tab);
            let clock = ManualClock::new();
            let mut coordinator = Coordinator::new(host.clone(), CoordinatorSettings::default())
                .with_clock(Arc::new(clock.clone()));
            coordinator.register_live(&SenderTab {
                id: tab,
                window_id: Some(WindowId(1)),
                url: Some("https://live.example".to_string()),
            });

            for gap in &spacing {
                coordinator
                    .handle_host_event(HostEvent::Tab { kind: TabEventKind::Updated, tab_id: Some(TabId(1)) })
                    .await;
                clock.advance(Duration::from_millis(*gap));
                prop_assert!(coordinator.fire_due_broadcast().await.is_none());
            }
            clock.advance(Duration::from_millis(DELAY_MS));
            prop_assert!(coordinator.fire_due_broadcast().await.is_some());

            let journal = host.journal();
            prop_assert_eq!(journal.list_calls, 1);
            prop_assert_eq!(journal.delivered_to(tab).len(), 1);
            Ok(())
        })?;
    }
}
