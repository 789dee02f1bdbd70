//! Property-based tests for page eligibility.
//!
//! Only http(s) pages may ever be probed, injected or registered as live.

use proptest::prelude::*;
use tabrail::coordinator::Coordinator;
use tabrail::host::memory_host::MemoryHost;
use tabrail::host::{HostEvent, InjectionTrigger};
use tabrail::services::url_matching::{is_eligible_url, url_matches_any, ELIGIBLE_PATTERNS};
use tabrail::types::protocol::SenderTab;
use tabrail::types::settings::CoordinatorSettings;
use tabrail::types::tab::WindowId;

fn arb_scheme() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("http".to_string()),
        Just("https".to_string()),
        Just("HTTPS".to_string()),
        Just("chrome".to_string()),
        Just("chrome-extension".to_string()),
        Just("file".to_string()),
        Just("ftp".to_string()),
        Just("edge".to_string()),
        Just("ws".to_string()),
    ]
}

fn arb_url() -> impl Strategy<Value = (String, String)> {
    (arb_scheme(), "[a-z]{1,10}(\\.[a-z]{2,5}){0,2}", "(/[a-z0-9]{0,8}){0,3}")
        .prop_map(|(scheme, host, path)| (scheme.clone(), format!("{}://{}{}", scheme, host, path)))
}

fn expect_eligible(scheme: &str) -> bool {
    matches!(scheme.to_ascii_lowercase().as_str(), "http" | "https")
}

// **Property 3: Eligibility is decided by scheme alone**
//
// *For any* URL, the page is eligible exactly when its scheme is http or
// https, and the host query patterns agree with that decision.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn eligibility_follows_scheme((scheme, url) in arb_url()) {
        prop_assert_eq!(is_eligible_url(&url), expect_eligible(&scheme));
        prop_assert_eq!(url_matches_any(&url, &ELIGIBLE_PATTERNS), expect_eligible(&scheme));
    }
}

// **Property 4: Ineligible pages are never touched**
//
// *For any* mix of open pages, an injection sweep probes and injects only
// the eligible ones, and liveness from ineligible senders is never recorded.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn sweep_touches_only_eligible_pages(urls in prop::collection::vec(arb_url(), 1..12)) {
        let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        rt.block_on(async {
            let host = MemoryHost::new();
            let tabs: Vec<_> = urls
                .iter()
                .map(|(_, url)| (host.create_tab(WindowId(1), url, false), url.clone()))
                .collect();
            let mut coordinator = Coordinator::new(host.clone(), CoordinatorSettings::default());

            coordinator.handle_host_event(HostEvent::Lifecycle(InjectionTrigger::ManualTrigger)).await;

            let journal = host.journal();
            for (tab_id, url) in &tabs {
                let eligible = is_eligible_url(url);
                prop_assert_eq!(journal.probes.contains(tab_id), eligible);
                prop_assert_eq!(host.rail_count(*tab_id), usize::from(eligible));

                let sender = SenderTab { id: *tab_id, window_id: Some(WindowId(1)), url: Some(url.clone()) };
                coordinator.register_live(&sender);
                prop_assert_eq!(coordinator.registry().is_live(*tab_id), eligible);
            }
            Ok(())
        })?;
    }
}
