//! Unit tests for the snapshot cache and snapshot flattening.

use tabrail::managers::snapshot_cache::SnapshotCache;
use tabrail::types::tab::{HostWindow, Snapshot, TabId, TabRecord, WindowId};

fn tab(id: u64, window: u64, pinned: bool) -> TabRecord {
    TabRecord {
        id: TabId(id),
        window_id: WindowId(window),
        title: format!("Tab {}", id),
        url: format!("https://example.com/{}", id),
        fav_icon_url: None,
        active: false,
        pinned,
    }
}

#[test]
fn test_empty_before_first_store() {
    let cache = SnapshotCache::new();
    assert!(cache.get().is_empty());
    assert_eq!(cache.generation(), 0);
}

#[test]
fn test_store_windows_flattens_in_window_order() {
    let mut cache = SnapshotCache::new();
    let windows = vec![
        HostWindow { id: WindowId(1), tabs: vec![tab(1, 1, false), tab(3, 1, false)] },
        HostWindow { id: WindowId(2), tabs: vec![tab(2, 2, false)] },
    ];
    let snapshot = cache.store_windows(windows);
    assert_eq!(snapshot.ids(), vec![TabId(1), TabId(3), TabId(2)]);
    assert_eq!(cache.generation(), 1);
}

#[test]
fn test_store_replaces_wholesale() {
    let mut cache = SnapshotCache::new();
    cache.store(Snapshot::new(vec![tab(1, 1, false), tab(2, 1, false)]));
    cache.store(Snapshot::new(vec![tab(5, 1, true)]));

    assert_eq!(cache.get().ids(), vec![TabId(5)]);
    assert!(cache.get().get(TabId(1)).is_none());
    assert_eq!(cache.generation(), 2);
}

#[test]
fn test_window_tabs_filters_by_window() {
    let snapshot = Snapshot::new(vec![tab(1, 1, false), tab(2, 2, false), tab(3, 1, false)]);
    let ids: Vec<TabId> = snapshot.window_tabs(WindowId(1)).iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![TabId(1), TabId(3)]);
    assert!(snapshot.window_tabs(WindowId(9)).is_empty());
}

#[test]
fn test_snapshot_serializes_as_plain_array_with_host_field_names() {
    let mut record = tab(7, 2, true);
    record.fav_icon_url = Some("https://example.com/favicon.ico".to_string());
    let snapshot = Snapshot::new(vec![record]);

    let value = serde_json::to_value(&snapshot).unwrap();
    let first = &value.as_array().unwrap()[0];
    assert_eq!(first["id"], 7);
    assert_eq!(first["windowId"], 2);
    assert_eq!(first["favIconUrl"], "https://example.com/favicon.ico");
    assert_eq!(first["pinned"], true);
}

#[test]
fn test_tab_record_tolerates_missing_optional_fields() {
    let record: TabRecord = serde_json::from_str(r#"{"id":4,"windowId":1}"#).unwrap();
    assert_eq!(record.id, TabId(4));
    assert_eq!(record.title, "");
    assert!(record.fav_icon_url.is_none());
    assert!(!record.active);
}
