//! Property-based tests for coordinator settings persistence.

use proptest::prelude::*;
use tabrail::services::settings_engine::{validate, SettingsEngine, SettingsEngineTrait};
use tabrail::types::settings::{
    BridgeSettings, CoordinatorSettings, LoggingSettings, OverlaySettings, MAX_DEBOUNCE_MS,
};
use tempfile::TempDir;

fn arb_overlay_settings() -> impl Strategy<Value = OverlaySettings> {
    ("[a-z_]{1,12}\\.js", "[a-z_]{1,12}\\.css", "[A-Za-z_][A-Za-z0-9_-]{0,24}").prop_map(
        |(script, style, marker_element_id)| OverlaySettings { script, style, marker_element_id },
    )
}

fn arb_settings() -> impl Strategy<Value = CoordinatorSettings> {
    (
        0..=MAX_DEBOUNCE_MS,
        arb_overlay_settings(),
        any::<bool>(),
        1u64..=60_000,
        any::<bool>(),
    )
        .prop_map(|(debounce_ms, overlay, reread_pin_state, request_timeout_ms, debug)| {
            CoordinatorSettings {
                debounce_ms,
                overlay,
                reread_pin_state,
                bridge: BridgeSettings { request_timeout_ms },
                logging: LoggingSettings { debug },
            }
        })
}

// **Property 6: Settings serialization round-trip**
//
// *For any* valid `CoordinatorSettings`, serializing to JSON then
// deserializing produces an equivalent struct that still validates.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    #[test]
    fn settings_serialization_roundtrip(settings in arb_settings()) {
        let json = serde_json::to_string(&settings)
            .expect("Serialization to JSON should succeed for any valid CoordinatorSettings");

        let deserialized: CoordinatorSettings = serde_json::from_str(&json)
            .expect("Deserialization from JSON should succeed for valid JSON");

        prop_assert!(validate(&deserialized).is_ok());
        prop_assert_eq!(deserialized, settings);
    }
}

// **Property 7: Persisted settings survive a restart**
//
// *For any* valid debounce delay written through the engine, a new engine
// reading the same file loads the same value.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn set_value_survives_reload(debounce_ms in 0..=MAX_DEBOUNCE_MS, reread in any::<bool>()) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json").to_string_lossy().to_string();

        let mut engine = SettingsEngine::new(Some(path.clone()));
        engine.load().unwrap();
        engine.set_value("debounce_ms", serde_json::json!(debounce_ms)).unwrap();
        engine.set_value("reread_pin_state", serde_json::json!(reread)).unwrap();

        let mut reloaded = SettingsEngine::new(Some(path));
        let loaded = reloaded.load().unwrap();
        prop_assert_eq!(loaded.debounce_ms, debounce_ms);
        prop_assert_eq!(loaded.reread_pin_state, reread);
    }
}
