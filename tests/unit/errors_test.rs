use tabrail::types::errors::*;
use tabrail::types::tab::TabId;

// === HostError Tests ===

#[test]
fn host_error_display_variants() {
    assert_eq!(HostError::NoReceiver(TabId(4)).to_string(), "No receiver in tab: 4");
    assert_eq!(HostError::NoSuchTab(TabId(9)).to_string(), "No such tab: 9");
    assert_eq!(
        HostError::Restricted("chrome://settings".to_string()).to_string(),
        "Restricted page: chrome://settings"
    );
    assert_eq!(
        HostError::Unavailable("service worker starting".to_string()).to_string(),
        "Host unavailable: service worker starting"
    );
    assert_eq!(
        HostError::Timeout("tabs.update".to_string()).to_string(),
        "Host request timed out: tabs.update"
    );
    assert_eq!(HostError::Disconnected.to_string(), "Host disconnected");
    assert_eq!(
        HostError::Protocol("bad frame".to_string()).to_string(),
        "Host protocol error: bad frame"
    );
}

#[test]
fn host_error_routine_classes() {
    assert!(HostError::NoReceiver(TabId(1)).is_routine());
    assert!(HostError::NoSuchTab(TabId(1)).is_routine());
    assert!(HostError::Restricted("x".to_string()).is_routine());
    assert!(!HostError::Unavailable("x".to_string()).is_routine());
    assert!(!HostError::Timeout("x".to_string()).is_routine());
    assert!(!HostError::Disconnected.is_routine());
}

#[test]
fn host_error_classifies_host_messages() {
    assert_eq!(
        HostError::from_host_message(
            Some(TabId(3)),
            "Could not establish connection. Receiving end does not exist."
        ),
        HostError::NoReceiver(TabId(3))
    );
    assert_eq!(
        HostError::from_host_message(Some(TabId(3)), "No tab with id: 3."),
        HostError::NoSuchTab(TabId(3))
    );
    assert!(matches!(
        HostError::from_host_message(Some(TabId(3)), "Cannot access a chrome:// URL"),
        HostError::Restricted(_)
    ));
    assert!(matches!(
        HostError::from_host_message(None, "Extension context invalidated."),
        HostError::Unavailable(_)
    ));
}

#[test]
fn host_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> = Box::new(HostError::Disconnected);
    assert!(err.source().is_none());
}

// === SettingsError Tests ===

#[test]
fn settings_error_display_variants() {
    assert_eq!(
        SettingsError::IoError("disk full".to_string()).to_string(),
        "Settings I/O error: disk full"
    );
    assert_eq!(
        SettingsError::SerializationError("bad json".to_string()).to_string(),
        "Settings serialization error: bad json"
    );
    assert_eq!(
        SettingsError::InvalidKey("nope".to_string()).to_string(),
        "Invalid settings key: nope"
    );
    assert_eq!(
        SettingsError::InvalidValue("negative".to_string()).to_string(),
        "Invalid settings value: negative"
    );
}

// === ProtocolError Tests ===

#[test]
fn protocol_error_display_variants() {
    assert_eq!(
        ProtocolError::MalformedLine("eof".to_string()).to_string(),
        "Malformed bridge line: eof"
    );
    assert_eq!(
        ProtocolError::UnknownEvent("tabs.onZoom".to_string()).to_string(),
        "Unknown bridge event: tabs.onZoom"
    );
    assert_eq!(
        ProtocolError::MissingField("tabId".to_string()).to_string(),
        "Missing or invalid field: tabId"
    );
}

#[test]
fn all_errors_implement_std_error() {
    let errors: Vec<Box<dyn std::error::Error>> = vec![
        Box::new(HostError::NoReceiver(TabId(1))),
        Box::new(SettingsError::InvalidKey("k".to_string())),
        Box::new(ProtocolError::UnknownEvent("e".to_string())),
    ];
    for err in &errors {
        assert!(!err.to_string().is_empty());
    }
}
