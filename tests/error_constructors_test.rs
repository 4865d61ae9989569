use elvia::error::ElviaError;

#[test]
fn error_constructors_group_1() {
    assert!(matches!(ElviaError::config("x"), ElviaError::Config { .. }));
    assert!(matches!(
        ElviaError::network("x"),
        ElviaError::Network { .. }
    ));
    assert!(matches!(ElviaError::api("x"), ElviaError::Api { .. }));
    assert!(matches!(ElviaError::auth("x"), ElviaError::Auth { .. }));
}

#[test]
fn error_constructors_group_2() {
    assert!(matches!(
        ElviaError::timeout("x"),
        ElviaError::Timeout { .. }
    ));
    assert!(matches!(
        ElviaError::serialization("x"),
        ElviaError::Serialization { .. }
    ));
    assert!(matches!(
        ElviaError::structure("x"),
        ElviaError::Structure { .. }
    ));
    assert!(matches!(
        ElviaError::validation("f", "m"),
        ElviaError::Validation { .. }
    ));
    assert!(matches!(ElviaError::io("x"), ElviaError::Io { .. }));
}

#[test]
fn fetch_failures_are_classified() {
    assert!(ElviaError::timeout("x").is_fetch_failure());
    assert!(ElviaError::serialization("x").is_fetch_failure());
    assert!(!ElviaError::structure("x").is_fetch_failure());
    assert!(!ElviaError::config("x").is_fetch_failure());
}

#[test]
fn conversions() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(
        ElviaError::from(json_err),
        ElviaError::Serialization { .. }
    ));

    let tz_err = "Not/AZone".parse::<chrono_tz::Tz>().unwrap_err();
    let e = ElviaError::from(tz_err);
    assert!(matches!(e, ElviaError::Validation { ref field, .. } if field == "timezone"));
}

#[test]
fn display_messages() {
    let e = ElviaError::validation("field", "bad");
    let s = format!("{}", e);
    assert!(s.contains("Validation error"));
    assert!(s.contains("field"));
}
