//! Loading builder settings from JSON.

#![cfg(feature = "serde")]

use odata_uri::{
    DEFAULT_MAX_INPUT_LENGTH, DEFAULT_MAX_NESTING_DEPTH, KeyDelimiterStyle, UriBuilderSettings,
    build,
};

#[test]
fn defaults_fill_missing_limits() {
    let json = r#"{ "service_root": "http://gobbledygook/" }"#;
    let settings: UriBuilderSettings = serde_json::from_str(json).unwrap();

    assert_eq!(settings.max_nesting_depth, DEFAULT_MAX_NESTING_DEPTH);
    assert_eq!(settings.max_input_length, DEFAULT_MAX_INPUT_LENGTH);
    assert_eq!(settings, UriBuilderSettings::new("http://gobbledygook/"));
}

#[test]
fn explicit_limits_apply() {
    let json = r#"{
        "service_root": "https://example.com/odata",
        "max_nesting_depth": 2,
        "max_input_length": 64
    }"#;
    let settings: UriBuilderSettings = serde_json::from_str(json).unwrap();

    assert!(build("People?$filter=(((A)))", KeyDelimiterStyle::Parentheses, &settings).is_err());
    assert!(build("People?$filter=A", KeyDelimiterStyle::Parentheses, &settings).is_ok());
}

#[test]
fn settings_roundtrip() {
    let settings = UriBuilderSettings::new("http://gobbledygook/").with_max_nesting_depth(8);
    let json = serde_json::to_string(&settings).unwrap();
    let back: UriBuilderSettings = serde_json::from_str(&json).unwrap();
    assert_eq!(back, settings);
}

#[test]
fn key_style_is_lowercase() {
    assert_eq!(serde_json::to_string(&KeyDelimiterStyle::Slash).unwrap(), "\"slash\"");
    let style: KeyDelimiterStyle = serde_json::from_str("\"parentheses\"").unwrap();
    assert_eq!(style, KeyDelimiterStyle::Parentheses);
}

#[test]
fn canonical_uri_serializes_as_string() {
    let settings = UriBuilderSettings::new("http://gobbledygook/");
    let uri = build("People/$count", KeyDelimiterStyle::Parentheses, &settings).unwrap();
    assert_eq!(
        serde_json::to_string(&uri).unwrap(),
        "\"http://gobbledygook/People/$count\""
    );
}
