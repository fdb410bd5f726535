use std::fs;
use std::path::PathBuf;

use pageqa_core::config::DEFAULT_SERVICE_URL;
use pageqa_core::{Config, ConfigError, ServiceUrlSource, Suggestion, SuggestionCatalog};
use pretty_assertions::assert_eq;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_from(&dir.path().join("config.json")).unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(
        config.service_url_with(None),
        (DEFAULT_SERVICE_URL.to_string(), ServiceUrlSource::Default)
    );
}

#[test]
fn file_values_are_used() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{
            "service_url": "http://qa.example:8080",
            "log_file": "/tmp/pageqa-test.log",
            "suggestions": {
                "general": [{"label": "Hours", "prompt": "What are the opening hours?"}],
                "follow_up": [{"label": "Why", "prompt": "Why is that?"}]
            }
        }"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();

    assert_eq!(
        config.service_url_with(None),
        ("http://qa.example:8080".to_string(), ServiceUrlSource::ConfigFile)
    );
    assert_eq!(config.log_file(), PathBuf::from("/tmp/pageqa-test.log"));
    assert_eq!(
        config.suggestions(),
        SuggestionCatalog {
            general: vec![Suggestion::new("Hours", "What are the opening hours?")],
            follow_up: vec![Suggestion::new("Why", "Why is that?")],
        }
    );
}

#[test]
fn malformed_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{ service_url: nope").unwrap();

    let err = Config::load_from(&path).unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("config.json"));
}
