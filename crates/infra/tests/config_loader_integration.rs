//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use hisris_domain::HisRisError;
use hisris_infra::config;
use tempfile::NamedTempFile;

fn config_file(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("hisris-config-")
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(contents.as_bytes()).expect("Failed to write to temp file");
    file
}

#[test]
fn test_load_config_from_json_file() {
    let file = config_file(
        ".json",
        r#"{
            "api": {
                "base_url": "https://ris.example.org/api/v1",
                "timeout_secs": 15,
                "user_agent": "ris-desk/1.4"
            },
            "session": {
                "persist_path": "/var/lib/ris-desk/session.json"
            },
            "logging": {
                "level": "hisris_infra=debug",
                "json": true
            }
        }"#,
    );

    let config = config::load_from_file(Some(file.path().to_path_buf()))
        .expect("Failed to load config from JSON file");

    assert_eq!(config.api.base_url, "https://ris.example.org/api/v1");
    assert_eq!(config.api.timeout(), Duration::from_secs(15));
    assert_eq!(config.api.user_agent, "ris-desk/1.4");
    assert_eq!(
        config.session.persist_path,
        Some(PathBuf::from("/var/lib/ris-desk/session.json"))
    );
    assert_eq!(config.logging.level, "hisris_infra=debug");
    assert!(config.logging.json);
}

#[test]
fn test_load_config_from_toml_file() {
    let file = config_file(
        ".toml",
        r#"
[api]
base_url = "http://localhost:8000/api/v1"
timeout_secs = 5

[logging]
level = "warn"
"#,
    );

    let config = config::load_from_file(Some(file.path().to_path_buf()))
        .expect("Failed to load config from TOML file");

    assert_eq!(config.api.base_url, "http://localhost:8000/api/v1");
    assert_eq!(config.api.timeout_secs, 5);
    assert!(config.session.persist_path.is_none());
    assert_eq!(config.logging.level, "warn");
    assert!(!config.logging.json);
}

#[test]
fn test_load_config_with_minimal_fields() {
    let file = config_file(".json", r#"{ "api": { "base_url": "https://his.example.org/api/v1" } }"#);

    let config = config::load_from_file(Some(file.path().to_path_buf()))
        .expect("Failed to load config with minimal fields");

    assert_eq!(config.api.base_url, "https://his.example.org/api/v1");
    assert_eq!(config.api.timeout_secs, hisris_domain::constants::DEFAULT_TIMEOUT_SECS);
    assert!(config.session.persist_path.is_none());
}

#[test]
fn test_load_config_from_nonexistent_file() {
    let result = config::load_from_file(Some("/nonexistent/path/config.json".into()));

    match result {
        Err(HisRisError::Config(msg)) => {
            assert!(msg.contains("not found"), "Error message should mention 'not found'");
        }
        other => panic!("Expected Config error, got {other:?}"),
    }
}

#[test]
fn test_load_config_with_invalid_format() {
    let file = config_file(".json", r#"{ "api": { "base_url": "#);

    match config::load_from_file(Some(file.path().to_path_buf())) {
        Err(HisRisError::Config(msg)) => {
            assert!(msg.contains("Invalid JSON"), "Error message should mention invalid JSON");
        }
        other => panic!("Expected Config error, got {other:?}"),
    }
}

#[test]
fn test_load_config_rejects_non_http_base_url() {
    let file = config_file(
        ".toml",
        r#"
[api]
base_url = "ftp://ris.example.org/api/v1"
"#,
    );

    match config::load_from_file(Some(file.path().to_path_buf())) {
        Err(HisRisError::Config(msg)) => assert!(msg.contains("http or https"), "{msg}"),
        other => panic!("Expected Config error, got {other:?}"),
    }
}

#[test]
fn test_load_config_rejects_zero_timeout() {
    let file = config_file(
        ".json",
        r#"{ "api": { "base_url": "https://ris.example.org/api/v1", "timeout_secs": 0 } }"#,
    );

    let err = config::load_from_file(Some(file.path().to_path_buf())).unwrap_err();

    assert!(matches!(err, HisRisError::Config(ref m) if m.contains("timeout")));
}
