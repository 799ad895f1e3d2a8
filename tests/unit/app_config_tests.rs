/*!
 * Tests for application configuration functionality
 */

use std::path::PathBuf;

use transync::app_config::{Config, LogLevel};

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert!(config.database.path.is_none());
    assert_eq!(config.import.checkpoint_interval, 50);
    assert!(config.import.notify_reviewers);
    assert_eq!(config.versions.development_prefix, "dev-");
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test that partial files fill the gaps with defaults
#[test]
fn test_config_fromPartialJson_shouldKeepOtherDefaults() {
    let json = r#"{
        "database": { "path": "/var/lib/transync/store.db" },
        "import": { "checkpoint_interval": 200 },
        "log_level": "warn"
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(
        config.database.path,
        Some(PathBuf::from("/var/lib/transync/store.db"))
    );
    assert_eq!(config.import.checkpoint_interval, 200);
    assert!(config.import.notify_reviewers);
    assert_eq!(config.log_level, LogLevel::Warn);

    let options = config.sync_options();
    assert_eq!(options.checkpoint_interval, 200);
    assert!(config.version_scheme().parse("dev-master").unwrap().development);
}

/// Test loading a configuration file from disk
#[test]
fn test_config_fromFile_withInvalidJson_shouldFail() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(Config::from_file(&path).is_err());
    assert!(Config::from_file(dir.path().join("missing.json")).is_err());
}
