/*!
 * Tests for configuration loading, saving and validation
 */

use anyhow::Result;
use linguadeck::app_config::{Config, LogLevel};
use log::LevelFilter;
use tempfile::TempDir;

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefault() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("nested").join("linguadeck.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    assert_eq!(config, Config::default());
    Ok(())
}

#[test]
fn test_save_thenLoad_shouldPreserveValues() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("linguadeck.json");
    let mut config = Config::default();
    config.database_path = Some(dir.path().join("lessons.db"));
    config.synthesis.rate = -20;
    config.http.timeout_secs = 30;
    config.log_level = LogLevel::Debug;

    config.save(&path)?;
    let loaded = Config::load_or_create(&path)?;

    assert_eq!(loaded, config);
    Ok(())
}

#[test]
fn test_loadOrCreate_withInvalidJson_shouldFail() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json")?;

    let result = Config::load_or_create(&path);

    assert!(result.is_err());
    assert!(format!("{:#}", result.unwrap_err()).contains("Failed to parse config file"));
    Ok(())
}

#[test]
fn test_validate_withZeroTimeout_shouldFail() {
    let mut config = Config::default();
    config.http.timeout_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withOutOfRangeSynthesis_shouldNameField() {
    let mut config = Config::default();
    config.synthesis.volume = 150;

    let err = config.validate().unwrap_err();

    assert!(err.to_string().contains("volume"));
}

#[test]
fn test_logLevel_shouldMapToFilter() {
    assert_eq!(LogLevel::Error.to_level_filter(), LevelFilter::Error);
    assert_eq!(LogLevel::default().to_level_filter(), LevelFilter::Info);
    assert_eq!(LogLevel::Trace.to_level_filter(), LevelFilter::Trace);
}

#[test]
fn test_logLevel_shouldDeserializeLowercase() -> Result<()> {
    let config: Config = serde_json::from_str(r#"{"log_level": "warn"}"#)?;
    assert_eq!(config.log_level, LogLevel::Warn);
    Ok(())
}
