/*!
 * Tests for app configuration functionality
 */

use anyhow::Result;
use log::LevelFilter;
use subsedit::app_config::{Config, LogLevel};
use crate::common;

/// Test creating a default configuration
#[test]
fn test_default_config_shouldHaveExpectedValues() {
    let config = Config::default();

    assert_eq!(config.player.binary_path, "mpv");
    assert_eq!(config.player.socket_path, "/tmp/subsedit-mpv.sock");
    assert_eq!(config.player.connect_timeout_secs, 10);
    assert_eq!(config.player.command_timeout_secs, 5);
    assert!(config.player.extra_args.is_empty());
    assert_eq!(config.editor.nudge_step_ms, 100);
    assert_eq!(config.editor.new_cue_text, "New subtitle!");
    assert_eq!(config.editor.initial_duration_ms, 30_000);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withBrokenValues_shouldFail() {
    let mut config = Config::default();
    config.player.binary_path = "  ".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.player.command_timeout_secs = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.editor.nudge_step_ms = 0;
    assert!(config.validate().is_err());
}

/// Missing keys fall back to their defaults
#[test]
fn test_deserialize_withPartialJson_shouldFillDefaults() -> Result<()> {
    let config: Config = serde_json::from_str(
        r#"{"editor": {"nudge_step_ms": 40}, "log_level": "debug"}"#,
    )?;

    assert_eq!(config.editor.nudge_step_ms, 40);
    assert_eq!(config.editor.new_cue_text, "New subtitle!");
    assert_eq!(config.player.binary_path, "mpv");
    assert_eq!(config.log_level.to_level_filter(), LevelFilter::Debug);
    Ok(())
}

/// A missing file gets written with the defaults
#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("subsedit.json");

    let config = Config::load_or_create(&path)?;

    assert!(path.exists());
    assert_eq!(config.editor.nudge_step_ms, 100);

    let reloaded = Config::load_or_create(&path)?;
    assert_eq!(reloaded.player.socket_path, config.player.socket_path);
    Ok(())
}

#[test]
fn test_load_or_create_withExistingFile_shouldReadIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "custom.json",
        r#"{"player": {"binary_path": "/opt/mpv/bin/mpv", "extra_args": ["--no-audio"]}}"#,
    )?;

    let config = Config::load_or_create(&path)?;

    assert_eq!(config.player.binary_path, "/opt/mpv/bin/mpv");
    assert_eq!(config.player.extra_args, vec!["--no-audio".to_string()]);
    assert_eq!(config.player.connect_timeout_secs, 10);
    Ok(())
}

#[test]
fn test_load_or_create_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "broken.json", "{ not json")?;

    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}
