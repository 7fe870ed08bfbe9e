/*!
 * Application configuration.
 *
 * Loads, validates and writes the editor and player settings kept in a
 * JSON file, `subsedit.json` unless the CLI names another.
 */

use anyhow::{anyhow, Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Media player settings
    #[serde(default)]
    pub player: PlayerConfig,

    /// Editing behavior settings
    #[serde(default)]
    pub editor: EditorConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// External media player configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlayerConfig {
    // @field: mpv executable name or path
    #[serde(default = "default_player_binary")]
    pub binary_path: String,

    // @field: IPC socket path handed to mpv
    #[serde(default = "default_socket_path")]
    pub socket_path: String,

    // @field: How long to wait for the IPC socket after spawning
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    // @field: How long to wait for a reply to one command
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,

    // @field: Additional mpv arguments
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            binary_path: default_player_binary(),
            socket_path: default_socket_path(),
            connect_timeout_secs: default_connect_timeout_secs(),
            command_timeout_secs: default_command_timeout_secs(),
            extra_args: Vec::new(),
        }
    }
}

/// Editing behavior configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EditorConfig {
    /// Milliseconds moved by one nudge
    #[serde(default = "default_nudge_step_ms")]
    pub nudge_step_ms: u64,

    /// Text of cues added at the playhead
    #[serde(default = "default_new_cue_text")]
    pub new_cue_text: String,

    /// Media duration assumed until the player reports one
    #[serde(default = "default_initial_duration_ms")]
    pub initial_duration_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            nudge_step_ms: default_nudge_step_ms(),
            new_cue_text: default_new_cue_text(),
            initial_duration_ms: default_initial_duration_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching log crate filter
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

fn default_player_binary() -> String {
    "mpv".to_string()
}

fn default_socket_path() -> String {
    "/tmp/subsedit-mpv.sock".to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_command_timeout_secs() -> u64 {
    5
}

fn default_nudge_step_ms() -> u64 {
    100
}

fn default_new_cue_text() -> String {
    "New subtitle!".to_string()
}

fn default_initial_duration_ms() -> u64 {
    30_000
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.player.binary_path.trim().is_empty() {
            return Err(anyhow!("Player binary path must not be empty"));
        }

        if self.player.socket_path.trim().is_empty() {
            return Err(anyhow!("Player socket path must not be empty"));
        }

        if self.player.connect_timeout_secs == 0 || self.player.command_timeout_secs == 0 {
            return Err(anyhow!("Player timeouts must be at least one second"));
        }

        if self.editor.nudge_step_ms == 0 {
            return Err(anyhow!("Nudge step must be greater than zero"));
        }

        Ok(())
    }

    /// Load the configuration file, or write the defaults there if it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;

            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }
}
