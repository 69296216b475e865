//! Engine configuration (`config.toml`)
//!
//! Loading, saving, and defaults for netplay, input, command and runtime
//! settings. Settings are stored in TOML format in the platform-specific
//! config directory. Every field has a default, so an empty or partial file
//! is valid.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rollcade_shared::{AXIS_THRESHOLD, DEFAULT_FPS};
use serde::{Deserialize, Serialize};

use crate::command::{DEFAULT_BUFFER_TIME, DEFAULT_COMMAND_TIME};
use crate::input::KeyConfig;
use crate::rollback::{
    DEFAULT_CHECK_DISTANCE, DEFAULT_FRAMES_TO_SPREAD_WAIT, DEFAULT_INPUT_DELAY,
    DEFAULT_NETPLAY_PORT, DEFAULT_ONLINE_INPUT_DELAY, MAX_ROLLBACK_FRAMES, SessionConfig,
};
use crate::runtime::RuntimeConfig;

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to access config file: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to write config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Engine configuration.
///
/// Contains all user-configurable settings organized into sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub netplay: NetplayConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub commands: CommandConfig,
    #[serde(default)]
    pub runtime: RuntimeSection,
}

/// Rollback and transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetplayConfig {
    /// Local input delay in frames. Unset uses 2 online and 0 locally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_delay: Option<usize>,
    #[serde(default = "default_max_prediction_frames")]
    pub max_prediction_frames: usize,
    #[serde(default = "default_disconnect_timeout_ms")]
    pub disconnect_timeout_ms: u64,
    #[serde(default = "default_disconnect_notify_start_ms")]
    pub disconnect_notify_start_ms: u64,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_frames_to_spread_wait")]
    pub frames_to_spread_wait: u32,
    /// Clamped below `max_prediction_frames`
    #[serde(default = "default_check_distance")]
    pub sync_test_check_distance: usize,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Local pad bindings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// One entry per local device slot
    #[serde(default = "default_keys")]
    pub keys: Vec<KeyConfig>,
    #[serde(default = "default_axis_threshold")]
    pub axis_threshold: f32,
}

/// Command recognizer defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Frames a whole command may take
    #[serde(default = "default_command_time")]
    pub default_time: i32,
    /// Frames a completed command stays active
    #[serde(default = "default_buffer_time")]
    pub default_buffer_time: i32,
}

/// `[runtime]` section of the file; see [`RuntimeConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeSection {
    #[serde(default = "default_fps")]
    pub tick_rate: u32,
    #[serde(default = "default_max_delta_ms")]
    pub max_delta_ms: u64,
    #[serde(default = "default_cpu_budget_us")]
    pub cpu_budget_us: u64,
}

fn default_max_prediction_frames() -> usize {
    MAX_ROLLBACK_FRAMES
}
fn default_disconnect_timeout_ms() -> u64 {
    3000
}
fn default_disconnect_notify_start_ms() -> u64 {
    1000
}
fn default_fps() -> u32 {
    DEFAULT_FPS
}
fn default_frames_to_spread_wait() -> u32 {
    DEFAULT_FRAMES_TO_SPREAD_WAIT
}
fn default_check_distance() -> usize {
    DEFAULT_CHECK_DISTANCE
}
fn default_port() -> u16 {
    DEFAULT_NETPLAY_PORT
}

fn default_keys() -> Vec<KeyConfig> {
    vec![KeyConfig::default(), KeyConfig::joystick(0)]
}
fn default_axis_threshold() -> f32 {
    AXIS_THRESHOLD
}

fn default_command_time() -> i32 {
    DEFAULT_COMMAND_TIME
}
fn default_buffer_time() -> i32 {
    DEFAULT_BUFFER_TIME
}

fn default_max_delta_ms() -> u64 {
    100
}
fn default_cpu_budget_us() -> u64 {
    4000
}

impl Default for NetplayConfig {
    fn default() -> Self {
        Self {
            input_delay: None,
            max_prediction_frames: default_max_prediction_frames(),
            disconnect_timeout_ms: default_disconnect_timeout_ms(),
            disconnect_notify_start_ms: default_disconnect_notify_start_ms(),
            fps: default_fps(),
            frames_to_spread_wait: default_frames_to_spread_wait(),
            sync_test_check_distance: default_check_distance(),
            port: default_port(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            keys: default_keys(),
            axis_threshold: default_axis_threshold(),
        }
    }
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            default_time: default_command_time(),
            default_buffer_time: default_buffer_time(),
        }
    }
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            tick_rate: default_fps(),
            max_delta_ms: default_max_delta_ms(),
            cpu_budget_us: default_cpu_budget_us(),
        }
    }
}

impl NetplayConfig {
    fn base(&self, num_players: usize, default_delay: usize) -> SessionConfig {
        SessionConfig {
            num_players,
            input_delay: self.input_delay.unwrap_or(default_delay),
            max_prediction_frames: self.max_prediction_frames.max(1),
            disconnect_timeout: self.disconnect_timeout_ms,
            disconnect_notify_start: self.disconnect_notify_start_ms,
            fps: self.fps as usize,
            check_distance: self.sync_test_check_distance,
            frames_to_spread_wait: self.frames_to_spread_wait,
        }
    }

    /// Session settings for local play
    pub fn local_session(&self, num_players: usize) -> SessionConfig {
        self.base(num_players, DEFAULT_INPUT_DELAY)
    }

    /// Session settings for P2P play
    pub fn online_session(&self, num_players: usize) -> SessionConfig {
        self.base(num_players, DEFAULT_ONLINE_INPUT_DELAY)
    }

    /// Session settings for a sync test, check distance clamped to the
    /// prediction window
    pub fn sync_test_session(&self, num_players: usize) -> SessionConfig {
        let config = self.base(num_players, DEFAULT_INPUT_DELAY);
        let distance = config.effective_check_distance();
        config.with_check_distance(distance)
    }
}

impl From<RuntimeSection> for RuntimeConfig {
    fn from(section: RuntimeSection) -> Self {
        Self {
            tick_rate: section.tick_rate,
            max_delta: Duration::from_millis(section.max_delta_ms),
            cpu_budget: Duration::from_micros(section.cpu_budget_us),
        }
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\Rollcade\config`
/// On macOS: `~/Library/Application Support/io.rollcade.Rollcade`
/// On Linux: `~/.config/rollcade`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.rollcade", "", "Rollcade")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Path of `config.toml` in [`config_dir`]
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Loads the configuration from the platform's configuration directory.
///
/// A missing file or an unknown home directory yields the defaults.
pub fn load() -> Result<EngineConfig, ConfigError> {
    match config_path() {
        Some(path) => load_from(&path),
        None => Ok(EngineConfig::default()),
    }
}

/// Loads the configuration from `path`. A missing file yields the defaults.
pub fn load_from(path: &Path) -> Result<EngineConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(EngineConfig::default());
        }
        Err(e) => return Err(e.into()),
    };
    Ok(toml::from_str(&content)?)
}

/// Saves the configuration to the platform's configuration directory.
///
/// Creates the directory if it doesn't exist. Returns the written path, or
/// `None` when there is no home directory to write to.
pub fn save(config: &EngineConfig) -> Result<Option<PathBuf>, ConfigError> {
    let Some(path) = config_path() else {
        return Ok(None);
    };
    save_to(&path, config)?;
    Ok(Some(path))
}

pub fn save_to(path: &Path, config: &EngineConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.netplay.max_prediction_frames, 8);
        assert_eq!(config.netplay.disconnect_timeout_ms, 3000);
        assert_eq!(config.netplay.disconnect_notify_start_ms, 1000);
        assert_eq!(config.netplay.fps, 60);
        assert_eq!(config.netplay.frames_to_spread_wait, 200);
        assert_eq!(config.input.axis_threshold, 0.1);
        assert_eq!(config.commands.default_time, 15);
        assert_eq!(config.commands.default_buffer_time, 1);
        assert_eq!(config.runtime.tick_rate, 60);
    }

    #[test]
    fn test_partial_sections() {
        let config: EngineConfig = toml::from_str(
            r#"
            [netplay]
            input_delay = 4

            [commands]
            default_time = 20

            [[input.keys]]
            joy = 1
            up = -3
            down = -4
            left = -1
            right = -2
            a = 0
            b = 1
            c = 4
            x = 2
            y = 3
            z = 5
            start = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.netplay.input_delay, Some(4));
        assert_eq!(config.netplay.max_prediction_frames, 8);
        assert_eq!(config.commands.default_time, 20);
        assert_eq!(config.commands.default_buffer_time, 1);
        assert_eq!(config.input.keys, vec![KeyConfig::joystick(1)]);
        assert_eq!(config.runtime, RuntimeSection::default());
    }

    #[test]
    fn test_session_configs() {
        let netplay = NetplayConfig::default();
        assert_eq!(netplay.local_session(2).input_delay, 0);
        assert_eq!(netplay.online_session(2).input_delay, 2);

        let netplay = NetplayConfig {
            input_delay: Some(3),
            sync_test_check_distance: 20,
            ..Default::default()
        };
        assert_eq!(netplay.online_session(2).input_delay, 3);
        assert_eq!(netplay.sync_test_session(2).check_distance, 7);
    }

    #[test]
    fn test_runtime_section_converts() {
        let runtime: RuntimeConfig = RuntimeSection::default().into();
        assert_eq!(runtime, RuntimeConfig::default());
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = EngineConfig::default();
        config.netplay.input_delay = Some(1);
        config.netplay.port = 7100;
        config.runtime.cpu_budget_us = 2500;
        save_to(&path, &config).unwrap();

        assert_eq!(load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[netplay]\nfps = \"fast\"\n").unwrap();
        assert!(matches!(load_from(&path), Err(ConfigError::Parse(_))));
    }
}
