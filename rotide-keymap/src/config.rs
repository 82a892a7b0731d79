//! Configuration for rotide.
//!
//! Configuration is loaded from `$ROTIDE_CONFIG` when set, otherwise from
//! `~/.config/rotide/rotide.toml`, and provides engine, logging, and key
//! binding settings.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use etcetera::base_strategy::{choose_base_strategy, BaseStrategy};
use serde::Deserialize;

use crate::error::KeyParseError;
use crate::key::KeyCode;

/// Environment variable that overrides the configuration file path.
pub const CONFIG_ENV: &str = "ROTIDE_CONFIG";

/// Top-level configuration loaded from `rotide.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RotideConfig {
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
    /// Key description → builtin command name. Merged over the default keys.
    pub keys: BTreeMap<String, String>,
}

/// Dispatch engine settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Start the session in insert mode.
    pub insert_mode: bool,
    /// Key description that opens the command line. Empty disables it.
    pub command_key: String,
    /// Terminal row for the status line; `None` redraws in place.
    pub status_row: Option<u16>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_file: Option<PathBuf>,
    pub level: String,
    pub suppressed_patterns: Vec<String>,
    /// Log every keystroke at trace level. Off unless asked for, since it
    /// records everything typed.
    pub log_keys: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            insert_mode: false,
            command_key: ":".to_string(),
            status_row: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: Some(std::env::temp_dir().join("rotide.log")),
            level: "info".to_string(),
            suppressed_patterns: Vec::new(),
            log_keys: false,
        }
    }
}

impl EngineConfig {
    /// The parsed command key, or `None` when disabled.
    pub fn command_key(&self) -> Result<Option<KeyCode>, KeyParseError> {
        let desc = self.command_key.trim();
        if desc.is_empty() {
            return Ok(None);
        }
        desc.parse().map(Some)
    }
}

impl RotideConfig {
    /// Path of the configuration file: `$ROTIDE_CONFIG`, else the user
    /// config directory.
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let strategy = choose_base_strategy()?;
        Ok(strategy.config_dir().join("rotide").join("rotide.toml"))
    }

    /// Load configuration from the default location.
    ///
    /// Falls back to defaults if the file doesn't exist.
    /// Returns an error only if the file exists but is malformed.
    pub fn load_default() -> Result<Self> {
        let config_path = Self::default_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str::<RotideConfig>(&content)?;
        Ok(config)
    }

    /// Start in insert mode.
    #[must_use]
    pub fn with_insert_mode(mut self, enabled: bool) -> Self {
        self.engine.insert_mode = enabled;
        self
    }

    /// Set the command-line key description (empty disables it).
    #[must_use]
    pub fn with_command_key(mut self, desc: impl Into<String>) -> Self {
        self.engine.command_key = desc.into();
        self
    }

    /// Draw the status line at a fixed terminal row.
    #[must_use]
    pub fn with_status_row(mut self, row: u16) -> Self {
        self.engine.status_row = Some(row);
        self
    }

    /// Bind a key description to a builtin command.
    #[must_use]
    pub fn with_key(mut self, desc: impl Into<String>, command: impl Into<String>) -> Self {
        self.keys.insert(desc.into(), command.into());
        self
    }

    /// Set the log file path.
    #[must_use]
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.logging.log_file = Some(path.into());
        self
    }

    /// Set the log level (e.g., "info", "debug", "warn").
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.logging.level = level.into();
        self
    }
}
