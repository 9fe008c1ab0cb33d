//! Configuration loading, validation, and management for turnwright.
//!
//! Loads configuration from `~/.turnwright/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use turnwright_core::{GenerationMode, ViewMode};

/// The root configuration structure.
///
/// Maps directly to `~/.turnwright/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// System prompt handed to the researcher and writer agents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// Answer generation settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Projection settings
    #[serde(default)]
    pub view: ViewConfig,

    /// Chat store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Identity settings
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default)]
    pub mode: GenerationMode,

    /// Context window in general mode
    #[serde(default = "default_general_window")]
    pub general_window: usize,

    /// Context window in specific mode
    #[serde(default = "default_specific_window")]
    pub specific_window: usize,

    /// Researcher attempts per turn in general mode
    #[serde(default = "default_max_research_attempts")]
    pub max_research_attempts: u32,

    /// Delay between the last UI fragment and the commit
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

fn default_general_window() -> usize {
    10
}
fn default_specific_window() -> usize {
    5
}
fn default_max_research_attempts() -> u32 {
    10
}
fn default_settle_ms() -> u64 {
    500
}

impl GenerationConfig {
    /// Context window for the configured mode.
    pub fn window(&self) -> usize {
        match self.mode {
            GenerationMode::General => self.general_window,
            GenerationMode::Specific => self.specific_window,
        }
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            mode: GenerationMode::default(),
            general_window: default_general_window(),
            specific_window: default_specific_window(),
            max_research_attempts: default_max_research_attempts(),
            settle_ms: default_settle_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub mode: ViewMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "memory" or "file"
    #[serde(default = "default_store_backend")]
    pub backend: String,

    /// Directory for the file backend (default: `~/.turnwright/chats`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_store_backend() -> String {
    "file".into()
}

impl StoreConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("chats"))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            path: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Static user identity; unset means unauthenticated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.turnwright/config.toml).
    ///
    /// Environment overrides:
    /// - `TURNWRIGHT_GENERATION_MODE` (`general` | `specific`)
    /// - `TURNWRIGHT_USE_SPECIFIC_WRITER=true` (forces specific mode)
    /// - `TURNWRIGHT_SYSTEM_PROMPT`
    /// - `TURNWRIGHT_USER_ID`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(mode) = lookup("TURNWRIGHT_GENERATION_MODE") {
            self.generation.mode = parse_generation_mode(&mode)?;
        }

        if lookup("TURNWRIGHT_USE_SPECIFIC_WRITER").is_some_and(|v| v.eq_ignore_ascii_case("true")) {
            self.generation.mode = GenerationMode::Specific;
        }

        if let Some(prompt) = lookup("TURNWRIGHT_SYSTEM_PROMPT") {
            self.system_prompt = Some(prompt);
        }

        if let Some(user) = lookup("TURNWRIGHT_USER_ID").filter(|u| !u.is_empty()) {
            self.session.user_id = Some(user);
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".turnwright")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.generation.general_window == 0 || self.generation.specific_window == 0 {
            return Err(ConfigError::ValidationError(
                "context windows must be at least 1 message".into(),
            ));
        }

        if self.generation.max_research_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "max_research_attempts must be at least 1".into(),
            ));
        }

        if !matches!(self.store.backend.as_str(), "memory" | "file") {
            return Err(ConfigError::ValidationError(format!(
                "unknown store backend '{}' (expected 'memory' or 'file')",
                self.store.backend
            )));
        }

        Ok(())
    }

    /// The system prompt, empty when unset.
    pub fn system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or_default()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

fn parse_generation_mode(raw: &str) -> Result<GenerationMode, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "general" => Ok(GenerationMode::General),
        "specific" => Ok(GenerationMode::Specific),
        other => Err(ConfigError::ValidationError(format!(
            "unknown generation mode '{other}' (expected 'general' or 'specific')"
        ))),
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
