//! Configuration management for the autocompleter

use crate::core::MergePolicy;
use crate::utils::errors::{AutocompleteError, ConfigError};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default completion endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/v1/completions";

/// Longest accepted debounce delay (seconds)
pub const MAX_DEBOUNCE_DELAY_SECS: f64 = 60.0;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Focus/edit coordination settings
    pub coordinator: CoordinatorConfig,
    /// Suggestion backend settings
    pub backend: BackendConfig,
    /// Clipboard-paste fallback settings
    pub injector: InjectorConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Quiet period after the last edit before a suggestion is requested (seconds)
    pub debounce_delay_secs: f64,
    /// How an accepted suggestion is merged with the field's text
    pub merge_policy: MergePolicy,
    /// Never track password/protected fields
    pub exclude_protected: bool,
}

/// Completion backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Completion endpoint. Empty or missing means the local stub is used.
    pub endpoint: Option<String>,
    /// Request timeout (seconds)
    pub timeout_secs: u64,
    /// Maximum tokens requested per suggestion
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Bearer token sent with each request
    pub api_key: Option<String>,
}

/// Fallback injector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectorConfig {
    /// Command simulating the paste keystroke; empty selects the platform default
    pub paste_command: Vec<String>,
    /// Wait after pasting before the clipboard is restored (milliseconds)
    pub paste_settle_ms: u64,
    /// Restore the previous clipboard content after pasting
    pub restore_clipboard: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            debounce_delay_secs: 0.5,
            merge_policy: MergePolicy::default(),
            exclude_protected: true,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: Some(DEFAULT_ENDPOINT.to_string()),
            timeout_secs: 5,
            max_tokens: 25,
            temperature: 0.7,
            api_key: None,
        }
    }
}

impl Default for InjectorConfig {
    fn default() -> Self {
        Self {
            paste_command: Vec::new(),
            paste_settle_ms: 100,
            restore_clipboard: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CoordinatorConfig {
    /// Debounce delay, clamped to the accepted range. Values `validate`
    /// rejects fall back to the default half second.
    pub fn debounce_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.debounce_delay_secs.clamp(0.0, MAX_DEBOUNCE_DELAY_SECS))
            .unwrap_or(Duration::from_millis(500))
    }
}

impl BackendConfig {
    /// Configured endpoint, treating an empty string as unset
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|endpoint| !endpoint.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Check that the configuration is usable
    pub fn validate(&self) -> Result<()> {
        let delay = self.coordinator.debounce_delay_secs;
        if !delay.is_finite() || delay <= 0.0 {
            return Err(AutocompleteError::validation(
                "coordinator.debounce_delay_secs",
                format!("Debounce delay must be a positive number of seconds, got {}", delay),
            ));
        }
        if delay > MAX_DEBOUNCE_DELAY_SECS || Duration::try_from_secs_f64(delay).is_err() {
            return Err(AutocompleteError::validation(
                "coordinator.debounce_delay_secs",
                format!(
                    "Debounce delay must be at most {} seconds, got {}",
                    MAX_DEBOUNCE_DELAY_SECS, delay
                ),
            ));
        }

        if self.backend.timeout_secs == 0 {
            return Err(AutocompleteError::validation(
                "backend.timeout_secs",
                "Backend timeout must be at least one second",
            ));
        }

        if !(0.0..=2.0).contains(&self.backend.temperature) {
            return Err(AutocompleteError::validation(
                "backend.temperature",
                format!("Temperature must be within 0.0..=2.0, got {}", self.backend.temperature),
            ));
        }

        if let Some(endpoint) = self.backend.endpoint() {
            url::Url::parse(endpoint)
                .map_err(AutocompleteError::from)
                .map_err(|e| e.with_context("backend.endpoint"))?;
        }

        Ok(())
    }
}

/// Configuration manager for loading, saving, and managing application configuration
pub struct ConfigManager {
    config: Config,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Open the configuration at the default location, creating it if missing
    pub fn new() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::open(config_path)
    }

    /// Open the configuration at `config_path`, creating it with defaults if missing
    pub fn open<P: Into<PathBuf>>(config_path: P) -> Result<Self> {
        let config_path = config_path.into();
        let config = if config_path.exists() {
            Self::load_config(&config_path)?
        } else {
            let default_config = Config::default();
            Self::save_config(&config_path, &default_config)?;
            default_config
        };

        Ok(Self { config, config_path })
    }

    /// Get the current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get a mutable reference to the configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Save the current configuration to disk
    pub fn save(&self) -> Result<()> {
        Self::save_config(&self.config_path, &self.config)
    }

    /// Reload configuration from disk
    pub fn reload(&mut self) -> Result<()> {
        if self.config_path.exists() {
            self.config = Self::load_config(&self.config_path)?;
        }
        Ok(())
    }

    /// Overwrite the file with defaults
    pub fn reset(&mut self) -> Result<()> {
        self.config = Config::default();
        self.save()
    }

    /// Default configuration file path
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::FileNotFound {
            path: PathBuf::from("config directory"),
        })?;

        Ok(config_dir.join("autocompleter").join("config.toml"))
    }

    /// Load configuration from file
    fn load_config(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError { source: e })?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError { source: e })
            .map_err(Into::into)
    }

    /// Save configuration to file
    fn save_config(path: &Path, config: &Config) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError { source: e })?;
            }
        }

        let content = toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError { source: e })?;

        fs::write(path, content).map_err(|e| ConfigError::WriteError { source: e })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.coordinator.debounce_delay(), Duration::from_millis(500));
        assert_eq!(config.backend.endpoint(), Some(DEFAULT_ENDPOINT));
        assert_eq!(config.backend.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_open_creates_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let manager = ConfigManager::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(manager.config().backend.max_tokens, 25);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[coordinator]\ndebounce_delay_secs = 0.25\nmerge_policy = \"replace\"\n\n[backend]\nendpoint = \"\"\n",
        )
        .unwrap();

        let manager = ConfigManager::open(&path).unwrap();
        let config = manager.config();
        assert_eq!(config.coordinator.debounce_delay(), Duration::from_millis(250));
        assert_eq!(config.coordinator.merge_policy, MergePolicy::Replace);
        assert!(config.coordinator.exclude_protected);
        assert_eq!(config.backend.endpoint(), None);
        assert_eq!(config.injector.paste_settle_ms, 100);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut manager = ConfigManager::open(&path).unwrap();
        manager.config_mut().backend.max_tokens = 64;
        manager.save().unwrap();

        let mut reopened = ConfigManager::open(&path).unwrap();
        assert_eq!(reopened.config().backend.max_tokens, 64);

        reopened.reset().unwrap();
        manager.reload().unwrap();
        assert_eq!(manager.config().backend.max_tokens, 25);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.coordinator.debounce_delay_secs = 0.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.backend.endpoint = Some("not a url".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("backend.endpoint"));

        let mut config = Config::default();
        config.backend.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_huge_debounce_delay() {
        let mut config = Config::default();
        config.coordinator.debounce_delay_secs = 1e30;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at most 60 seconds"));
        assert_eq!(config.coordinator.debounce_delay(), Duration::from_secs(60));

        config.coordinator.debounce_delay_secs = 61.0;
        assert!(config.validate().is_err());

        config.coordinator.debounce_delay_secs = 60.0;
        assert!(config.validate().is_ok());

        config.coordinator.debounce_delay_secs = f64::NAN;
        assert!(config.validate().is_err());
        assert_eq!(config.coordinator.debounce_delay(), Duration::from_millis(500));
    }
}
