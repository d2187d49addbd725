//! Configuration builder patterns

use crate::config::Config;
use crate::core::MergePolicy;

/// Builder for application configuration
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new config builder with defaults
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Create builder from existing config
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Set the debounce delay in seconds
    pub fn debounce_delay_secs(mut self, secs: f64) -> Self {
        self.config.coordinator.debounce_delay_secs = secs;
        self
    }

    /// Set the merge policy used on accept
    pub fn merge_policy(mut self, policy: MergePolicy) -> Self {
        self.config.coordinator.merge_policy = policy;
        self
    }

    /// Track protected fields too
    pub fn include_protected_fields(mut self) -> Self {
        self.config.coordinator.exclude_protected = false;
        self
    }

    /// Set the completion endpoint
    pub fn endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.config.backend.endpoint = Some(endpoint.into());
        self
    }

    /// Use the local stub backend
    pub fn offline(mut self) -> Self {
        self.config.backend.endpoint = None;
        self
    }

    /// Set the backend request timeout
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.backend.timeout_secs = secs;
        self
    }

    /// Set the API key
    pub fn api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.config.backend.api_key = Some(api_key.into());
        self
    }

    /// Set the log level
    pub fn log_level<S: Into<String>>(mut self, level: S) -> Self {
        self.config.logging.level = level.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .debounce_delay_secs(0.2)
            .merge_policy(MergePolicy::Replace)
            .include_protected_fields()
            .endpoint("http://localhost:9999/v1/completions")
            .timeout_secs(2)
            .api_key("test-key")
            .log_level("debug")
            .build();

        assert_eq!(config.coordinator.debounce_delay(), Duration::from_millis(200));
        assert_eq!(config.coordinator.merge_policy, MergePolicy::Replace);
        assert!(!config.coordinator.exclude_protected);
        assert_eq!(config.backend.endpoint(), Some("http://localhost:9999/v1/completions"));
        assert_eq!(config.backend.timeout_secs, 2);
        assert_eq!(config.backend.api_key.as_deref(), Some("test-key"));
        assert_eq!(config.logging.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_offline_clears_endpoint() {
        let config = ConfigBuilder::from_config(Config::default()).offline().build();
        assert_eq!(config.backend.endpoint(), None);
    }
}
