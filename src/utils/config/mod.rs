//! Shared configuration utilities and patterns
//!
//! Environment variables take precedence over values read from the config
//! file, so a deployment can point the daemon at a different backend without
//! editing the file.

use crate::config::Config;

pub mod builder;

pub use builder::ConfigBuilder;

/// Environment variable overriding `backend.endpoint`
pub const ENDPOINT_ENV: &str = "AUTOCOMPLETER_ENDPOINT";

/// Environment variable overriding `backend.api_key`
pub const API_KEY_ENV: &str = "AUTOCOMPLETER_API_KEY";

/// Applies environment overrides on top of a loaded configuration
pub struct EnvOverrides;

impl EnvOverrides {
    /// Apply every known override to `config`, returning the names of the
    /// variables that were used
    pub fn apply(config: &mut Config) -> Vec<&'static str> {
        let mut applied = Vec::new();

        if let Some(endpoint) = Self::read(ENDPOINT_ENV) {
            config.backend.endpoint = Some(endpoint);
            applied.push(ENDPOINT_ENV);
        }

        if let Some(api_key) = Self::resolve_api_key(config.backend.api_key.as_deref()) {
            if config.backend.api_key.as_deref() != Some(api_key.as_str()) {
                applied.push(API_KEY_ENV);
            }
            config.backend.api_key = Some(api_key);
        }

        applied
    }

    /// API key with environment variable precedence
    pub fn resolve_api_key(config_api_key: Option<&str>) -> Option<String> {
        Self::read(API_KEY_ENV).or_else(|| config_api_key.map(|s| s.to_string()))
    }

    fn read(name: &str) -> Option<String> {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}
