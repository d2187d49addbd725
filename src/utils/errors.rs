//! Error types used throughout the application

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the autocompleter
#[derive(Error, Debug)]
pub enum AutocompleteError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Suggestion backend error: {0}")]
    Llm(#[from] crate::llm::LlmError),

    #[error("Platform error: {0}")]
    Platform(#[from] crate::platform::PlatformError),

    #[error("Injection error: {message}")]
    Injection { message: String },

    #[error("Coordinator error: {message}")]
    Coordinator { message: String },

    #[error("Replay error: line {line}: {message}")]
    Replay { line: usize, message: String },

    #[error("Validation error: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("File system error: {path}: {source}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown error: {message}")]
    Unknown { message: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to read configuration: {source}")]
    ReadError {
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write configuration: {source}")]
    WriteError {
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {source}")]
    ParseError {
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize configuration: {source}")]
    SerializeError {
        #[source]
        source: toml::ser::Error,
    },
}

impl AutocompleteError {
    /// Add context to an existing error
    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        match &mut self {
            Self::Unknown { message }
            | Self::Injection { message }
            | Self::Coordinator { message }
            | Self::Replay { message, .. }
            | Self::Validation { message, .. } => {
                *message = format!("{}: {}", context.into(), message);
            }
            _ => {
                let original = format!("{}", self);
                return Self::unknown(format!("{}: {}", context.into(), original));
            }
        }
        self
    }

    /// Create a new injection error
    pub fn injection<S: Into<String>>(message: S) -> Self {
        Self::Injection {
            message: message.into(),
        }
    }

    /// Create a new coordinator error
    pub fn coordinator<S: Into<String>>(message: S) -> Self {
        Self::Coordinator {
            message: message.into(),
        }
    }

    /// Create a new replay script error
    pub fn replay<S: Into<String>>(line: usize, message: S) -> Self {
        Self::Replay {
            line,
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S1: Into<String>, S2: Into<String>>(field: S1, message: S2) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new file system error
    pub fn file_system<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.into(),
            source,
        }
    }

    /// Create a new unknown error
    pub fn unknown<S: Into<String>>(message: S) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Llm(_) => "backend",
            Self::Platform(_) => "platform",
            Self::Injection { .. } => "injection",
            Self::Coordinator { .. } => "coordinator",
            Self::Replay { .. } => "replay",
            Self::Validation { .. } => "validation",
            Self::FileSystem { .. } => "filesystem",
            Self::Url(_) => "url",
            Self::Io(_) => "io",
            Self::Unknown { .. } => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PlatformError;

    #[test]
    fn test_with_context_prefixes_message() {
        let err = AutocompleteError::injection("xdotool exited with 1").with_context("paste");
        assert_eq!(err.to_string(), "Injection error: paste: xdotool exited with 1");
    }

    #[test]
    fn test_with_context_wraps_foreign_variants() {
        let err = AutocompleteError::from(url::Url::parse("not a url").unwrap_err()).with_context("backend.endpoint");
        assert_eq!(err.category(), "unknown");
        assert!(err.to_string().contains("backend.endpoint: URL error"));
    }

    #[test]
    fn test_categories() {
        let err: AutocompleteError = PlatformError::FieldGone.into();
        assert_eq!(err.category(), "platform");

        let err = AutocompleteError::validation("coordinator.debounce_delay_secs", "must be positive");
        assert_eq!(err.category(), "validation");
    }
}
