//! Suggestion backend abstraction and implementations

use crate::config::BackendConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

pub mod completions;
pub mod stub;

pub use completions::HttpCompletionBackend;
pub use stub::StubBackend;

/// Error types for backend operations
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Rate limit exceeded: {retry_after:?}")]
    RateLimit { retry_after: Option<u64> },

    #[error("Request failed: {status}: {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Invalid response format: {message}")]
    InvalidResponse { message: String },

    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Input for a single suggestion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionRequest {
    /// Full text of the field at request time
    pub text: String,
    /// Extra context such as the field label or window title
    pub context: Option<String>,
}

impl SuggestionRequest {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            context: None,
        }
    }

    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// A service that turns partial text into a suggested completion.
///
/// Implementations make a single attempt per call. An empty string means the
/// backend had nothing to suggest.
#[async_trait]
pub trait SuggestionBackend: Send + Sync {
    /// Short name used in logs
    fn backend_name(&self) -> &str;

    /// Request a suggestion for the given text
    async fn request_suggestion(&self, request: &SuggestionRequest) -> Result<String, LlmError>;
}

/// Factory for creating suggestion backends
pub struct BackendFactory;

impl BackendFactory {
    /// Create the backend described by `config`. Without an endpoint the
    /// local stub is used.
    pub fn create_backend(config: &BackendConfig) -> Result<Arc<dyn SuggestionBackend>, LlmError> {
        match config.endpoint() {
            Some(endpoint) => {
                info!("Using completion endpoint {}", endpoint);
                Ok(Arc::new(HttpCompletionBackend::from_config(endpoint, config)?))
            }
            None => {
                info!("No completion endpoint configured; using the local stub backend");
                Ok(Arc::new(StubBackend::new()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_selects_backend_by_endpoint() {
        let mut config = BackendConfig::default();
        let backend = BackendFactory::create_backend(&config).unwrap();
        assert_eq!(backend.backend_name(), "http");

        config.endpoint = Some("   ".to_string());
        let backend = BackendFactory::create_backend(&config).unwrap();
        assert_eq!(backend.backend_name(), "stub");
    }

    #[test]
    fn test_request_builder() {
        let request = SuggestionRequest::new("Dear team,").with_context("Compose: Subject");
        assert_eq!(request.text, "Dear team,");
        assert_eq!(request.context.as_deref(), Some("Compose: Subject"));
    }
}
