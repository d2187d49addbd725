//! Local stand-in used when no completion endpoint is configured

use super::{LlmError, SuggestionBackend, SuggestionRequest};
use async_trait::async_trait;
use tracing::debug;

/// Placeholder shown for an empty field
pub const EMPTY_FIELD_HINT: &str = "Start typing...";

/// Naive local backend: echoes the text with an ellipsis appended
#[derive(Debug, Default)]
pub struct StubBackend;

impl StubBackend {
    pub fn new() -> Self {
        Self
    }

    /// The suggestion produced for `text`
    pub fn suggest(text: &str) -> String {
        if text.is_empty() {
            EMPTY_FIELD_HINT.to_string()
        } else {
            format!("{}...", text)
        }
    }
}

#[async_trait]
impl SuggestionBackend for StubBackend {
    fn backend_name(&self) -> &str {
        "stub"
    }

    async fn request_suggestion(&self, request: &SuggestionRequest) -> Result<String, LlmError> {
        debug!("Returning a local stub suggestion");
        Ok(Self::suggest(&request.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_suggestions() {
        let backend = StubBackend::new();
        let empty = backend.request_suggestion(&SuggestionRequest::new("")).await.unwrap();
        assert_eq!(empty, EMPTY_FIELD_HINT);

        let echoed = backend
            .request_suggestion(&SuggestionRequest::new("Hello wor"))
            .await
            .unwrap();
        assert_eq!(echoed, "Hello wor...");
    }
}
