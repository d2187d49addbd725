//! HTTP completion endpoint backend

use super::{LlmError, SuggestionBackend, SuggestionRequest};
use crate::config::BackendConfig;
use crate::utils::http::{parse_http_error, HttpClient, HttpClientBuilder};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Request body sent to the completion endpoint
#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    prompt: &'a str,
    context: &'a str,
    max_tokens: u32,
    temperature: f32,
}

/// Backend that POSTs the field text to a completion endpoint
pub struct HttpCompletionBackend {
    http: HttpClient,
    endpoint: String,
    api_key: Option<String>,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl HttpCompletionBackend {
    /// Create a backend for `endpoint` using the timeouts and generation
    /// settings from `config`
    pub fn from_config(endpoint: &str, config: &BackendConfig) -> Result<Self, LlmError> {
        let timeout = config.timeout();
        let http = HttpClient::new(HttpClientBuilder::new().timeout(timeout).build())?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            api_key: config.api_key.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout,
        })
    }

    fn map_send_error(&self, error: reqwest::Error) -> LlmError {
        if error.is_timeout() {
            LlmError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else {
            LlmError::Network(error)
        }
    }
}

/// Pull the suggestion out of a response body. Accepts `{"completion": ...}`
/// and the OpenAI-style `{"choices": [{"text": ...}]}` shape.
///
/// Trailing whitespace is dropped. Leading whitespace is part of a
/// continuation (`" world"` after `"Hello"`) and is only dropped when the
/// reply restates `prompt` in full.
pub fn extract_completion(body: &serde_json::Value, prompt: &str) -> Result<String, LlmError> {
    if !body.is_object() {
        return Err(LlmError::InvalidResponse {
            message: "Expected a JSON object".to_string(),
        });
    }

    let text = body
        .get("completion")
        .and_then(|v| v.as_str())
        .or_else(|| {
            body.get("choices")
                .and_then(|choices| choices.get(0))
                .and_then(|choice| choice.get("text"))
                .and_then(|v| v.as_str())
        })
        .unwrap_or_default();

    let text = text.trim_end();
    let restated = text.trim_start();
    if !prompt.is_empty() && restated.starts_with(prompt) {
        Ok(restated.to_string())
    } else {
        Ok(text.to_string())
    }
}

#[async_trait]
impl SuggestionBackend for HttpCompletionBackend {
    fn backend_name(&self) -> &str {
        "http"
    }

    async fn request_suggestion(&self, request: &SuggestionRequest) -> Result<String, LlmError> {
        let payload = CompletionRequest {
            prompt: &request.text,
            context: request.context.as_deref().unwrap_or(""),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let mut builder = self.http.client().post(&self.endpoint).json(&payload);
        if let Some(ref api_key) = self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await.map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(parse_http_error(status, &body));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| LlmError::InvalidResponse {
            message: format!("Failed to parse completion response: {}", e),
        })?;

        let suggestion = extract_completion(&body, &request.text)?;
        debug!("Completion endpoint returned {} characters", suggestion.len());
        Ok(suggestion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MergePolicy;
    use serde_json::json;

    #[test]
    fn test_extract_full_text_reply() {
        let body = json!({ "completion": "  Hello world\n" });
        assert_eq!(extract_completion(&body, "Hello wor").unwrap(), "Hello world");
    }

    #[test]
    fn test_extract_choices_shape_keeps_leading_space() {
        let body = json!({ "choices": [{ "text": " there\n" }] });
        assert_eq!(extract_completion(&body, "Hi").unwrap(), " there");
    }

    #[test]
    fn test_continuation_merges_with_its_space() {
        let body = json!({ "completion": " world\n" });
        let suggestion = extract_completion(&body, "Hello").unwrap();
        assert_eq!(MergePolicy::Complete.merge("Hello", &suggestion), "Hello world");

        let body = json!({ "completion": "Hello world" });
        let suggestion = extract_completion(&body, "Hello").unwrap();
        assert_eq!(MergePolicy::Complete.merge("Hello", &suggestion), "Hello world");
    }

    #[test]
    fn test_extract_missing_completion_is_empty() {
        assert_eq!(extract_completion(&json!({ "id": "x" }), "Hello").unwrap(), "");
        assert_eq!(extract_completion(&json!({ "completion": " \n" }), "Hello").unwrap(), "");
        assert!(matches!(
            extract_completion(&json!(["completion"]), "Hello"),
            Err(LlmError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn test_payload_shape() {
        let payload = CompletionRequest {
            prompt: "Hello wor",
            context: "",
            max_tokens: 25,
            temperature: 0.7,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["prompt"], "Hello wor");
        assert_eq!(value["context"], "");
        assert_eq!(value["max_tokens"], 25);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails_without_panicking() {
        let mut config = BackendConfig::default();
        config.timeout_secs = 1;
        // Port 9 (discard) on localhost is almost never listening
        let backend = HttpCompletionBackend::from_config("http://127.0.0.1:9/v1/completions", &config).unwrap();
        let result = backend.request_suggestion(&SuggestionRequest::new("Hello")).await;
        assert!(result.is_err());
    }
}
