//! Shared HTTP utilities for the completion backend

use crate::llm::LlmError;

pub mod client;

pub use client::{HttpClient, HttpClientBuilder, HttpClientConfig};

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("autocompleter/", env!("CARGO_PKG_VERSION"));

/// Map a non-success HTTP response onto an [`LlmError`]
pub fn parse_http_error(status: u16, body: &str) -> LlmError {
    match status {
        429 => LlmError::RateLimit {
            retry_after: extract_retry_after(body),
        },
        401 | 403 => LlmError::Authentication {
            message: "Invalid API key or insufficient permissions".to_string(),
        },
        _ => LlmError::RequestFailed {
            status,
            message: body.to_string(),
        },
    }
}

/// Extract retry-after value from error response
fn extract_retry_after(body: &str) -> Option<u64> {
    let json = serde_json::from_str::<serde_json::Value>(body).ok()?;
    json.get("retry_after")
        .and_then(|v| v.as_u64())
        .or_else(|| {
            json.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|v| v.as_u64())
        })
}
