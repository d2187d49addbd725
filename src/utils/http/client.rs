//! HTTP client configuration and management

use super::USER_AGENT;
use crate::llm::LlmError;
use reqwest::Client;
use std::time::Duration;

/// Configuration for HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            connect_timeout: Some(Duration::from_secs(2)),
            user_agent: Some(USER_AGENT.to_string()),
        }
    }
}

/// Builder for HTTP client configuration
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: String) -> Self {
        self.config.user_agent = Some(user_agent);
        self
    }

    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrapper around reqwest::Client with shared configuration
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: HttpClientConfig) -> Result<Self, LlmError> {
        let mut builder = Client::builder().timeout(config.timeout);

        if let Some(connect_timeout) = config.connect_timeout {
            // Never wait longer to connect than for the whole request
            builder = builder.connect_timeout(connect_timeout.min(config.timeout));
        }

        if let Some(ref user_agent) = config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder.build().map_err(LlmError::Network)?;

        Ok(Self { client, config })
    }

    /// Get the underlying reqwest client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides() {
        let config = HttpClientBuilder::new()
            .timeout(Duration::from_secs(9))
            .connect_timeout(Duration::from_secs(1))
            .user_agent("autocompleter-test/1.0".to_string())
            .build();

        assert_eq!(config.timeout, Duration::from_secs(9));
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(1)));
        assert_eq!(config.user_agent.as_deref(), Some("autocompleter-test/1.0"));

        let client = HttpClient::new(config).unwrap();
        assert_eq!(client.config().timeout, Duration::from_secs(9));
    }
}
