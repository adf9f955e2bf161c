//! Configuration and error types shared by agent implementations.

use thiserror::Error;

/// Errors raised while calling the model provider.
///
/// Every variant keeps the upstream detail so callers can show it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The request never produced an HTTP response (DNS, TLS, connection reset).
    #[error("provider request failed: {0}")]
    Transport(String),

    /// The provider answered with a non-success status. Authentication
    /// failures and rate limiting land here.
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("malformed provider response: {0}")]
    Malformed(String),

    /// The response decoded but carried no text.
    #[error("provider returned an empty response")]
    EmptyResponse,
}

impl ProviderError {
    /// `true` for 401 and 403 responses.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }

    /// `true` for 429 responses.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Status { status: 429, .. })
    }
}

/// Strongly-typed model settings, fixed when the agent is constructed.
#[derive(Clone, PartialEq)]
pub struct AgentConfig {
    /// Model identifier as understood by the provider.
    pub model: String,
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`).
    pub base_url: String,
    /// Sampling temperature. Kept low for focused, repeatable checklists.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Bearer token for the provider.
    pub api_key: String,
}

impl AgentConfig {
    pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
    pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
    pub const DEFAULT_TEMPERATURE: f32 = 0.2;
    pub const DEFAULT_MAX_TOKENS: u32 = 600;

    /// Build a config with the default model settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            model: Self::DEFAULT_MODEL.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            temperature: Self::DEFAULT_TEMPERATURE,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            api_key: api_key.into(),
        }
    }

    /// Full URL of the chat-completions endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = AgentConfig::new("k");
        assert_eq!(cfg.model, "llama-3.1-8b-instant");
        assert_eq!(cfg.base_url, "https://api.groq.com/openai/v1");
        assert_eq!(cfg.temperature, 0.2);
        assert_eq!(cfg.max_tokens, 600);
        assert_eq!(cfg.api_key, "k");
    }

    #[test]
    fn endpoint_handles_trailing_slash() {
        let mut cfg = AgentConfig::new("k");
        assert_eq!(
            cfg.endpoint(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        cfg.base_url = "http://127.0.0.1:9999/v1/".to_string();
        assert_eq!(cfg.endpoint(), "http://127.0.0.1:9999/v1/chat/completions");
    }

    #[test]
    fn debug_redacts_api_key() {
        let cfg = AgentConfig::new("gsk_super_secret");
        let debug = format!("{cfg:?}");
        assert!(!debug.contains("gsk_super_secret"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("llama-3.1-8b-instant"));
    }

    #[test]
    fn status_error_keeps_upstream_body() {
        let err = ProviderError::Status {
            status: 401,
            body: r#"{"error":{"message":"Invalid API Key"}}"#.to_string(),
        };
        assert!(err.is_auth_failure());
        assert!(!err.is_rate_limited());
        assert_eq!(
            err.to_string(),
            r#"provider returned HTTP 401: {"error":{"message":"Invalid API Key"}}"#
        );
    }

    #[test]
    fn rate_limit_classification() {
        let err = ProviderError::Status {
            status: 429,
            body: "slow down".to_string(),
        };
        assert!(err.is_rate_limited());
        assert!(!err.is_auth_failure());
        assert!(!ProviderError::EmptyResponse.is_rate_limited());
    }
}
