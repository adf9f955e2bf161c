//! OpenAI-compatible chat-completions agent.
//!
//! Sends a single non-streaming request with a system message (persona) and
//! a user message (task), then returns the first choice's content. Works
//! against Groq, OpenAI, and any other provider exposing the same API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::trait_def::AgentInvoker;
use super::types::{AgentConfig, ProviderError};
use crate::prompt::PromptSpec;

/// Agent backed by a `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct ChatCompletionsAgent {
    config: AgentConfig,
    client: reqwest::Client,
}

impl ChatCompletionsAgent {
    /// Create an agent with a fresh HTTP client.
    ///
    /// No request timeout is set: a long model call is only bounded by the
    /// caller's transport.
    pub fn new(config: AgentConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

fn build_request<'a>(config: &'a AgentConfig, prompt: &PromptSpec) -> ChatRequest<'a> {
    ChatRequest {
        model: &config.model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: prompt.system_message(),
            },
            ChatMessage {
                role: "user",
                content: prompt.user_message(),
            },
        ],
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}

/// Extract the answer text from a raw response body.
fn parse_response(body: &str) -> Result<String, ProviderError> {
    let response: ChatResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

    if let Some(usage) = &response.usage {
        debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "provider token usage"
        );
    }

    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default();

    if content.trim().is_empty() {
        return Err(ProviderError::EmptyResponse);
    }
    Ok(content)
}

// ---------------------------------------------------------------------------
// AgentInvoker implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl AgentInvoker for ChatCompletionsAgent {
    fn name(&self) -> &str {
        "chat-completions"
    }

    async fn invoke(&self, prompt: &PromptSpec) -> Result<String, ProviderError> {
        let endpoint = self.config.endpoint();
        let request = build_request(&self.config, prompt);

        debug!(
            endpoint = %endpoint,
            model = %self.config.model,
            temperature = self.config.temperature,
            max_tokens = self.config.max_tokens,
            "calling model provider"
        );

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "model provider returned an error status");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_response(&body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
