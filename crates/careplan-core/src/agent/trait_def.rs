//! The `AgentInvoker` trait -- the adapter interface for model backends.
//!
//! The trait is object-safe so the pipeline can hold an
//! `Arc<dyn AgentInvoker>` and tests can swap in scripted agents.

use async_trait::async_trait;

use super::types::ProviderError;
use crate::prompt::PromptSpec;

/// A language-model agent that answers one prompt with plain text.
///
/// Implementations perform exactly one provider call per `invoke` and
/// never retry: a failure is returned to the caller unchanged.
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    /// Human-readable name for this agent backend (e.g. "chat-completions").
    fn name(&self) -> &str;

    /// Send the prompt and return the model's answer.
    async fn invoke(&self, prompt: &PromptSpec) -> Result<String, ProviderError>;
}

// Compile-time assertion: AgentInvoker must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn AgentInvoker) {}
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::build_prompt;

    /// Echoes the role back, used only to prove the trait works as `dyn`.
    struct EchoAgent;

    #[async_trait]
    impl AgentInvoker for EchoAgent {
        fn name(&self) -> &str {
            "echo"
        }

        async fn invoke(&self, prompt: &PromptSpec) -> Result<String, ProviderError> {
            Ok(format!("Step 1: {}", prompt.role))
        }
    }

    #[test]
    fn agent_is_object_safe() {
        let agent: Box<dyn AgentInvoker> = Box::new(EchoAgent);
        assert_eq!(agent.name(), "echo");
    }

    #[tokio::test]
    async fn echo_agent_invoke() {
        let agent: std::sync::Arc<dyn AgentInvoker> = std::sync::Arc::new(EchoAgent);
        let text = agent.invoke(&build_prompt("gout")).await.unwrap();
        assert_eq!(text, "Step 1: Clinical Healthcare Planner Agent");
    }
}
