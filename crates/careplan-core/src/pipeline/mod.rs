//! The planning pipeline: goal -> prompt -> agent -> annotated plan.
//!
//! Each run is strictly sequential and holds no state between runs. The
//! only shared data is the agent handle and the immutable taxonomy, so one
//! pipeline can serve any number of concurrent requests.

pub mod request;
pub mod stage;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::agent::{AgentInvoker, ProviderError};
use crate::prompt::build_prompt;
use crate::resources::{ResourceAnnotation, ResourceAnnotator, ResourceTaxonomy};

pub use request::PlanRequest;
pub use stage::PipelineStage;

/// Errors a pipeline run can end with.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The goal was empty or missing. Raised before any agent call.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The agent call failed. Carries the provider's error unchanged.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl PipelineError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// The stage the run was in when it failed.
    pub fn failed_at(&self) -> PipelineStage {
        match self {
            Self::Validation(_) => PipelineStage::Idle,
            Self::Provider(_) => PipelineStage::Invoking,
        }
    }
}

/// The outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanResult {
    /// The agent's raw answer.
    pub summary: String,
    /// One entry per step line of `summary`, in order.
    pub resource_check: Vec<ResourceAnnotation>,
}

/// Orchestrates prompt construction, agent invocation and annotation.
#[derive(Clone)]
pub struct PlanningPipeline {
    agent: Arc<dyn AgentInvoker>,
    annotator: ResourceAnnotator,
}

impl std::fmt::Debug for PlanningPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanningPipeline")
            .field("agent", &self.agent.name())
            .field("categories", &self.annotator.taxonomy().categories().len())
            .finish()
    }
}

impl PlanningPipeline {
    pub fn new(agent: Arc<dyn AgentInvoker>, taxonomy: Arc<ResourceTaxonomy>) -> Self {
        Self {
            agent,
            annotator: ResourceAnnotator::new(taxonomy),
        }
    }

    pub fn agent_name(&self) -> &str {
        self.agent.name()
    }

    /// Handle an inbound plan request.
    ///
    /// Only `requirements` drives the plan. The patient fields are accepted
    /// and deliberately not consulted.
    pub async fn generate_plan(&self, request: &PlanRequest) -> Result<PlanResult, PipelineError> {
        let goal = request
            .requirements
            .as_deref()
            .ok_or_else(|| PipelineError::Validation("requirements (goal) is required".into()))?;
        self.run(goal).await
    }

    /// Run the pipeline for a single goal.
    ///
    /// Fails with [`PipelineError::Validation`] for an empty or
    /// whitespace-only goal without contacting the agent, and with
    /// [`PipelineError::Provider`] when the agent call fails.
    pub async fn run(&self, goal: &str) -> Result<PlanResult, PipelineError> {
        let mut stage = PipelineStage::Idle;

        if goal.trim().is_empty() {
            stage.advance(PipelineStage::Failed);
            return Err(PipelineError::Validation("goal must not be empty".into()));
        }

        stage.advance(PipelineStage::Prompting);
        let prompt = build_prompt(goal);

        stage.advance(PipelineStage::Invoking);
        let summary = match self.agent.invoke(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(agent = self.agent.name(), error = %e, "agent invocation failed");
                stage.advance(PipelineStage::Failed);
                return Err(e.into());
            }
        };

        stage.advance(PipelineStage::Annotating);
        let resource_check = self.annotator.annotate(&summary);

        stage.advance(PipelineStage::Done);
        debug!(
            steps = resource_check.len(),
            available = resource_check.iter().filter(|a| a.available).count(),
            "plan annotated"
        );

        Ok(PlanResult {
            summary,
            resource_check,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::PromptSpec;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Minimal agent: fixed reply, counts calls.
    struct FixedAgent {
        reply: Result<String, ProviderError>,
        calls: AtomicUsize,
    }

    impl FixedAgent {
        fn ok(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            })
        }

        fn err(error: ProviderError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(error),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl AgentInvoker for FixedAgent {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn invoke(&self, _prompt: &PromptSpec) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }
    }

    fn pipeline(agent: Arc<FixedAgent>) -> PlanningPipeline {
        PlanningPipeline::new(agent, ResourceTaxonomy::builtin())
    }

    #[tokio::test]
    async fn empty_goal_is_rejected_without_agent_call() {
        let agent = FixedAgent::ok("Step 1: Diagnosis");
        let p = pipeline(agent.clone());

        for goal in ["", "   ", "\n\t "] {
            let err = p.run(goal).await.unwrap_err();
            assert!(err.is_validation(), "expected validation error for {goal:?}");
            assert_eq!(err.failed_at(), PipelineStage::Idle);
        }
        assert_eq!(agent.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_requirements_is_validation_error() {
        let agent = FixedAgent::ok("Step 1: Diagnosis");
        let p = pipeline(agent.clone());

        let err = p.generate_plan(&PlanRequest::default()).await.unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("requirements"));
        assert_eq!(agent.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn provider_error_propagates_unchanged() {
        let upstream = ProviderError::Status {
            status: 401,
            body: "Invalid API Key".to_string(),
        };
        let agent = FixedAgent::err(upstream.clone());
        let p = pipeline(agent.clone());

        let err = p.run("asthma").await.unwrap_err();
        assert_eq!(err.failed_at(), PipelineStage::Invoking);
        match err {
            PipelineError::Provider(inner) => assert_eq!(inner, upstream),
            other => panic!("expected provider error, got {other:?}"),
        }
        assert_eq!(agent.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn provider_error_message_is_verbatim() {
        let agent = FixedAgent::err(ProviderError::Transport("connection refused".into()));
        let err = pipeline(agent).run("asthma").await.unwrap_err();
        assert_eq!(err.to_string(), "provider request failed: connection refused");
    }

    #[tokio::test]
    async fn summary_is_raw_agent_text() {
        let text = "Intro\n**Step 1: Diagnosis**\n";
        let result = pipeline(FixedAgent::ok(text)).run("gout").await.unwrap();
        assert_eq!(result.summary, text);
        assert_eq!(result.resource_check.len(), 1);
        assert_eq!(result.resource_check[0].step, "Step 1: Diagnosis");
    }

    #[tokio::test]
    async fn no_step_lines_yields_empty_check() {
        let result = pipeline(FixedAgent::ok("I cannot help with that."))
            .run("gout")
            .await
            .unwrap();
        assert!(result.resource_check.is_empty());
    }

    #[tokio::test]
    async fn patient_metadata_does_not_change_result() {
        let agent = FixedAgent::ok("Step 1: Prescribe medication");
        let p = pipeline(agent);

        let bare = PlanRequest {
            requirements: Some("gout".into()),
            ..PlanRequest::default()
        };
        let full = PlanRequest {
            patient_name: Some("A. Patient".into()),
            age: Some(54),
            condition: Some("gout".into()),
            priority: Some("High".into()),
            requirements: Some("gout".into()),
        };

        let a = p.generate_plan(&bare).await.unwrap();
        let b = p.generate_plan(&full).await.unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn plan_result_wire_shape() {
        let result = PlanResult {
            summary: "Step 1: Rest".to_string(),
            resource_check: vec![ResourceAnnotation {
                step: "Step 1: Rest".to_string(),
                available: false,
            }],
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({
                "summary": "Step 1: Rest",
                "resource_check": [{"step": "Step 1: Rest", "available": false}]
            })
        );
    }

    #[test]
    fn debug_names_agent() {
        let p = pipeline(FixedAgent::ok(""));
        let debug = format!("{p:?}");
        assert!(debug.contains("fixed"));
        assert!(debug.contains("categories: 19"));
    }
}
