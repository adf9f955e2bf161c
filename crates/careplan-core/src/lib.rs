//! Core planning pipeline for careplan.
//!
//! Turns a free-text healthcare goal into an LLM-generated plan and tags
//! every `Step N:` line of that plan with a resource availability flag.
//!
//! ```text
//! goal --> prompt::build_prompt --> AgentInvoker::invoke --> ResourceAnnotator
//!                                                               |
//!                                                               v
//!                                                           PlanResult
//! ```

pub mod agent;
pub mod pipeline;
pub mod prompt;
pub mod resources;

pub use agent::{AgentConfig, AgentInvoker, ChatCompletionsAgent, ProviderError};
pub use pipeline::{PipelineError, PipelineStage, PlanRequest, PlanResult, PlanningPipeline};
pub use prompt::{PromptSpec, build_prompt};
pub use resources::{ResourceAnnotation, ResourceAnnotator, ResourceTaxonomy, TaxonomyError};
