//! Agent invocation: the seam between the pipeline and the language model.
//!
//! The pipeline only ever sees the [`AgentInvoker`] trait. A single call
//! takes a [`PromptSpec`](crate::prompt::PromptSpec) and returns the
//! model's plain-text answer, or a [`ProviderError`].
//!
//! ```text
//! PlanningPipeline
//!     |
//!     v
//! &dyn AgentInvoker --invoke(prompt)--> ChatCompletionsAgent --HTTP--> provider
//!                                                |
//!                                                v
//!                                        String | ProviderError
//! ```

pub mod chat_completions;
pub mod trait_def;
pub mod types;

pub use chat_completions::ChatCompletionsAgent;
pub use trait_def::AgentInvoker;
pub use types::{AgentConfig, ProviderError};
