//! Step extraction and availability tagging.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::taxonomy::ResourceTaxonomy;

/// One step of a plan and whether resources for it are available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAnnotation {
    /// The cleaned step line (trimmed, asterisks removed, original case).
    pub step: String,
    pub available: bool,
}

/// Clean a raw plan line and return it if it is a step line.
///
/// A step line, after trimming and removing every `*`, starts with `step`
/// (any case) and contains a `:`. Everything else yields `None`.
pub fn step_line(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let clean = trimmed.replace('*', "");
    if clean.to_lowercase().starts_with("step") && clean.contains(':') {
        Some(clean)
    } else {
        None
    }
}

/// Tags the step lines of a plan using a shared [`ResourceTaxonomy`].
#[derive(Debug, Clone)]
pub struct ResourceAnnotator {
    taxonomy: Arc<ResourceTaxonomy>,
}

impl ResourceAnnotator {
    pub fn new(taxonomy: Arc<ResourceTaxonomy>) -> Self {
        Self { taxonomy }
    }

    pub fn taxonomy(&self) -> &ResourceTaxonomy {
        &self.taxonomy
    }

    /// `true` when any taxonomy keyword is a substring of the lower-cased step.
    ///
    /// Matching is plain containment with no word boundaries, so `plan`
    /// matches inside `planning`.
    pub fn is_available(&self, step: &str) -> bool {
        self.taxonomy.first_match(&step.to_lowercase()).is_some()
    }

    /// Annotate every step line of `plan_text`, in order of appearance.
    ///
    /// Non-step lines are dropped. Never fails: a plan without step lines
    /// produces an empty list.
    pub fn annotate(&self, plan_text: &str) -> Vec<ResourceAnnotation> {
        plan_text
            .lines()
            .filter_map(step_line)
            .map(|step| {
                let available = self.is_available(&step);
                ResourceAnnotation { step, available }
            })
            .collect()
    }
}

impl Default for ResourceAnnotator {
    fn default() -> Self {
        Self::new(ResourceTaxonomy::builtin())
    }
}
