//! Resource availability checks for generated plans.
//!
//! A [`ResourceTaxonomy`] maps resource categories to keywords. The
//! [`ResourceAnnotator`] picks the `Step N:` lines out of a plan and marks
//! each one available when any keyword occurs inside it.

pub mod annotator;
pub mod taxonomy;

pub use annotator::{ResourceAnnotation, ResourceAnnotator, step_line};
pub use taxonomy::{ResourceCategory, ResourceTaxonomy, TaxonomyError};
