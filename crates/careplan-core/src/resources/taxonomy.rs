//! The resource taxonomy: ordered categories of availability keywords.
//!
//! The built-in taxonomy is defined in `taxonomy.toml` and embedded in the
//! binary at compile time. A replacement can be loaded from disk once at
//! startup. There is no way to modify a taxonomy after it is built; it is
//! shared between requests behind an `Arc`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use serde::Deserialize;
use thiserror::Error;

/// Errors from loading or validating a taxonomy file.
#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("failed to read taxonomy file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("taxonomy must contain at least one category")]
    Empty,

    #[error("taxonomy category at position {0} has an empty name")]
    EmptyCategoryName(usize),

    #[error("duplicate taxonomy category: {0:?}")]
    DuplicateCategory(String),

    #[error("category {0:?} contains an empty keyword")]
    EmptyKeyword(String),
}

/// A named group of keywords.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceCategory {
    pub name: String,
    pub keywords: Vec<String>,
}

/// Container for deserializing a taxonomy file.
#[derive(Debug, Deserialize)]
struct TaxonomyFile {
    categories: Vec<ResourceCategory>,
}

/// Ordered, immutable mapping of category name to keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTaxonomy {
    categories: Vec<ResourceCategory>,
}

/// The embedded taxonomy TOML.
static TAXONOMY_TOML: &str = include_str!("taxonomy.toml");

static BUILTIN: LazyLock<Arc<ResourceTaxonomy>> = LazyLock::new(|| {
    Arc::new(
        ResourceTaxonomy::from_toml_str(TAXONOMY_TOML)
            .expect("embedded taxonomy.toml is invalid"),
    )
});

impl ResourceTaxonomy {
    /// The built-in healthcare taxonomy, parsed once per process.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed. The file ships with the
    /// binary and is covered by tests, so this cannot happen in a build
    /// that passed them.
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    /// Parse and validate a taxonomy from TOML text.
    ///
    /// Keywords are lower-cased so they can be matched against lower-cased
    /// step text. Category and keyword order is preserved.
    pub fn from_toml_str(contents: &str) -> Result<Self, TaxonomyError> {
        let file: TaxonomyFile = toml::from_str(contents)?;
        Self::from_categories(file.categories)
    }

    /// Read a taxonomy file from disk.
    pub fn load(path: &Path) -> Result<Self, TaxonomyError> {
        let contents = std::fs::read_to_string(path).map_err(|source| TaxonomyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Build a taxonomy from categories, validating as [`Self::from_toml_str`] does.
    pub fn from_categories(categories: Vec<ResourceCategory>) -> Result<Self, TaxonomyError> {
        if categories.is_empty() {
            return Err(TaxonomyError::Empty);
        }

        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(categories.len());

        for (index, category) in categories.into_iter().enumerate() {
            let name = category.name.trim().to_string();
            if name.is_empty() {
                return Err(TaxonomyError::EmptyCategoryName(index));
            }
            if !seen.insert(name.clone()) {
                return Err(TaxonomyError::DuplicateCategory(name));
            }
            if category.keywords.iter().any(|k| k.is_empty()) {
                return Err(TaxonomyError::EmptyKeyword(name));
            }

            let keywords = category
                .keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect();
            normalized.push(ResourceCategory { name, keywords });
        }

        Ok(Self {
            categories: normalized,
        })
    }

    /// Categories in definition order.
    pub fn categories(&self) -> &[ResourceCategory] {
        &self.categories
    }

    /// Total number of keywords across all categories.
    pub fn keyword_count(&self) -> usize {
        self.categories.iter().map(|c| c.keywords.len()).sum()
    }

    /// Find the first `(category, keyword)` whose keyword occurs in `text`.
    ///
    /// `text` must already be lower-cased. Categories are scanned in order,
    /// keywords in order within each category, and the scan stops at the
    /// first hit.
    pub fn first_match(&self, text: &str) -> Option<(&str, &str)> {
        self.categories.iter().find_map(|category| {
            category
                .keywords
                .iter()
                .find(|keyword| text.contains(keyword.as_str()))
                .map(|keyword| (category.name.as_str(), keyword.as_str()))
        })
    }
}
