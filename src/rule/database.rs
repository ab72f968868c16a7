//! 规则库
//! The loaded, immutable signature database shared by detection sessions.

use std::collections::HashMap;
use std::path::Path;

use super::loader::RuleLoader;
use super::model::{Application, Category};
use crate::compiler::PatternWarning;
use crate::error::WapResult;

/// Applications and categories after normalization and compilation.
///
/// Nothing here changes after load; per-page state lives in the detector.
#[derive(Debug, Clone, Default)]
pub struct SignatureDatabase {
    applications: HashMap<String, Application>,
    categories: HashMap<String, Category>,
    warnings: Vec<PatternWarning>,
}

impl SignatureDatabase {
    pub(crate) fn new(
        applications: HashMap<String, Application>,
        categories: HashMap<String, Category>,
        warnings: Vec<PatternWarning>,
    ) -> Self {
        Self {
            applications,
            categories,
            warnings,
        }
    }

    /// Database compiled into the crate.
    pub fn bundled() -> WapResult<Self> {
        RuleLoader::load_bundled()
    }

    pub fn from_path(path: impl AsRef<Path>) -> WapResult<Self> {
        RuleLoader::load_from_path(path)
    }

    pub fn from_json_str(content: &str) -> WapResult<Self> {
        RuleLoader::load_from_str(content)
    }

    pub fn applications(&self) -> &HashMap<String, Application> {
        &self.applications
    }

    pub fn application(&self, name: &str) -> Option<&Application> {
        self.applications.get(name)
    }

    pub fn categories(&self) -> &HashMap<String, Category> {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.get(id)
    }

    /// Patterns that failed to compile during load.
    pub fn warnings(&self) -> &[PatternWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.applications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }
}
