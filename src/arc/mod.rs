//! Arc classification of chapter titles
//!
//! Chapter titles follow the convention `<Arc> <number>[.<number>] [(note)]`,
//! e.g. `Gestation 1.1` or `Interlude 10.5 (Bonus)`. The arc is the leading
//! word. Titles that break the convention can be mapped explicitly through an
//! override table, which is consulted first. A title that neither an override
//! nor the pattern recognizes is an error: misfiling it silently would corrupt
//! the table of contents.

use crate::config::{compile_pattern, ArcConfig};
use crate::{BinderError, ConfigResult, Result};
use regex::Regex;
use std::collections::BTreeMap;

/// Title convention: arc name, whitespace, `N`, `e`, `N.M` or `e.M`, then an
/// optional parenthetical
const TITLE_PATTERN: &str = r"^(\w+)\s+(?:\d+|e)(?:\.\d+)?(?:\s*\(.*\))?$";

/// Derives arc labels from chapter titles
#[derive(Debug, Clone)]
pub struct ArcClassifier {
    pattern: Regex,
    overrides: BTreeMap<String, String>,
}

impl ArcClassifier {
    /// Creates a classifier with the given exact-title overrides
    pub fn new(overrides: BTreeMap<String, String>) -> ConfigResult<Self> {
        Ok(Self {
            pattern: compile_pattern(TITLE_PATTERN)?,
            overrides,
        })
    }

    /// Builds a classifier from the configured and built-in overrides
    pub fn from_config(config: &ArcConfig) -> ConfigResult<Self> {
        Self::new(config.effective_overrides())
    }

    /// Adds or replaces an override rule
    pub fn with_override(mut self, title: &str, label: &str) -> Self {
        self.overrides.insert(title.to_string(), label.to_string());
        self
    }

    /// Returns the arc label for a chapter title
    ///
    /// # Errors
    ///
    /// `BinderError::Classification` when no override matches and the title
    /// does not follow the convention.
    pub fn classify(&self, title: &str) -> Result<String> {
        if let Some(label) = self.overrides.get(title) {
            return Ok(label.clone());
        }

        self.pattern
            .captures(title)
            .and_then(|captures| captures.get(1))
            .map(|arc| arc.as_str().to_string())
            .ok_or_else(|| BinderError::Classification {
                title: title.to_string(),
            })
    }
}
