// 🏷️ Classification Rules - Rules as Data
// Ordered category -> regex lists; the first matching pattern decides

use anyhow::{Context as AnyhowContext, Result};
use regex::Regex;
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::error::RuleSetError;

// ============================================================================
// RULE DEFINITION
// ============================================================================

/// One category and its patterns, in declaration order
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub category: String,
    pub patterns: Vec<Regex>,
}

impl CategoryRule {
    pub fn new(category: impl Into<String>, patterns: &[&str]) -> Result<Self, RuleSetError> {
        let category = category.into();
        let patterns = patterns
            .iter()
            .map(|p| compile(&category, p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CategoryRule { category, patterns })
    }

    /// True when any pattern matches anywhere in `text`
    pub fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(text))
    }
}

fn compile(category: &str, pattern: &str) -> Result<Regex, RuleSetError> {
    Regex::new(pattern).map_err(|source| RuleSetError::InvalidPattern {
        category: category.to_string(),
        pattern: pattern.to_string(),
        source,
    })
}

// ============================================================================
// RULE SET
// ============================================================================

/// Ordered list of category rules.
///
/// Order is the order of the source JSON object and is never re-sorted:
/// when two categories both match, the one declared first wins.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<CategoryRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        RuleSet { rules: Vec::new() }
    }

    /// Load rules from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read rules file: {:?}", path.as_ref()))?;

        RuleSet::from_json_str(&content)
            .with_context(|| format!("Invalid rules file: {:?}", path.as_ref()))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let json: Value = serde_json::from_str(content).context("Failed to parse rules JSON")?;
        Ok(RuleSet::from_value(&json)?)
    }

    /// Build from `{ "Category": ["regex", ...], ... }`, keeping key order
    pub fn from_value(json: &Value) -> Result<Self, RuleSetError> {
        let object = json.as_object().ok_or(RuleSetError::NotAnObject)?;

        let mut rules = Vec::with_capacity(object.len());
        for (category, value) in object {
            let list = value.as_array().ok_or_else(|| RuleSetError::NotAnArray {
                category: category.clone(),
            })?;

            let mut patterns = Vec::with_capacity(list.len());
            for (index, item) in list.iter().enumerate() {
                let pattern = item.as_str().ok_or_else(|| RuleSetError::PatternNotString {
                    category: category.clone(),
                    index,
                })?;
                patterns.push(compile(category, pattern)?);
            }

            rules.push(CategoryRule {
                category: category.clone(),
                patterns,
            });
        }

        Ok(RuleSet { rules })
    }

    /// Append a rule after every existing one
    pub fn push(&mut self, rule: CategoryRule) {
        self.rules.push(rule);
    }

    /// Category of the first rule with a pattern matching `text`
    pub fn classify(&self, text: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(text))
            .map(|rule| rule.category.as_str())
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Number of categories
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn pattern_count(&self) -> usize {
        self.rules.iter().map(|r| r.patterns.len()).sum()
    }
}

// ============================================================================
// TESTS
// ============================================================================
