// 🔎 Classifier - Category Key Selection
// Pattern file, column value or single search pattern; one per run

use anyhow::Result;
use regex::Regex;
use tracing::debug;

use crate::config::MatchMode;
use crate::error::RuleSetError;
use crate::rules::RuleSet;
use crate::source::Record;

/// Category for records no rule matched (pattern-file mode only)
pub const NO_MATCH: &str = "NO_MATCH";

#[derive(Debug, Clone)]
pub enum Classifier {
    /// Ordered rules tested against the raw record text
    Patterns(RuleSet),
    /// Literal value of the named column
    Column(String),
    /// Matches go to a category named after the pattern itself
    Search { label: String, regex: Regex },
}

impl Classifier {
    /// Build the classifier for `mode`, loading the rule file if needed
    pub fn from_mode(mode: &MatchMode) -> Result<Self> {
        let classifier = match mode {
            MatchMode::Patterns(path) => {
                let rules = RuleSet::from_file(path)?;
                debug!(
                    categories = rules.rule_count(),
                    patterns = rules.pattern_count(),
                    "loaded rule set"
                );
                Classifier::Patterns(rules)
            }
            MatchMode::Column(column) => Classifier::Column(column.clone()),
            MatchMode::Search(pattern) => Classifier::search(pattern)?,
        };
        Ok(classifier)
    }

    pub fn search(pattern: &str) -> Result<Self, RuleSetError> {
        let regex = Regex::new(pattern).map_err(|source| RuleSetError::InvalidPattern {
            category: pattern.to_string(),
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Classifier::Search {
            label: pattern.to_string(),
            regex,
        })
    }

    /// Category key for `record`, or `None` when the record is left out of
    /// the report (search mode, no match)
    pub fn classify<'a>(&'a self, record: &'a Record) -> Option<&'a str> {
        match self {
            Classifier::Patterns(rules) => Some(rules.classify(&record.raw).unwrap_or(NO_MATCH)),
            Classifier::Column(column) => Some(record.field(column)),
            Classifier::Search { label, regex } => {
                regex.is_match(&record.raw).then_some(label.as_str())
            }
        }
    }

    /// Whether unmatched records are collected under [`NO_MATCH`]
    pub fn collects_unmatched(&self) -> bool {
        matches!(self, Classifier::Patterns(_))
    }
}
