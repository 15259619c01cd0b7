// ⚠️ Error Types
// Typed failures for rule sets, records and run configuration

use thiserror::Error;

/// Rule set file does not follow the `{ "Category": ["regex", ...] }` shape
#[derive(Debug, Error)]
pub enum RuleSetError {
    #[error("rule set must be a JSON object of category -> [patterns]")]
    NotAnObject,

    #[error("category '{category}' must map to an array of patterns")]
    NotAnArray { category: String },

    #[error("category '{category}' pattern #{index} is not a string")]
    PatternNotString { category: String, index: usize },

    #[error("category '{category}' pattern '{pattern}' is not a valid regex: {source}")]
    InvalidPattern {
        category: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A single record could not be turned into a transaction.
///
/// These abort the whole run: the engine is fail-fast and never writes a
/// partial report.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("line {line}: column '{column}' missing (record has {found} fields)")]
    MissingField {
        line: usize,
        column: String,
        found: usize,
    },

    #[error("line {line}: amount '{value}' is not a decimal number")]
    InvalidAmount { line: usize, value: String },

    #[error("line {line}: date '{value}' does not match format '{format}'")]
    InvalidDate {
        line: usize,
        value: String,
        format: String,
    },

    #[error("line {line}: adding the amount overflows the total for '{category}'")]
    Overflow { line: usize, category: String },

    #[error("line {line}: malformed record: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: csv::Error,
    },
}

/// A running total left the range a `Decimal` can hold
#[derive(Debug, Error, PartialEq, Eq)]
#[error("total for category '{category}' exceeds the decimal range")]
pub struct TotalOverflow {
    pub category: String,
}

/// Configuration rejected before any record is classified
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown granularity '{0}' (expected Real, Daily, Weekly, Biweekly, Monthly or Yearly)")]
    UnknownGranularity(String),

    #[error("column '{0}' not found in header")]
    MissingColumn(String),

    #[error("{which} date '{value}' does not match format '{format}'")]
    InvalidBound {
        which: &'static str,
        value: String,
        format: String,
    },

    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: String, end: String },

    #[error("transactions file has no header line")]
    EmptyInput,
}
