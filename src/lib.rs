// Category Report - Core Library
// Classifies transaction exports into categories and totals them per period

pub mod aggregate;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod period;
pub mod range;
pub mod report;
pub mod rules;
pub mod source;

// Re-export commonly used types
pub use aggregate::{Aggregation, CategoryBucket};
pub use classifier::{Classifier, NO_MATCH};
pub use config::{ColumnNames, MatchMode, OutputTargets, RunConfig};
pub use engine::{load_input, process, run, unique_values, RunStats};
pub use error::{ConfigError, RecordError, RuleSetError, TotalOverflow};
pub use period::{days_in_month, Granularity};
pub use range::DateRange;
pub use report::{emit, fingerprint, table_header, table_rows, to_json, write_csv};
pub use rules::{CategoryRule, RuleSet};
pub use source::{extract_value, field_value, load_records, read_records, Header, Input, Record};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
