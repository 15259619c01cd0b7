// ⚙️ Run Configuration
// One immutable value built by the CLI and threaded into the engine

use std::path::PathBuf;

use crate::period::Granularity;
use crate::range::DateRange;

pub const DEFAULT_TRANSACTIONS_FILE: &str = "transactions.csv";
pub const DEFAULT_PATTERN_FILE: &str = "category_patterns.json";
pub const DEFAULT_DATE_FORMAT: &str = "%m/%d/%Y";

/// Names of the columns the engine reads from every record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    pub date: String,
    pub amount: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        ColumnNames {
            date: "Date".to_string(),
            amount: "Amount".to_string(),
        }
    }
}

/// How records are assigned a category; exactly one per run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchMode {
    /// Ordered regex rules loaded from a JSON file
    Patterns(PathBuf),
    /// Category is the literal value of this column
    Column(String),
    /// One ad-hoc regex; non-matching records are dropped
    Search(String),
}

impl Default for MatchMode {
    fn default() -> Self {
        MatchMode::Patterns(PathBuf::from(DEFAULT_PATTERN_FILE))
    }
}

/// Where the report is written. Both unset means JSON on stdout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputTargets {
    pub json: Option<PathBuf>,
    pub csv: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub transactions: PathBuf,
    pub mode: MatchMode,
    pub granularity: Granularity,
    pub columns: ColumnNames,
    /// chrono strftime format shared by record dates and range bounds
    pub date_format: String,
    pub range: DateRange,
    pub outputs: OutputTargets,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            transactions: PathBuf::from(DEFAULT_TRANSACTIONS_FILE),
            mode: MatchMode::default(),
            granularity: Granularity::default(),
            columns: ColumnNames::default(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            range: DateRange::all(),
            outputs: OutputTargets::default(),
        }
    }
}

impl RunConfig {
    /// Columns a record must carry on top of date and amount
    pub fn required_columns(&self) -> Vec<&str> {
        match &self.mode {
            MatchMode::Column(column) => vec![column.as_str()],
            MatchMode::Patterns(_) | MatchMode::Search(_) => Vec::new(),
        }
    }
}
