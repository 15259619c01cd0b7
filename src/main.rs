use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use category_report::config::{DEFAULT_DATE_FORMAT, DEFAULT_PATTERN_FILE, DEFAULT_TRANSACTIONS_FILE};
use category_report::{
    emit, engine, fingerprint, load_records, unique_values, ColumnNames, DateRange, Granularity,
    MatchMode, OutputTargets, RunConfig,
};

#[derive(Parser)]
#[command(name = "category-report")]
#[command(about = "Group exported transactions into categories and total them per period")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify transactions and write the category report
    Parse(ParseArgs),

    /// List the distinct values of a column, e.g. to draft a pattern file
    Descriptions {
        #[command(flatten)]
        input: InputArgs,

        /// Column to list
        #[arg(long, default_value = "Description")]
        column: String,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Transactions export (first line is the header)
    #[arg(long, default_value = DEFAULT_TRANSACTIONS_FILE)]
    transactions_file: PathBuf,

    #[arg(long, default_value = "Date")]
    date_column: String,

    #[arg(long, default_value = "Amount")]
    amount_column: String,

    /// chrono strftime format of the date column and of --start/--end
    #[arg(long, default_value = DEFAULT_DATE_FORMAT)]
    date_format: String,
}

impl InputArgs {
    fn columns(&self) -> ColumnNames {
        ColumnNames {
            date: self.date_column.clone(),
            amount: self.amount_column.clone(),
        }
    }
}

#[derive(Args)]
struct ParseArgs {
    #[command(flatten)]
    input: InputArgs,

    /// JSON file of { "Category": ["regex", ...] } rules [default: category_patterns.json]
    #[arg(long, conflicts_with_all = ["category_column", "search"])]
    pattern_file: Option<PathBuf>,

    /// Use this column's value as the category instead of patterns
    #[arg(long, conflicts_with = "search")]
    category_column: Option<String>,

    /// Only report records matching this regex, under a category of the same name
    #[arg(long)]
    search: Option<String>,

    /// Real (or None), Daily, Weekly, Biweekly, Monthly, Yearly
    #[arg(long, default_value = "Monthly")]
    granularity: Granularity,

    /// First date to include (inclusive)
    #[arg(long)]
    start: Option<String>,

    /// Last date to include (inclusive)
    #[arg(long)]
    end: Option<String>,

    /// Write the JSON report here instead of stdout
    #[arg(long)]
    output_file: Option<PathBuf>,

    /// Also write the flattened table as CSV
    #[arg(long)]
    csv_file: Option<PathBuf>,
}

impl ParseArgs {
    fn into_config(self) -> Result<RunConfig> {
        let mode = match (self.category_column, self.search) {
            (Some(column), _) => MatchMode::Column(column),
            (None, Some(pattern)) => MatchMode::Search(pattern),
            (None, None) => MatchMode::Patterns(
                self.pattern_file
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_PATTERN_FILE)),
            ),
        };

        let range = DateRange::parse(
            self.start.as_deref(),
            self.end.as_deref(),
            &self.input.date_format,
        )?;

        Ok(RunConfig {
            columns: self.input.columns(),
            transactions: self.input.transactions_file,
            mode,
            granularity: self.granularity,
            date_format: self.input.date_format,
            range,
            outputs: OutputTargets {
                json: self.output_file,
                csv: self.csv_file,
            },
        })
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse(args) => run_parse(args.into_config()?)?,
        Commands::Descriptions { input, column } => run_descriptions(&input, &column)?,
    }

    Ok(())
}

fn run_parse(config: RunConfig) -> Result<()> {
    let aggregation = engine::run(&config)?;
    emit(&aggregation, config.granularity, &config.outputs)?;

    let digest = fingerprint(&aggregation, config.granularity)?;
    let total = aggregation
        .grand_total()
        .map(|t| t.to_string())
        .unwrap_or_else(|| "out of range".to_string());
    info!(
        total = %total,
        transactions = aggregation.transaction_count(),
        fingerprint = %digest,
        "report complete"
    );
    Ok(())
}

fn run_descriptions(input: &InputArgs, column: &str) -> Result<()> {
    let loaded = load_records(
        &input.transactions_file,
        &input.columns(),
        &input.date_format,
        &[column],
    )?;

    for value in unique_values(&loaded.records, column) {
        println!("{}", value);
    }
    Ok(())
}
