// ⚙️ Engine - Classify + Aggregate
// Single pass over a fully loaded batch, strictly in file order

use anyhow::Result;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::aggregate::Aggregation;
use crate::classifier::Classifier;
use crate::config::RunConfig;
use crate::error::RecordError;
use crate::period::Granularity;
use crate::range::DateRange;
use crate::source::{load_records, Input, Record};

/// Counters for one pass, logged at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub read: usize,
    pub out_of_range: usize,
    pub excluded: usize,
    pub aggregated: usize,
}

/// Load everything the run needs before any record is classified.
///
/// The rule set is loaded first so a bad pattern file fails before the
/// transactions are even read.
pub fn load_input(config: &RunConfig) -> Result<(Classifier, Input)> {
    let classifier = Classifier::from_mode(&config.mode)?;
    let input = load_records(
        &config.transactions,
        &config.columns,
        &config.date_format,
        &config.required_columns(),
    )?;
    Ok((classifier, input))
}

/// Full run: load, filter, classify and aggregate
pub fn run(config: &RunConfig) -> Result<Aggregation> {
    let (classifier, input) = load_input(config)?;
    let (aggregation, stats) =
        process(&input.records, &classifier, &config.range, config.granularity)?;

    info!(
        read = stats.read,
        aggregated = stats.aggregated,
        out_of_range = stats.out_of_range,
        excluded = stats.excluded,
        categories = aggregation.len(),
        "aggregated transactions"
    );
    if aggregation.is_empty() && stats.read > 0 {
        warn!("no transaction made it into the report; check the date range and patterns");
    }
    Ok(aggregation)
}

/// Fold `records` into a fresh aggregation.
///
/// Holds no state between calls, so the same batch always yields the same
/// totals. A total leaving the decimal range aborts the batch with the line
/// of the record that pushed it over.
pub fn process(
    records: &[Record],
    classifier: &Classifier,
    range: &DateRange,
    granularity: Granularity,
) -> Result<(Aggregation, RunStats), RecordError> {
    let mut aggregation = Aggregation::new();
    let mut stats = RunStats {
        read: records.len(),
        ..RunStats::default()
    };

    for record in records {
        if !range.contains(record.date) {
            stats.out_of_range += 1;
            continue;
        }

        let Some(category) = classifier.classify(record) else {
            stats.excluded += 1;
            continue;
        };

        let period = granularity.period_key(record.date, &record.date_text);
        aggregation
            .add(category, &period, record.amount, &record.raw)
            .map_err(|e| RecordError::Overflow {
                line: record.line,
                category: e.category,
            })?;
        stats.aggregated += 1;
    }

    debug!(?stats, %granularity, "processed batch");
    Ok((aggregation, stats))
}

/// Sorted distinct values of `column`, blank values skipped.
///
/// Handy for writing a pattern file from an export's descriptions.
pub fn unique_values(records: &[Record], column: &str) -> Vec<String> {
    records
        .iter()
        .map(|r| r.field(column).trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
