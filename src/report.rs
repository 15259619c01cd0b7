// 📤 Report Output - JSON + Flattened Table
// Serializes an aggregation; nothing is written until the run succeeded

use anyhow::{Context, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{info, warn};

use crate::aggregate::{Aggregation, CategoryBucket};
use crate::config::OutputTargets;
use crate::period::Granularity;

// ============================================================================
// JSON
// ============================================================================

/// Serializable view of an aggregation.
///
/// Categories come out sorted, and so do the keys inside each category
/// (`Total`, `Transactions` and the granularity name).
pub struct Report<'a> {
    pub aggregation: &'a Aggregation,
    pub granularity: Granularity,
}

struct BucketView<'a> {
    bucket: &'a CategoryBucket,
    granularity: Granularity,
}

enum Entry {
    Periods,
    Total,
    Transactions,
}

impl Serialize for Report<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.aggregation.len()))?;
        for (category, bucket) in self.aggregation.iter() {
            map.serialize_entry(
                category,
                &BucketView {
                    bucket,
                    granularity: self.granularity,
                },
            )?;
        }
        map.end()
    }
}

impl Serialize for BucketView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut entries = [
            (self.granularity.name(), Entry::Periods),
            ("Total", Entry::Total),
            ("Transactions", Entry::Transactions),
        ];
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, entry) in &entries {
            match entry {
                Entry::Periods => map.serialize_entry(key, &self.bucket.period_totals)?,
                Entry::Total => map.serialize_entry(key, &self.bucket.total)?,
                Entry::Transactions => map.serialize_entry(key, &self.bucket.transactions)?,
            }
        }
        map.end()
    }
}

/// Pretty JSON with 4-space indentation
pub fn to_json(aggregation: &Aggregation, granularity: Granularity) -> Result<String> {
    let report = Report {
        aggregation,
        granularity,
    };

    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    report
        .serialize(&mut serializer)
        .context("Failed to serialize report")?;

    String::from_utf8(out).context("Report is not valid UTF-8")
}

/// SHA-256 of the JSON report, to compare two runs at a glance
pub fn fingerprint(aggregation: &Aggregation, granularity: Granularity) -> Result<String> {
    let json = to_json(aggregation, granularity)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// FLATTENED TABLE
// ============================================================================

/// Column titles: `Key`, `<G> Date`, `<G> Total`, `Total`
pub fn table_header(granularity: Granularity) -> [String; 4] {
    [
        "Key".to_string(),
        format!("{} Date", granularity.name()),
        format!("{} Total", granularity.name()),
        "Total".to_string(),
    ]
}

/// One row per (category, period).
///
/// Key and total only appear on a category's first row, and an empty row
/// closes every category block.
pub fn table_rows(aggregation: &Aggregation) -> Vec<[String; 4]> {
    let mut rows = Vec::new();

    for (category, bucket) in aggregation.iter() {
        for (i, (period, amount)) in bucket.period_totals.iter().enumerate() {
            let (key, total) = if i == 0 {
                (category.to_string(), bucket.total.to_string())
            } else {
                (String::new(), String::new())
            };
            rows.push([key, period.clone(), amount.to_string(), total]);
        }
        rows.push(Default::default());
    }

    rows
}

pub fn write_csv<W: Write>(writer: W, aggregation: &Aggregation, granularity: Granularity) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(table_header(granularity))?;
    for row in table_rows(aggregation) {
        csv.write_record(&row)?;
    }
    csv.flush().context("Failed to flush CSV output")?;
    Ok(())
}

// ============================================================================
// EMIT
// ============================================================================

/// Write every requested output; JSON goes to stdout when no target is set.
///
/// Both files are rendered in memory first. If one of them cannot be
/// written, the files already written by this call are removed again.
pub fn emit(aggregation: &Aggregation, granularity: Granularity, targets: &OutputTargets) -> Result<()> {
    let json = to_json(aggregation, granularity)?;

    if targets.json.is_none() && targets.csv.is_none() {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", json).context("Failed to write report to stdout")?;
        return Ok(());
    }

    let mut outputs: Vec<(&Path, Vec<u8>, &str)> = Vec::new();
    if let Some(path) = &targets.json {
        outputs.push((path.as_path(), format!("{}\n", json).into_bytes(), "JSON"));
    }
    if let Some(path) = &targets.csv {
        let mut rendered = Vec::new();
        write_csv(&mut rendered, aggregation, granularity)?;
        outputs.push((path.as_path(), rendered, "CSV"));
    }

    let mut written: Vec<&Path> = Vec::new();
    for (path, bytes, kind) in &outputs {
        if let Err(err) = fs::write(path, bytes) {
            for done in &written {
                if fs::remove_file(done).is_ok() {
                    warn!(path = %done.display(), "removed output after a failed write");
                }
            }
            return Err(err).with_context(|| format!("Failed to write output file: {:?}", path));
        }
        info!(path = %path.display(), "wrote {} report", kind);
        written.push(*path);
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::Value;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample() -> Aggregation {
        let mut agg = Aggregation::new();
        agg.add("Dining", "2024-01", dec("-4.50"), "line a").unwrap();
        agg.add("Dining", "2024-01", dec("-3.25"), "line b").unwrap();
        agg.add("Dining", "2024-02", dec("-2.00"), "line c").unwrap();
        agg.add("NO_MATCH", "2024-01", dec("10"), "line d").unwrap();
        agg
    }

    #[test]
    fn test_json_shape() {
        let json = to_json(&sample(), Granularity::Monthly).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        let dining = &value["Dining"];
        assert_eq!(dining["Total"].as_f64(), Some(-9.75));
        assert_eq!(dining["Monthly"]["2024-01"].as_f64(), Some(-7.75));
        assert_eq!(dining["Monthly"]["2024-02"].as_f64(), Some(-2.0));
        assert_eq!(dining["Transactions"].as_array().unwrap().len(), 3);

        // NO_MATCH carries numbers like any other bucket
        assert_eq!(value["NO_MATCH"]["Total"].as_f64(), Some(10.0));
        assert!(value["NO_MATCH"]["Monthly"].is_object());
    }

    #[test]
    fn test_json_keys_sorted() {
        let json = to_json(&sample(), Granularity::Weekly).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        let top: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(top, vec!["Dining", "NO_MATCH"]);

        let inner: Vec<&String> = value["Dining"].as_object().unwrap().keys().collect();
        assert_eq!(inner, vec!["Total", "Transactions", "Weekly"]);

        let monthly = to_json(&sample(), Granularity::Monthly).unwrap();
        let value: Value = serde_json::from_str(&monthly).unwrap();
        let inner: Vec<&String> = value["Dining"].as_object().unwrap().keys().collect();
        assert_eq!(inner, vec!["Monthly", "Total", "Transactions"]);
    }

    #[test]
    fn test_json_indent() {
        let json = to_json(&sample(), Granularity::Yearly).unwrap();
        assert!(json.starts_with("{\n    \"Dining\": {\n        \""));
    }

    #[test]
    fn test_empty_aggregation() {
        assert_eq!(to_json(&Aggregation::new(), Granularity::Daily).unwrap(), "{}");
        assert!(table_rows(&Aggregation::new()).is_empty());
    }

    #[test]
    fn test_fingerprint_stable() {
        let a = fingerprint(&sample(), Granularity::Monthly).unwrap();
        let b = fingerprint(&sample(), Granularity::Monthly).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);

        let c = fingerprint(&sample(), Granularity::Yearly).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_table_rows() {
        let rows = table_rows(&sample());

        assert_eq!(table_header(Granularity::Monthly)[1], "Monthly Date");
        assert_eq!(table_header(Granularity::Monthly)[2], "Monthly Total");

        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], ["Dining", "2024-01", "-7.75", "-9.75"].map(String::from));
        assert_eq!(rows[1], ["", "2024-02", "-2.00", ""].map(String::from));
        assert_eq!(rows[2], <[String; 4]>::default());
        assert_eq!(rows[3], ["NO_MATCH", "2024-01", "10", "10"].map(String::from));
        assert_eq!(rows[4], <[String; 4]>::default());
    }

    #[test]
    fn test_write_csv() {
        let mut out = Vec::new();
        write_csv(&mut out, &sample(), Granularity::Monthly).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Key,Monthly Date,Monthly Total,Total");
        assert_eq!(lines[1], "Dining,2024-01,-7.75,-9.75");
        assert_eq!(lines[2], ",2024-02,-2.00,");
        assert_eq!(lines[3], ",,,");
    }

    #[test]
    fn test_json_amounts_keep_full_precision() {
        let mut agg = Aggregation::new();
        agg.add("Savings", "2024", dec("12345678901234567.88"), "line").unwrap();
        agg.add("Savings", "2024", dec("0.01"), "line").unwrap();

        let json = to_json(&agg, Granularity::Yearly).unwrap();
        assert!(json.contains("\"Total\": 12345678901234567.89"));
        assert!(json.contains("\"2024\": 12345678901234567.89"));
    }

    #[test]
    fn test_emit_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let targets = OutputTargets {
            json: Some(dir.path().join("report.json")),
            csv: Some(dir.path().join("report.csv")),
        };

        emit(&sample(), Granularity::Monthly, &targets).unwrap();

        let json = fs::read_to_string(dir.path().join("report.json")).unwrap();
        assert!(json.ends_with("}\n"));
        let csv = fs::read_to_string(dir.path().join("report.csv")).unwrap();
        assert!(csv.starts_with("Key,Monthly Date,Monthly Total,Total"));
    }

    #[test]
    fn test_emit_failure_leaves_no_partial_output() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("report.json");
        let targets = OutputTargets {
            json: Some(json_path.clone()),
            csv: Some(dir.path().join("missing").join("report.csv")),
        };

        let err = emit(&sample(), Granularity::Monthly, &targets).unwrap_err();
        assert!(err.to_string().contains("report.csv"));
        assert!(!json_path.exists());
    }
}
