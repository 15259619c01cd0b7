// 📂 Transaction Source - Field Extraction
// Reads a quoted, comma separated export into immutable records

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::config::ColumnNames;
use crate::error::{ConfigError, RecordError};

// ============================================================================
// HEADER
// ============================================================================

/// Column names from the first line of the export, in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    names: Vec<String>,
}

impl Header {
    pub fn from_record(record: &StringRecord) -> Self {
        let names = record
            .iter()
            .enumerate()
            .map(|(i, name)| {
                // Excel and some bank exports prefix a BOM
                let name = if i == 0 { name.trim_start_matches('\u{feff}') } else { name };
                name.trim().to_string()
            })
            .collect();
        Header { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Position of the first column called `column`
    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.names.iter().position(|n| n == column)
    }

    pub fn require(&self, column: &str) -> Result<usize, ConfigError> {
        self.index_of(column)
            .ok_or_else(|| ConfigError::MissingColumn(column.to_string()))
    }
}

// ============================================================================
// FIELD EXTRACTION
// ============================================================================

/// Value of `column` in `fields`, aligned by position with `header`.
///
/// Unknown columns yield `""`. A row too short to reach a known column is a
/// [`RecordError::MissingField`].
pub fn field_value<'a>(
    header: &Header,
    fields: &'a StringRecord,
    column: &str,
    line: usize,
) -> Result<&'a str, RecordError> {
    let Some(index) = header.index_of(column) else {
        return Ok("");
    };

    fields.get(index).ok_or_else(|| RecordError::MissingField {
        line,
        column: column.to_string(),
        found: fields.len(),
    })
}

/// Text-level form of [`field_value`]: parse one header line and one record
/// line and return the named column's value
pub fn extract_value(column: &str, record_line: &str, header_line: &str) -> Result<String, RecordError> {
    let header = Header::from_record(&parse_line(header_line, 1)?);
    let fields = parse_line(record_line, 2)?;
    field_value(&header, &fields, column, 2).map(str::to_string)
}

fn parse_line(line: &str, line_number: usize) -> Result<StringRecord, RecordError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());

    let mut record = StringRecord::new();
    reader
        .read_record(&mut record)
        .map_err(|source| RecordError::Malformed { line: line_number, source })?;
    Ok(record)
}

// ============================================================================
// RECORD
// ============================================================================

/// One transaction, immutable once read
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// 1-based line in the source file
    pub line: usize,
    pub date: NaiveDate,
    /// Date exactly as written in the file
    pub date_text: String,
    pub amount: Decimal,
    pub fields: BTreeMap<String, String>,
    /// Original record text without its line terminator
    pub raw: String,
}

impl Record {
    /// Named column value, `""` when the column does not exist
    pub fn field(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }
}

/// Header plus every record, in file order
#[derive(Debug, Clone)]
pub struct Input {
    pub header: Header,
    pub records: Vec<Record>,
}

// ============================================================================
// READING
// ============================================================================

/// Read and parse a transactions file
pub fn load_records<P: AsRef<Path>>(
    path: P,
    columns: &ColumnNames,
    date_format: &str,
    required: &[&str],
) -> Result<Input> {
    let text = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read transactions file: {:?}", path.as_ref()))?;

    read_records(&text, columns, date_format, required)
        .with_context(|| format!("Failed to parse transactions file: {:?}", path.as_ref()))
}

/// Parse an in-memory export.
///
/// The first non-blank line is the header; every later non-blank line is one
/// record. `required` names columns beyond date and amount that every record
/// must carry. The first bad record aborts the read.
pub fn read_records(
    text: &str,
    columns: &ColumnNames,
    date_format: &str,
    required: &[&str],
) -> Result<Input> {
    let mut header: Option<Header> = None;
    let mut records = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let line = index + 1;
        let fields = parse_line(raw, line)?;

        match &header {
            None => {
                let parsed = Header::from_record(&fields);
                parsed.require(&columns.date)?;
                parsed.require(&columns.amount)?;
                for column in required {
                    parsed.require(column)?;
                }
                debug!(columns = ?parsed.names(), "header");
                header = Some(parsed);
            }
            Some(h) => {
                let record = build_record(h, &fields, line, raw, columns, date_format, required)?;
                records.push(record);
            }
        }
    }

    let header = header.ok_or(ConfigError::EmptyInput)?;
    debug!(records = records.len(), "read transactions");

    Ok(Input { header, records })
}

fn build_record(
    header: &Header,
    fields: &StringRecord,
    line: usize,
    raw: &str,
    columns: &ColumnNames,
    date_format: &str,
    required: &[&str],
) -> Result<Record, RecordError> {
    let date_text = field_value(header, fields, &columns.date, line)?;
    let date = NaiveDate::parse_from_str(date_text.trim(), date_format).map_err(|_| {
        RecordError::InvalidDate {
            line,
            value: date_text.to_string(),
            format: date_format.to_string(),
        }
    })?;

    let amount_text = field_value(header, fields, &columns.amount, line)?;
    let amount = Decimal::from_str(amount_text.trim()).map_err(|_| RecordError::InvalidAmount {
        line,
        value: amount_text.to_string(),
    })?;

    for column in required {
        field_value(header, fields, column, line)?;
    }

    let mut named = BTreeMap::new();
    for (name, value) in header.names().iter().zip(fields.iter()) {
        named.entry(name.clone()).or_insert_with(|| value.to_string());
    }

    Ok(Record {
        line,
        date,
        date_text: date_text.to_string(),
        amount,
        fields: named,
        raw: raw.to_string(),
    })
}

// ============================================================================
// TESTS
// ============================================================================
