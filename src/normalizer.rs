// 🧹 Normalizer - raw CSV rows → typed Transaction records
// One bad date or amount aborts the whole file; no partial results.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::categorizer::categorize;
use crate::category_store::CategoryStore;
use crate::error::{Error, Result};
use crate::transaction::{Direction, Transaction, DEFAULT_STATUS};

pub const DATE_COLUMN: &str = "Date";
pub const DETAILS_COLUMN: &str = "Details";
pub const AMOUNT_COLUMN: &str = "Amount";
pub const STATUS_COLUMN: &str = "Status";
pub const DIRECTION_COLUMN: &str = "Debit/Credit";

/// Columns every statement export must carry (order irrelevant).
pub const REQUIRED_COLUMNS: [&str; 5] = [
    DATE_COLUMN,
    DETAILS_COLUMN,
    AMOUNT_COLUMN,
    STATUS_COLUMN,
    DIRECTION_COLUMN,
];

/// Date-only formats, tried in order.
///
/// Slashed dates are read month-first; the day-first reading is only reached
/// when month-first is impossible (e.g. "15/01/2024").
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d-%b-%Y",
    "%m/%d/%y",
    "%d/%m/%y",
];

/// Timestamp formats whose time component is dropped.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

// ============================================================================
// RAW ROW
// ============================================================================

/// One CSV data row keyed by trimmed, lower-cased column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    /// Line in the source file (header = line 1)
    pub line: u64,
    fields: HashMap<String, String>,
}

impl RawRow {
    pub fn new(line: u64) -> Self {
        RawRow {
            line,
            fields: HashMap::new(),
        }
    }

    /// Builder pattern: set a column value (first value for a column wins)
    pub fn with(mut self, column: &str, value: &str) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: &str, value: &str) {
        self.fields
            .entry(column_key(column))
            .or_insert_with(|| value.to_string());
    }

    /// Case- and whitespace-insensitive column lookup
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(&column_key(column)).map(String::as_str)
    }
}

fn column_key(name: &str) -> String {
    name.trim().to_lowercase()
}

// ============================================================================
// CSV READING
// ============================================================================

/// Read a statement CSV (with header row) into raw rows.
///
/// Fails with `MissingColumn` before reading any data when a required column
/// is absent. Extra columns are kept but ignored downstream.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<RawRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(column_key).collect();

    for required in REQUIRED_COLUMNS {
        if !headers.contains(&column_key(required)) {
            return Err(Error::MissingColumn(required.to_string()));
        }
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let mut row = RawRow::new(line);
        for (header, value) in headers.iter().zip(record.iter()) {
            row.insert(header, value);
        }
        rows.push(row);
    }

    tracing::debug!("Read {} rows from CSV", rows.len());
    Ok(rows)
}

// ============================================================================
// FIELD PARSING
// ============================================================================

/// Permissive date parser accepting mixed formats across rows.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // %Y happily reads "24" as year 24; leave two-digit years to %y
    let plausible = |date: &NaiveDate| date.year() >= 1000;

    DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .find(plausible)
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .filter_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
                .find(plausible)
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

/// Amount with thousands separators, e.g. "1,234.50" → 1234.5
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = raw.replace(',', "");
    let value: f64 = cleaned.trim().parse().ok()?;

    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        None
    }
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Normalize every row; same order and cardinality as the input.
pub fn normalize(rows: &[RawRow]) -> Result<Vec<Transaction>> {
    rows.iter().map(normalize_row).collect()
}

pub fn normalize_row(row: &RawRow) -> Result<Transaction> {
    let date_raw = required(row, DATE_COLUMN)?;
    let date = parse_date(date_raw).ok_or_else(|| Error::InvalidDate {
        line: row.line,
        value: date_raw.to_string(),
    })?;

    let details = required(row, DETAILS_COLUMN)?;

    let amount_raw = required(row, AMOUNT_COLUMN)?;
    let amount = parse_amount(amount_raw).ok_or_else(|| Error::InvalidAmount {
        line: row.line,
        value: amount_raw.to_string(),
    })?;

    let status = match row.get(STATUS_COLUMN) {
        Some(status) if !status.trim().is_empty() => status.to_string(),
        _ => {
            tracing::trace!(line = row.line, "Status missing, using {DEFAULT_STATUS}");
            DEFAULT_STATUS.to_string()
        }
    };

    let direction = Direction::from_column(row.get(DIRECTION_COLUMN));

    Ok(Transaction::new(date, details, amount, status, direction))
}

fn required<'a>(row: &'a RawRow, column: &str) -> Result<&'a str> {
    row.get(column)
        .ok_or_else(|| Error::MissingColumn(column.to_string()))
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Full load: read → normalize → categorize against `store`.
pub fn load_transactions<R: Read>(reader: R, store: &CategoryStore) -> Result<Vec<Transaction>> {
    let rows = read_rows(reader)?;
    let mut transactions = normalize(&rows)?;
    categorize(&mut transactions, store);

    tracing::info!(
        "Loaded {} transactions ({} uncategorized)",
        transactions.len(),
        transactions.iter().filter(|t| t.is_uncategorized()).count()
    );

    Ok(transactions)
}

pub fn load_transactions_from_path(path: &Path, store: &CategoryStore) -> Result<Vec<Transaction>> {
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;
    load_transactions(file, store)
}

// ============================================================================
// TESTS
// ============================================================================
