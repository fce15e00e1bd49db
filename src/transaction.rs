// 💳 Transaction Record - typed output of the normalizer
// Category is referenced by name only; the store may not know it yet.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Category every record starts in, and the store's fallback bucket.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Status used when the export leaves the column blank.
pub const DEFAULT_STATUS: &str = "SETTLED";

/// Display form of transaction dates (DD/MM/YYYY).
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

// ============================================================================
// DIRECTION
// ============================================================================

/// Whether money left (Debit) or arrived (Credit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Debit,
    Credit,
}

impl Direction {
    /// Lenient read of the `Debit/Credit` column.
    ///
    /// Only the exact literal `"Debit"` is a debit; every other value,
    /// including a missing one, is a credit.
    pub fn from_column(value: Option<&str>) -> Self {
        match value {
            Some("Debit") => Direction::Debit,
            _ => Direction::Credit,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Debit => "Debit",
            Direction::Credit => "Credit",
        }
    }
}

// ============================================================================
// TRANSACTION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Calendar date, serialized as DD/MM/YYYY
    #[serde(with = "display_date")]
    pub date: NaiveDate,

    /// Free-text description, case preserved
    pub details: String,

    /// Non-negative, currency-agnostic amount
    pub amount: f64,

    pub status: String,

    pub direction: Direction,

    /// Category name, "Uncategorized" until matched or edited
    pub category: String,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        details: impl Into<String>,
        amount: f64,
        status: impl Into<String>,
        direction: Direction,
    ) -> Self {
        Transaction {
            date,
            details: details.into(),
            amount,
            status: status.into(),
            direction,
            category: UNCATEGORIZED.to_string(),
        }
    }

    /// Date in DD/MM/YYYY form
    pub fn display_date(&self) -> String {
        self.date.format(DISPLAY_DATE_FORMAT).to_string()
    }

    /// Details as compared against keywords (trimmed, lower-cased)
    pub fn match_key(&self) -> String {
        normalize_key(&self.details)
    }

    pub fn is_debit(&self) -> bool {
        self.direction == Direction::Debit
    }

    pub fn is_uncategorized(&self) -> bool {
        self.category == UNCATEGORIZED
    }
}

/// Canonical comparison form shared by keywords and descriptions.
pub fn normalize_key(text: &str) -> String {
    text.trim().to_lowercase()
}

mod display_date {
    use super::DISPLAY_DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(DISPLAY_DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&s, DISPLAY_DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}
