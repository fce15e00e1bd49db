// ⚠️ Error Types - one enum for the whole pipeline
// Parse failures abort a file; contract violations fail loudly.

use std::path::PathBuf;

/// The errors that may occur while loading statements or mutating categories.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required CSV column is absent (after trimming, case-insensitive).
    #[error("missing required column \"{0}\"")]
    MissingColumn(String),

    /// The date could not be read by any of the accepted formats.
    #[error("line {line}: could not parse date \"{value}\"")]
    InvalidDate { line: u64, value: String },

    /// The amount is not a finite, non-negative number once commas are removed.
    #[error("line {line}: could not parse amount \"{value}\"")]
    InvalidAmount { line: u64, value: String },

    /// The CSV itself is malformed (bad quoting, invalid UTF-8, ...).
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The statement file could not be opened.
    #[error("could not open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A category was referenced that has not been created.
    ///
    /// Categories are only ever created explicitly, so learning into an
    /// unknown category is a caller error rather than an implicit create.
    #[error("category \"{0}\" does not exist")]
    UnknownCategory(String),

    /// A row index outside the current debit set.
    #[error("row {0} is out of range")]
    RowOutOfRange(usize),

    /// Reading or writing the persisted category store failed.
    #[error("could not access category store at {path}: {source}")]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The persisted category store is not a mapping of string to list-of-strings.
    #[error("category store is malformed: {0}")]
    StoreFormat(#[from] serde_json::Error),

    #[error("could not encode category store: {0}")]
    StoreEncode(#[source] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// True for the errors that abort processing of an input file.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Error::MissingColumn(_)
                | Error::InvalidDate { .. }
                | Error::InvalidAmount { .. }
                | Error::Csv(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_errors_are_classified() {
        assert!(Error::MissingColumn("Date".to_string()).is_parse_error());
        assert!(Error::InvalidAmount {
            line: 3,
            value: "12a".to_string()
        }
        .is_parse_error());
        assert!(!Error::UnknownCategory("Food".to_string()).is_parse_error());
        assert!(!Error::RowOutOfRange(4).is_parse_error());
    }

    #[test]
    fn test_messages_name_the_offending_value() {
        let err = Error::InvalidDate {
            line: 7,
            value: "32/13/2024".to_string(),
        };
        assert_eq!(err.to_string(), "line 7: could not parse date \"32/13/2024\"");
    }

    #[test]
    fn test_open_failure_is_not_a_csv_error() {
        let err = Error::Open {
            path: PathBuf::from("missing.csv"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().starts_with("could not open missing.csv:"));
        assert!(!err.is_parse_error());
    }
}
