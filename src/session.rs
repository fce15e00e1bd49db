// 🧭 Session - explicit context for one user working through one statement
//
// Holds the category store and the last successfully loaded file, split by
// direction. Display layers (CLI, HTTP) drive everything through this type.

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

use crate::aggregator::{aggregate_by_category, split_by_direction, total_payments, CategoryTotal};
use crate::category_store::CategoryStore;
use crate::error::{Error, Result};
use crate::learner::learn;
use crate::normalizer::load_transactions;
use crate::transaction::Transaction;

/// A manual category change on one debit row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEdit {
    pub row: usize,
    pub category: String,
}

impl CategoryEdit {
    pub fn new(row: usize, category: impl Into<String>) -> Self {
        CategoryEdit {
            row,
            category: category.into(),
        }
    }
}

/// Both aggregator outputs in one value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub expenses: Vec<CategoryTotal>,
    pub total_payments: f64,
}

#[derive(Debug)]
pub struct Session {
    store: CategoryStore,
    debits: Vec<Transaction>,
    credits: Vec<Transaction>,
}

impl Session {
    pub fn new(store: CategoryStore) -> Self {
        Session {
            store,
            debits: Vec::new(),
            credits: Vec::new(),
        }
    }

    pub fn store(&self) -> &CategoryStore {
        &self.store
    }

    /// Run the full pipeline on a CSV and replace the current records.
    ///
    /// On failure the previously loaded records stay as they were.
    pub fn load_csv<R: Read>(&mut self, reader: R) -> Result<()> {
        let transactions = load_transactions(reader, &self.store)?;
        let (debits, credits) = split_by_direction(transactions);

        tracing::info!("{} debits, {} credits", debits.len(), credits.len());
        self.debits = debits;
        self.credits = credits;
        Ok(())
    }

    pub fn load_path(&mut self, path: &Path) -> Result<()> {
        let file = std::fs::File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_csv(file)
    }

    pub fn debits(&self) -> &[Transaction] {
        &self.debits
    }

    pub fn credits(&self) -> &[Transaction] {
        &self.credits
    }

    pub fn category_names(&self) -> Vec<String> {
        self.store.names()
    }

    pub fn create_category(&mut self, name: &str) -> Result<bool> {
        self.store.create_category(name)
    }

    /// Move debit `row` to `category` and learn its details as a keyword.
    ///
    /// Returns `Ok(false)` when the row already had that category.
    pub fn recategorize(&mut self, row: usize, category: &str) -> Result<bool> {
        self.check_edit(row, category)?;

        let tx = &mut self.debits[row];
        if tx.category == category {
            return Ok(false);
        }
        tx.category = category.to_string();

        let details = tx.details.clone();
        learn(&mut self.store, category, &details)?;
        Ok(true)
    }

    /// Apply a batch of edits; nothing is changed if any edit is invalid.
    ///
    /// Returns the number of rows whose category actually changed.
    pub fn apply_edits(&mut self, edits: &[CategoryEdit]) -> Result<usize> {
        for edit in edits {
            self.check_edit(edit.row, &edit.category)?;
        }

        let mut changed = 0;
        for edit in edits {
            if self.recategorize(edit.row, &edit.category)? {
                changed += 1;
            }
        }

        tracing::info!("Applied {changed} of {} category edits", edits.len());
        Ok(changed)
    }

    pub fn expense_summary(&self) -> Vec<CategoryTotal> {
        aggregate_by_category(&self.debits)
    }

    pub fn total_payments(&self) -> f64 {
        total_payments(&self.credits)
    }

    pub fn summary(&self) -> Summary {
        Summary {
            expenses: self.expense_summary(),
            total_payments: self.total_payments(),
        }
    }

    fn check_edit(&self, row: usize, category: &str) -> Result<()> {
        if row >= self.debits.len() {
            return Err(Error::RowOutOfRange(row));
        }
        if !self.store.contains(category) {
            return Err(Error::UnknownCategory(category.to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;
    use crate::transaction::UNCATEGORIZED;

    const STATEMENT: &str = "\
Date,Details,Amount,Status,Debit/Credit
2024-01-15,Starbucks,4.50,SETTLED,Debit
2024-01-16,Uber,12.00,SETTLED,Debit
2024-01-17,Salary,\"2,000.00\",,Credit
2024-01-18,Starbucks,3.50,SETTLED,Debit
";

    fn session() -> (Session, MemoryBackend) {
        let backend = MemoryBackend::new();
        let store = CategoryStore::load(backend.clone()).unwrap();
        (Session::new(store), backend)
    }

    #[test]
    fn test_load_splits_by_direction() {
        let (mut session, _) = session();
        session.load_csv(STATEMENT.as_bytes()).unwrap();

        assert_eq!(session.debits().len(), 3);
        assert_eq!(session.credits().len(), 1);
        assert_eq!(session.total_payments(), 2000.0);
    }

    #[test]
    fn test_failed_load_keeps_previous_records() {
        let (mut session, _) = session();
        session.load_csv(STATEMENT.as_bytes()).unwrap();

        let bad = "Date,Details,Amount,Status,Debit/Credit\n2024-01-15,Coffee,12a,,Debit\n";
        assert!(session.load_csv(bad.as_bytes()).is_err());
        assert_eq!(session.debits().len(), 3);
    }

    #[test]
    fn test_missing_file_is_an_open_error() {
        let (mut session, _) = session();
        session.load_csv(STATEMENT.as_bytes()).unwrap();

        let err = session.load_path(Path::new("/nonexistent/statement.csv")).unwrap_err();
        assert!(matches!(err, Error::Open { ref path, .. } if path.ends_with("statement.csv")));
        assert_eq!(session.debits().len(), 3);
    }

    #[test]
    fn test_recategorize_learns_keyword() {
        let (mut session, backend) = session();
        session.create_category("Food").unwrap();
        session.load_csv(STATEMENT.as_bytes()).unwrap();

        assert!(session.recategorize(0, "Food").unwrap());
        assert!(!session.recategorize(0, "Food").unwrap());
        assert_eq!(session.debits()[0].category, "Food");

        // Reloading the same file now matches both Starbucks rows
        session.load_csv(STATEMENT.as_bytes()).unwrap();
        assert_eq!(session.debits()[2].category, "Food");

        let persisted = CategoryStore::load(backend).unwrap();
        assert_eq!(persisted.category("Food").unwrap().keywords, vec!["Starbucks"]);
    }

    #[test]
    fn test_recategorize_rejects_unknown_category() {
        let (mut session, _) = session();
        session.load_csv(STATEMENT.as_bytes()).unwrap();

        let err = session.recategorize(0, "Food").unwrap_err();
        assert!(matches!(err, Error::UnknownCategory(_)));
        assert_eq!(session.debits()[0].category, UNCATEGORIZED);
    }

    #[test]
    fn test_apply_edits_validates_first() {
        let (mut session, _) = session();
        session.create_category("Food").unwrap();
        session.load_csv(STATEMENT.as_bytes()).unwrap();

        let edits = vec![CategoryEdit::new(0, "Food"), CategoryEdit::new(9, "Food")];
        assert!(matches!(session.apply_edits(&edits), Err(Error::RowOutOfRange(9))));
        assert_eq!(session.debits()[0].category, UNCATEGORIZED);
    }

    #[test]
    fn test_apply_edits_counts_changes() {
        let (mut session, _) = session();
        session.create_category("Food").unwrap();
        session.create_category("Transport").unwrap();
        session.load_csv(STATEMENT.as_bytes()).unwrap();

        let edits = vec![
            CategoryEdit::new(0, "Food"),
            CategoryEdit::new(1, "Transport"),
            CategoryEdit::new(2, UNCATEGORIZED),
        ];
        assert_eq!(session.apply_edits(&edits).unwrap(), 2);

        let summary = session.summary();
        assert_eq!(summary.expenses[0].category, "Transport");
        assert_eq!(summary.expenses[0].total, 12.0);
        assert_eq!(summary.total_payments, 2000.0);
    }
}
