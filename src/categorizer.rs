// 🔎 Categorizer - exact keyword match, first category in store order wins
//
// Keywords are indexed once per run (keyword → category) so each record is a
// single lookup instead of a scan over every category's keyword list.

use std::collections::HashMap;

use crate::category_store::CategoryStore;
use crate::transaction::{normalize_key, Transaction, UNCATEGORIZED};

/// Global keyword → category lookup built from a `CategoryStore`.
#[derive(Debug, Clone, Default)]
pub struct KeywordIndex {
    owners: HashMap<String, String>,
}

impl KeywordIndex {
    /// Index every keyword of every matchable category.
    ///
    /// "Uncategorized" and categories without keywords are skipped. Categories
    /// are visited in store order and a keyword keeps the first category that
    /// claimed it.
    pub fn build(store: &CategoryStore) -> Self {
        let mut owners = HashMap::new();

        for category in store.categories() {
            if category.is_uncategorized() || category.keywords.is_empty() {
                continue;
            }
            for keyword in &category.keywords {
                owners
                    .entry(normalize_key(keyword))
                    .or_insert_with(|| category.name.clone());
            }
        }

        KeywordIndex { owners }
    }

    /// Category owning `details`, compared trimmed and case-insensitively.
    pub fn lookup(&self, details: &str) -> Option<&str> {
        self.owners.get(&normalize_key(details)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// Assign every record a category, resetting it to "Uncategorized" first.
///
/// Running it again with the same store yields the same categories.
pub fn categorize(transactions: &mut [Transaction], store: &CategoryStore) {
    let index = KeywordIndex::build(store);

    let mut matched = 0;
    for tx in transactions.iter_mut() {
        tx.category = match index.lookup(&tx.details) {
            Some(category) => {
                matched += 1;
                category.to_string()
            }
            None => UNCATEGORIZED.to_string(),
        };
    }

    tracing::debug!(
        "Categorized {matched}/{} transactions using {} keywords",
        transactions.len(),
        index.len()
    );
}

// ============================================================================
// TESTS
// ============================================================================
