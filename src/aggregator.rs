// 📊 Aggregator - summary numbers for the expense and payment views
// Pure functions; callers partition by direction first.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::transaction::{Direction, Transaction};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Per-category sums, largest first.
///
/// Equal totals keep alphabetical category order.
pub fn aggregate_by_category(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for tx in transactions {
        *sums.entry(tx.category.as_str()).or_insert(0.0) += tx.amount;
    }

    let mut totals: Vec<CategoryTotal> = sums
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect();

    // sort_by is stable, so ties stay alphabetical
    totals.sort_by(|a, b| b.total.total_cmp(&a.total));
    totals
}

/// Sum of every amount.
pub fn total_payments(transactions: &[Transaction]) -> f64 {
    transactions.iter().map(|t| t.amount).sum()
}

/// Split records into (debits, credits), preserving order.
pub fn split_by_direction(transactions: Vec<Transaction>) -> (Vec<Transaction>, Vec<Transaction>) {
    transactions
        .into_iter()
        .partition(|t| t.direction == Direction::Debit)
}
