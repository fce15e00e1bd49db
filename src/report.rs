// 🧾 Plain-text Reports - expense table, summary and payments for the CLI
// Rendering only; every number comes from Session / aggregator.

use numfmt::{Formatter, Precision};
use std::fmt::Write;
use std::sync::OnceLock;

use crate::aggregator::CategoryTotal;
use crate::transaction::Transaction;

fn amount_formatter() -> &'static Formatter {
    static FORMATTER: OnceLock<Formatter> = OnceLock::new();

    FORMATTER.get_or_init(|| {
        // ',' is always accepted as a separator
        Formatter::new()
            .separator(',')
            .unwrap_or_else(|_| Formatter::new())
            .precision(Precision::Decimals(2))
    })
}

/// Two decimals, thousands separators, trailing currency label.
///
/// `format_amount(1234.5, "INR")` → `"1,234.50 INR"`
pub fn format_amount(amount: f64, currency: &str) -> String {
    let rounded = (amount.abs() * 100.0).round() / 100.0;

    let mut formatted = if rounded > 0.0 {
        amount_formatter().fmt_string(rounded)
    } else {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        "0.00".to_owned()
    };

    // numfmt drops trailing zeros ("12.30" comes out as "12.3"), put them back
    match formatted.split_once('.').map(|(_, fraction)| fraction.len()) {
        None => formatted.push_str(".00"),
        Some(1) => formatted.push('0'),
        Some(_) => {}
    }

    let sign = if amount < 0.0 && rounded > 0.0 { "-" } else { "" };
    if currency.is_empty() {
        format!("{sign}{formatted}")
    } else {
        format!("{sign}{formatted} {currency}")
    }
}

// ============================================================================
// TABLE
// ============================================================================

/// Column-aligned text table.
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    right_align: Vec<bool>,
}

impl Table {
    pub fn new(header: &[&str]) -> Self {
        Table {
            header: header.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
            right_align: vec![false; header.len()],
        }
    }

    pub fn right_align(mut self, cols: &[usize]) -> Self {
        for &col in cols {
            if let Some(flag) = self.right_align.get_mut(col) {
                *flag = true;
            }
        }
        self
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.header.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, value) in row.iter().enumerate().take(widths.len()) {
                widths[i] = widths[i].max(value.chars().count());
            }
        }

        let mut out = String::new();
        self.render_row(&mut out, &widths, &self.header);
        let total: usize = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(total));
        out.push('\n');
        for row in &self.rows {
            self.render_row(&mut out, &widths, row);
        }
        out
    }

    fn render_row(&self, out: &mut String, widths: &[usize], row: &[String]) {
        let cells: Vec<String> = row
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (value, &width))| {
                if self.right_align[i] {
                    format!("{value:>width$}")
                } else {
                    format!("{value:<width$}")
                }
            })
            .collect();
        let _ = writeln!(out, "{}", cells.join("   ").trim_end());
    }
}

// ============================================================================
// REPORTS
// ============================================================================

/// Row-numbered expense table (row numbers are what edits refer to).
pub fn expenses_table(debits: &[Transaction], currency: &str) -> String {
    let mut table = Table::new(&["#", "Date", "Details", "Amount", "Category"]).right_align(&[0, 3]);
    for (row, tx) in debits.iter().enumerate() {
        table.add_row(vec![
            row.to_string(),
            tx.display_date(),
            tx.details.clone(),
            format_amount(tx.amount, currency),
            tx.category.clone(),
        ]);
    }
    table.render()
}

pub fn expense_summary_table(totals: &[CategoryTotal], currency: &str) -> String {
    let mut table = Table::new(&["Category", "Amount"]).right_align(&[1]);
    for total in totals {
        table.add_row(vec![total.category.clone(), format_amount(total.total, currency)]);
    }
    table.render()
}

pub fn payments_table(credits: &[Transaction], currency: &str) -> String {
    let mut table = Table::new(&["Date", "Details", "Amount", "Status"]).right_align(&[2]);
    for tx in credits {
        table.add_row(vec![
            tx.display_date(),
            tx.details.clone(),
            format_amount(tx.amount, currency),
            tx.status.clone(),
        ]);
    }
    table.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{Direction, DEFAULT_STATUS};
    use chrono::NaiveDate;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1234.5, "INR"), "1,234.50 INR");
        assert_eq!(format_amount(0.0, "INR"), "0.00 INR");
        assert_eq!(format_amount(999.999, "INR"), "1,000.00 INR");
        assert_eq!(format_amount(1234567.891, ""), "1,234,567.89");
        assert_eq!(format_amount(-42.1, "EUR"), "-42.10 EUR");
        assert_eq!(format_amount(12.0, "INR"), "12.00 INR");
        assert_eq!(format_amount(-0.001, "INR"), "0.00 INR");
    }

    #[test]
    fn test_table_alignment() {
        let mut table = Table::new(&["Category", "Amount"]).right_align(&[1]);
        table.add_row(vec!["Food".to_string(), "150.00".to_string()]);
        table.add_row(vec!["Transport".to_string(), "30.00".to_string()]);

        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Category    Amount");
        assert_eq!(lines[1], "------------------");
        assert_eq!(lines[2], "Food        150.00");
        assert_eq!(lines[3], "Transport    30.00");
    }

    #[test]
    fn test_expenses_table_numbers_rows() {
        let mut tx = Transaction::new(
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            "Starbucks",
            4.5,
            DEFAULT_STATUS,
            Direction::Debit,
        );
        tx.category = "Food".to_string();

        let rendered = expenses_table(&[tx], "INR");
        assert!(rendered.lines().nth(2).unwrap().starts_with("0   15/01/2024   Starbucks"));
        assert!(rendered.contains("4.50 INR"));
    }
}
