// Simple Finance - Core Library
// Statement CSV → normalized records → keyword categories → summaries.
// Exposes all modules for use in the CLI, the API server, and tests.

pub mod error;
pub mod config;
pub mod transaction;
pub mod normalizer;     // CSV rows → Transaction
pub mod store;          // blob persistence backends
pub mod category_store; // category → keywords, persisted on every change
pub mod categorizer;    // exact keyword match, first category wins
pub mod learner;        // manual edits become keywords
pub mod aggregator;     // per-category totals, total payments
pub mod session;        // explicit per-user context
pub mod report;         // plain-text tables

// Re-export commonly used types
pub use error::{Error, Result};
pub use config::Config;
pub use transaction::{Direction, Transaction, DEFAULT_STATUS, UNCATEGORIZED};
pub use normalizer::{
    load_transactions, load_transactions_from_path, normalize, parse_amount, parse_date,
    read_rows, RawRow, REQUIRED_COLUMNS,
};
pub use store::{FileBackend, MemoryBackend, StoreBackend};
pub use category_store::{Category, CategoryMap, CategoryStore};
pub use categorizer::{categorize, KeywordIndex};
pub use learner::learn;
pub use aggregator::{aggregate_by_category, split_by_direction, total_payments, CategoryTotal};
pub use session::{CategoryEdit, Session, Summary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
