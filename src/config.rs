// ⚙️ Configuration - shared by the CLI and the server
// Flags override environment variables, which override defaults.

use clap::Args;
use std::path::PathBuf;

use crate::store::FileBackend;

pub const DEFAULT_CATEGORIES_PATH: &str = "categories.json";
pub const DEFAULT_CURRENCY: &str = "INR";

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// JSON file holding the category → keywords mapping
    #[arg(
        long = "categories",
        env = "SIMPLE_FINANCE_CATEGORIES",
        default_value = DEFAULT_CATEGORIES_PATH,
        global = true
    )]
    pub categories_path: PathBuf,

    /// Label printed after amounts
    #[arg(
        long,
        env = "SIMPLE_FINANCE_CURRENCY",
        default_value = DEFAULT_CURRENCY,
        global = true
    )]
    pub currency: String,
}

impl Config {
    pub fn backend(&self) -> FileBackend {
        FileBackend::new(&self.categories_path)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            categories_path: PathBuf::from(DEFAULT_CATEGORIES_PATH),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}
