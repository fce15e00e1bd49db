use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use simple_finance::report::{
    expense_summary_table, expenses_table, format_amount, payments_table,
};
use simple_finance::{learn, CategoryEdit, CategoryStore, Config, Session};

#[derive(Parser)]
#[command(name = "simple-finance", version, about = "Categorize a bank statement CSV by keyword")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a statement, print expenses, expense summary and payments
    Import {
        csv: PathBuf,

        /// Re-categorize an expense row before summarizing (ROW=CATEGORY)
        #[arg(long = "assign", value_name = "ROW=CATEGORY", value_parser = parse_assignment)]
        assignments: Vec<CategoryEdit>,
    },

    /// List categories and their keywords
    Categories,

    /// Create a new, empty category
    AddCategory { name: String },

    /// Record that transactions described as DETAILS belong to CATEGORY
    Learn { category: String, details: String },
}

fn parse_assignment(raw: &str) -> Result<CategoryEdit, String> {
    let (row, category) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ROW=CATEGORY, got {raw:?}"))?;
    let row = row
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("invalid row {row:?}: {e}"))?;
    Ok(CategoryEdit::new(row, category.trim()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = CategoryStore::load(cli.config.backend()).with_context(|| {
        format!(
            "Failed to load categories from {}",
            cli.config.categories_path.display()
        )
    })?;

    match cli.command {
        Command::Import { csv, assignments } => run_import(store, &cli.config, &csv, &assignments),
        Command::Categories => {
            list_categories(&store);
            Ok(())
        }
        Command::AddCategory { name } => add_category(store, &name),
        Command::Learn { category, details } => run_learn(store, &category, &details),
    }
}

fn run_import(
    store: CategoryStore,
    config: &Config,
    csv: &Path,
    assignments: &[CategoryEdit],
) -> Result<()> {
    let mut session = Session::new(store);
    session
        .load_path(csv)
        .map_err(|e| anyhow!("Error processing csv file: {e}"))?;

    if !assignments.is_empty() {
        let changed = session.apply_edits(assignments)?;
        println!("✓ Applied {changed} category change(s)");
    }

    println!("\n💸 Your Expenses");
    print!("{}", expenses_table(session.debits(), &config.currency));

    println!("\n📊 Expense Summary");
    print!("{}", expense_summary_table(&session.expense_summary(), &config.currency));

    println!("\n💰 Payments Summary");
    println!(
        "Total Payments: {}",
        format_amount(session.total_payments(), &config.currency)
    );
    print!("{}", payments_table(session.credits(), &config.currency));

    Ok(())
}

fn list_categories(store: &CategoryStore) {
    for category in store.categories() {
        if category.keywords.is_empty() {
            println!("{}", category.name);
        } else {
            println!("{}: {}", category.name, category.keywords.join(", "));
        }
    }
}

fn add_category(mut store: CategoryStore, name: &str) -> Result<()> {
    if store.create_category(name)? {
        println!("✓ Created category {name:?}");
    } else {
        println!("Category {name:?} already exists or is blank");
    }
    Ok(())
}

fn run_learn(mut store: CategoryStore, category: &str, details: &str) -> Result<()> {
    if learn(&mut store, category, details)? {
        println!("✓ {details:?} will be categorized as {category:?}");
    } else {
        println!("Nothing learned: {details:?} is blank or already a keyword");
    }
    Ok(())
}
