//! Offline loader: clean a raw disaster-events CSV and load it into SQLite.
//! Runs once before the dashboard starts; re-running from scratch is the only
//! recovery path.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;

use hazardboard::data::{clean, read_raw_csv};
use hazardboard::schema;
use hazardboard::store::EventStore;

#[derive(Parser, Debug)]
#[command(
    name = "hazardboard-load",
    about = "Clean a raw disaster-events CSV and load it into SQLite"
)]
struct Cli {
    /// Raw CSV export with the disaster events
    #[arg(long)]
    csv: PathBuf,

    /// SQLite database the cleaned table is written to
    #[arg(long)]
    database: PathBuf,

    /// Name of the table to replace
    #[arg(long, default_value = schema::DEFAULT_TABLE)]
    table: String,

    /// How many disaster types to keep before bucketing the rest into "Others"
    #[arg(long, default_value_t = 10)]
    top_types: usize,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }
    env_logger::init();

    let raw = read_raw_csv(&cli.csv).with_context(|| format!("reading {}", cli.csv.display()))?;
    info!("read {} rows from {}", raw.height(), cli.csv.display());

    let cleaned = clean(raw, cli.top_types).context("cleaning raw events")?;
    info!(
        "retained {} disaster types: {}",
        cleaned.retained_types.len(),
        cleaned.retained_types.join(", ")
    );

    let mut store = EventStore::open(&cli.database, &cli.table)
        .with_context(|| format!("opening {}", cli.database.display()))?;
    let written = store
        .replace_events(&cleaned.frame)
        .context("writing cleaned table")?;
    info!(
        "wrote {} rows to table '{}' in {}",
        written,
        cli.table,
        cli.database.display()
    );

    Ok(())
}
