//! bibdb-ingest - batch ingestion CLI
//!
//! Loads one file of harvested records, normalizes them for the given
//! source and ingests them into the SQLite store. The batch summary is
//! printed as JSON on stdout; logs go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bibdb_common::config::{load_toml_config, resolve_database_path};
use bibdb_ingest::{loader, IngestOrchestrator, SourceKind, Store};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for bibdb-ingest
#[derive(Parser, Debug)]
#[command(name = "bibdb-ingest")]
#[command(about = "Normalize harvested bibliographic records into a relational store")]
#[command(version)]
struct Args {
    /// Upstream source of the records (arxiv or scopus)
    #[arg(short, long)]
    source: SourceKind,

    /// Batch file (.json, .jsonl or .csv)
    #[arg(short, long)]
    input: PathBuf,

    /// SQLite database path
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "BIBDB_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG or --log-level fix the filter; otherwise start at info and
    // switch to the configured level once the config file is read
    let explicit_filter = EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| args.log_level.as_deref().map(crate_filter));
    let pinned = explicit_filter.is_some();

    let (filter, filter_handle) =
        reload::Layer::new(explicit_filter.unwrap_or_else(|| crate_filter("info")));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_toml_config(args.config.as_deref()).context("Failed to load configuration")?;

    if !pinned {
        filter_handle
            .reload(crate_filter(&config.logging.level))
            .context("Failed to apply configured log level")?;
    }

    info!("Starting bibdb-ingest {}", env!("CARGO_PKG_VERSION"));

    let db_path = resolve_database_path(args.database.as_deref(), &config);
    info!("Database: {}", db_path.display());

    let records = loader::load_records(&args.input)
        .with_context(|| format!("Failed to load {}", args.input.display()))?;
    info!("Loaded {} records from {}", records.len(), args.input.display());

    let store = Store::open(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let mut orchestrator = IngestOrchestrator::from_config(store.clone(), &config);
    let summary = orchestrator
        .ingest_batch(&records, args.source)
        .await
        .context("Ingestion aborted")?;

    store.close().await;

    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("Failed to serialize batch summary")?
    );

    Ok(())
}

/// Filter applying `level` to the bibdb crates
fn crate_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("bibdb_ingest={},bibdb_common={}", level, level))
}
