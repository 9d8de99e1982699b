//! RADP Ingest - binary entry point

use anyhow::Result;
use clap::Parser;
use radp_common::logging::{init_logging, LogConfig, LogLevel};
use radp_ingest::config::IngestConfig;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "radp-ingest")]
#[command(author, version, about = "Road accident data ingestion tool")]
struct Cli {
    /// Root directory containing the raw accident CSV files
    /// (overrides RAW_FILES_ROOT_DIR)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Exit after the run instead of staying resident
    #[arg(long)]
    once: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env().unwrap_or_default();
    log_config.log_file_prefix = "radp-ingest".to_string();
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }
    init_logging(&log_config)?;

    let mut config = IngestConfig::load()?;
    if let Some(root) = cli.root {
        config.files.root = root;
    }

    info!(
        root = %config.files.root.display(),
        host = %config.database.host,
        database = %config.database.database,
        "Starting road accident ingestion"
    );

    radp_ingest::run_pipeline(&config).await?;

    if cli.once {
        return Ok(());
    }

    // Scheduled environments expect the container to stay up after the
    // one-shot workload; the ledger makes the next restart a no-op anyway.
    info!("Done populating the database, staying resident until terminated");
    loop {
        tokio::time::sleep(Duration::from_secs(120)).await;
    }
}
