//! RADP Ingest - road accident data ingestion
//!
//! Loads the four raw accident CSV exports (characteristics, locations,
//! vehicles, users) into PostgreSQL exactly once per distinct file content.
//! Every discovered file is tracked in a ledger table by the MD5 of its
//! bytes; content that was ever loaded successfully is never loaded again,
//! and a file that fails is retried on the next run without disturbing its
//! siblings.

pub mod config;
pub mod db;
pub mod discover;
pub mod loader;
pub mod models;
pub mod parse;
pub mod progress;
pub mod registry;
pub mod rows;
pub mod writer;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::IngestConfig;
use crate::loader::RunSummary;

/// Run one full ingestion pass: connect, ensure schema, reconcile, load
pub async fn run_pipeline(config: &IngestConfig) -> Result<RunSummary> {
    let pool = db::connect_with_retry(&config.database, &config.startup)
        .await
        .context("Database connection failed")?;

    db::ensure_schema(&pool, &config.startup)
        .await
        .context("Schema initialization failed")?;

    let discovered = discover::scan(&config.files.root)
        .context("Raw file discovery failed")?;

    if discovered.is_empty() {
        warn!(
            root = %config.files.root.display(),
            "No raw accident files found, nothing to do"
        );
        return Ok(RunSummary::default());
    }

    let mut files = registry::reconcile(&pool, discovered)
        .await
        .context("Ledger reconciliation failed")?;

    let summary = loader::run(&pool, &mut files, config.files.delimiter)
        .await
        .context("Load orchestration failed")?;

    info!(
        loaded = summary.loaded(),
        skipped = summary.skipped(),
        failed = summary.failed(),
        "Ingestion run finished"
    );

    Ok(summary)
}
