//! Load orchestration
//!
//! Walks `FileKind::LOAD_ORDER` over the reconciled files: parse, bulk
//! write, then persist the outcome on the ledger entry. Each kind's ledger
//! update commits on its own, so a later failure can never roll back an
//! earlier success, and a failure on one kind never stops the attempt on
//! the next.

use chrono::Utc;
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

use crate::db::DbResult;
use crate::models::{FileKind, ProcessingStatus};
use crate::parse::{self, ParseError};
use crate::registry::FileEntry;
use crate::rows::{CharacteristicsRow, EntityRow, LocationsRow, UsersRow, VehiclesRow};
use crate::writer;

/// Why a single file's load did not survive
#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Failed to write rows: {0}")]
    Write(#[from] sqlx::Error),
}

/// Outcome of one kind's load attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Rows landed and the ledger entry is now processed
    Loaded { rows: u64 },
    /// Entry was already processed in an earlier run
    Skipped,
    /// Load failed; the ledger entry records the reason
    Failed { reason: String },
}

/// Per-kind outcomes of a run, in attempt order
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<(FileKind, LoadOutcome)>,
}

impl RunSummary {
    pub fn loaded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, LoadOutcome::Loaded { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, LoadOutcome::Failed { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, LoadOutcome::Skipped))
            .count()
    }
}

/// Load every reconciled file in dependency order
///
/// Characteristics is the root entity the other tables reference by
/// accident number, so it is always attempted first regardless of
/// discovery order.
pub async fn run(
    pool: &PgPool,
    files: &mut BTreeMap<FileKind, FileEntry>,
    delimiter: u8,
) -> DbResult<RunSummary> {
    let mut summary = RunSummary::default();

    for kind in FileKind::LOAD_ORDER {
        let Some(entry) = files.get_mut(&kind) else {
            continue;
        };

        if entry.status() == ProcessingStatus::Processed {
            info!(kind = %kind, file_name = %entry.file.file_name, "Already processed, skipping");
            summary.outcomes.push((kind, LoadOutcome::Skipped));
            continue;
        }

        let outcome = match load_file(pool, kind, &entry.file.path, delimiter).await {
            Ok(rows) => {
                entry.record.status = ProcessingStatus::Processed;
                entry.record.reason = None;
                set_status(pool, entry.record.id, ProcessingStatus::Processed, None).await?;
                info!(kind = %kind, rows, "File processed");
                LoadOutcome::Loaded { rows }
            },
            Err(err) => {
                let reason = err.to_string();
                error!(kind = %kind, error = %reason, "File load failed, continuing with remaining files");
                entry.record.status = ProcessingStatus::Failed;
                entry.record.reason = Some(reason.clone());
                set_status(pool, entry.record.id, ProcessingStatus::Failed, Some(&reason))
                    .await?;
                LoadOutcome::Failed { reason }
            },
        };

        summary.outcomes.push((kind, outcome));
    }

    Ok(summary)
}

/// Parse one file and bulk-write it into its table
async fn load_file(
    pool: &PgPool,
    kind: FileKind,
    path: &Path,
    delimiter: u8,
) -> Result<u64, LoadError> {
    match kind {
        FileKind::Characteristics => load_rows::<CharacteristicsRow>(pool, path, delimiter).await,
        FileKind::Locations => load_rows::<LocationsRow>(pool, path, delimiter).await,
        FileKind::Vehicles => load_rows::<VehiclesRow>(pool, path, delimiter).await,
        FileKind::Users => load_rows::<UsersRow>(pool, path, delimiter).await,
    }
}

async fn load_rows<T: EntityRow>(
    pool: &PgPool,
    path: &Path,
    delimiter: u8,
) -> Result<u64, LoadError> {
    let rows: Vec<T> = parse::read_rows(path, delimiter)?;
    let written = writer::write_rows(pool, &rows).await?;
    Ok(written)
}

/// Persist one ledger entry's status transition, committed immediately
async fn set_status(
    pool: &PgPool,
    id: Uuid,
    status: ProcessingStatus,
    reason: Option<&str>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE raw_accident_files
        SET processing_status = $1, reason = $2, updated_at = $3
        WHERE id = $4
        "#,
    )
    .bind(status.as_str())
    .bind(reason)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let summary = RunSummary {
            outcomes: vec![
                (FileKind::Characteristics, LoadOutcome::Loaded { rows: 3 }),
                (FileKind::Locations, LoadOutcome::Skipped),
                (
                    FileKind::Vehicles,
                    LoadOutcome::Failed {
                        reason: "boom".to_string(),
                    },
                ),
                (FileKind::Users, LoadOutcome::Loaded { rows: 3 }),
            ],
        };

        assert_eq!(summary.loaded(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.skipped(), 1);
    }
}
