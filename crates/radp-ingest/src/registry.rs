//! File registry reconciliation
//!
//! Reconciles the files discovered on disk against the persisted ledger.
//! A content hash that any ledger row already marks processed is skipped
//! outright; everything else gets a fresh pending row. Reconciling the same
//! set of files twice inserts nothing the second time.

use sqlx::PgPool;
use std::collections::BTreeMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::DbResult;
use crate::discover::DiscoveredFile;
use crate::models::{FileKind, ProcessingStatus, RawFileRecord};

/// A discovered file bundled with its ledger record
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub file: DiscoveredFile,
    pub record: RawFileRecord,
}

impl FileEntry {
    pub fn status(&self) -> ProcessingStatus {
        self.record.status
    }
}

/// Reconcile discovered files against the ledger
///
/// All new pending rows ride one transaction, committed once after every
/// descriptor has been examined.
pub async fn reconcile(
    pool: &PgPool,
    discovered: BTreeMap<FileKind, DiscoveredFile>,
) -> DbResult<BTreeMap<FileKind, FileEntry>> {
    let mut tx = pool.begin().await?;
    let mut entries = BTreeMap::new();

    for (kind, file) in discovered {
        debug!(
            kind = %kind,
            file_name = %file.file_name,
            md5 = %file.md5,
            "Checking whether file content was already processed"
        );

        let existing: Vec<(Uuid, String)> = sqlx::query_as(
            "SELECT id, processing_status FROM raw_accident_files WHERE md5 = $1",
        )
        .bind(&file.md5)
        .fetch_all(&mut *tx)
        .await?;

        let processed = existing
            .iter()
            .find(|(_, status)| ProcessingStatus::from(status.as_str()) == ProcessingStatus::Processed);

        if let Some((id, _)) = processed {
            info!(
                kind = %kind,
                dir_name = %file.dir_name,
                file_name = %file.file_name,
                "File content already processed, skipping"
            );

            let mut record =
                RawFileRecord::pending(kind, &file.dir_name, &file.file_name, &file.md5);
            record.id = *id;
            record.status = ProcessingStatus::Processed;
            entries.insert(kind, FileEntry { file, record });
            continue;
        }

        let record = RawFileRecord::pending(kind, &file.dir_name, &file.file_name, &file.md5);

        info!(
            kind = %kind,
            file_name = %file.file_name,
            "Registering file in the ledger"
        );

        sqlx::query(
            r#"
            INSERT INTO raw_accident_files (
                id, file_kind, dir_name, file_name, md5,
                processing_status, reason, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            "#,
        )
        .bind(record.id)
        .bind(kind.as_str())
        .bind(&record.dir_name)
        .bind(&record.file_name)
        .bind(&record.md5)
        .bind(record.status.as_str())
        .bind(&record.reason)
        .bind(record.created_at)
        .execute(&mut *tx)
        .await?;

        entries.insert(kind, FileEntry { file, record });
    }

    tx.commit().await?;
    info!(files = entries.len(), "Ledger reconciliation committed");

    Ok(entries)
}
