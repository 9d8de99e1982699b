//! Bulk table writer
//!
//! Inserts every row of one parsed file into its entity table inside a
//! single transaction. Any bind or constraint error aborts the whole
//! transaction and surfaces to the orchestrator; the table is left exactly
//! as it was.

use sqlx::PgPool;
use tracing::info;

use crate::progress::row_progress;
use crate::rows::EntityRow;

/// Parameterized insert statement for `T`, one placeholder per column
fn insert_statement<T: EntityRow>() -> String {
    let placeholders = (1..=T::COLUMNS.len())
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        T::TABLE,
        T::COLUMNS.join(", "),
        placeholders
    )
}

/// Write all rows as one unit of work
pub async fn write_rows<T: EntityRow>(pool: &PgPool, rows: &[T]) -> Result<u64, sqlx::Error> {
    info!(table = T::TABLE, rows = rows.len(), "Adding data to table");

    let statement = insert_statement::<T>();
    let mut tx = pool.begin().await?;
    let pb = row_progress(rows.len() as u64, T::TABLE);

    for row in rows {
        row.bind(sqlx::query(&statement)).execute(&mut *tx).await?;
        pb.inc(1);
    }

    tx.commit().await?;
    pb.finish_and_clear();

    info!(table = T::TABLE, rows = rows.len(), "Table load committed");

    Ok(rows.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::{CharacteristicsRow, UsersRow};

    #[test]
    fn test_insert_statement_shape() {
        let statement = insert_statement::<CharacteristicsRow>();
        assert!(statement.starts_with("INSERT INTO characteristics (num_acc, "));
        assert_eq!(
            statement.matches('$').count(),
            CharacteristicsRow::COLUMNS.len()
        );
        assert!(statement.ends_with(&format!("${})", CharacteristicsRow::COLUMNS.len())));
    }

    #[test]
    fn test_insert_statement_users() {
        let statement = insert_statement::<UsersRow>();
        assert!(statement.starts_with("INSERT INTO users ("));
        assert_eq!(statement.matches('$').count(), UsersRow::COLUMNS.len());
    }
}
