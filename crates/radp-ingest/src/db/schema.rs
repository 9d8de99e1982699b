//! Schema initialization
//!
//! `CREATE TABLE IF NOT EXISTS` for the ingestion ledger and the four
//! entity tables. Statements are idempotent; running them against an
//! already-initialized database is a no-op. Schema *migration* is out of
//! scope: the column sets are a fixed contract with the upstream exports.

use sqlx::PgPool;
use tracing::debug;

/// DDL statements, in creation order
const STATEMENTS: &[&str] = &[
    // Ledger: one row per discovered source file, addressed by content MD5
    r#"
    CREATE TABLE IF NOT EXISTS raw_accident_files (
        id UUID PRIMARY KEY,
        file_kind TEXT NOT NULL,
        dir_name TEXT NOT NULL,
        file_name TEXT NOT NULL,
        md5 TEXT NOT NULL,
        processing_status TEXT NOT NULL DEFAULT 'pending',
        reason TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_raw_accident_files_md5
        ON raw_accident_files (md5)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS characteristics (
        id BIGSERIAL PRIMARY KEY,
        num_acc BIGINT NOT NULL,
        jour INTEGER NOT NULL,
        mois INTEGER NOT NULL,
        an INTEGER NOT NULL,
        hrmn TEXT NOT NULL,
        lum INTEGER,
        dep TEXT NOT NULL,
        com TEXT NOT NULL,
        agg INTEGER,
        int INTEGER,
        atm INTEGER,
        col INTEGER,
        adr TEXT,
        lat TEXT NOT NULL,
        long TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS locations (
        id BIGSERIAL PRIMARY KEY,
        num_acc BIGINT NOT NULL,
        catr INTEGER,
        voie TEXT,
        v1 TEXT,
        v2 TEXT,
        circ INTEGER,
        nbv INTEGER,
        vosp INTEGER,
        prof INTEGER,
        pr TEXT,
        pr1 TEXT,
        plan INTEGER,
        lartpc TEXT,
        larrout TEXT,
        surf INTEGER,
        infra INTEGER,
        situ INTEGER,
        vma INTEGER
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS vehicles (
        id BIGSERIAL PRIMARY KEY,
        num_acc BIGINT NOT NULL,
        id_vehicule TEXT NOT NULL,
        num_veh TEXT NOT NULL,
        senc INTEGER,
        catv INTEGER,
        obs INTEGER,
        obsm INTEGER,
        choc INTEGER,
        manv INTEGER,
        motor INTEGER,
        occutc INTEGER
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        num_acc BIGINT NOT NULL,
        id_vehicule TEXT NOT NULL,
        num_veh TEXT NOT NULL,
        place INTEGER,
        catu INTEGER,
        grav INTEGER,
        sexe INTEGER,
        an_nais INTEGER,
        trajet INTEGER,
        secu1 INTEGER,
        secu2 INTEGER,
        secu3 INTEGER,
        locp INTEGER,
        actp TEXT,
        etatp INTEGER
    )
    "#,
];

/// Create all required tables
pub async fn create_all(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    debug!(statements = STATEMENTS.len(), "Schema DDL applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_entity_table_has_ddl() {
        for table in ["raw_accident_files", "characteristics", "locations", "vehicles", "users"] {
            assert!(
                STATEMENTS
                    .iter()
                    .any(|s| s.contains(&format!("CREATE TABLE IF NOT EXISTS {}", table))),
                "missing DDL for {}",
                table
            );
        }
    }
}
