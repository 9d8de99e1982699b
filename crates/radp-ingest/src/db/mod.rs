//! Database connection and startup retry discipline
//!
//! A freshly started Postgres container takes a while to accept
//! connections. Everything that runs during startup (pool creation, table
//! creation) goes through `with_startup_retry`, which retries transient
//! "store not ready" errors on a fixed interval forever and propagates any
//! other error immediately as fatal.

pub mod schema;

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{DatabaseConfig, StartupConfig};

/// Database operation errors with contextual information
#[derive(Error, Debug)]
pub enum DbError {
    /// SQL query or connection error
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Database configuration is invalid or missing
    #[error("Database configuration error: {0}")]
    Config(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Whether an error means "the store is still starting up"
///
/// Only these are retried; anything else (bad credentials, missing
/// database, SQL conflicts) is a misconfiguration and fails fast.
pub fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::Tls(_) | sqlx::Error::PoolTimedOut => true,
        // 57P03: cannot_connect_now (server starting up)
        // 53300: too_many_connections
        sqlx::Error::Database(db) => {
            matches!(db.code().as_deref(), Some("57P03") | Some("53300"))
        },
        _ => false,
    }
}

/// Run a startup operation, retrying transient failures on a fixed interval
pub async fn with_startup_retry<T, F, Fut>(
    label: &str,
    interval: Duration,
    mut op: F,
) -> DbResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut attempt: u32 = 1;
    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(attempts = attempt, "{} succeeded after retries", label);
                }
                return Ok(value);
            },
            Err(err) if is_transient(&err) => {
                warn!(
                    attempt,
                    error = %err,
                    retry_in_secs = interval.as_secs(),
                    "{} failed, store not ready yet; retrying",
                    label
                );
                tokio::time::sleep(interval).await;
                attempt += 1;
            },
            Err(err) => return Err(err.into()),
        }
    }
}

/// Open a connection pool, waiting for the store to come up
pub async fn connect_with_retry(
    database: &DatabaseConfig,
    startup: &StartupConfig,
) -> DbResult<PgPool> {
    if database.host.is_empty() {
        return Err(DbError::Config("Postgres host is not configured".to_string()));
    }

    let url = database.url();
    let max_connections = database.max_connections;
    let connect_timeout = Duration::from_secs(database.connect_timeout_secs);
    let interval = Duration::from_secs(startup.retry_interval_secs);

    let pool = with_startup_retry("Database connection", interval, || {
        let url = url.clone();
        async move {
            PgPoolOptions::new()
                .max_connections(max_connections)
                .acquire_timeout(connect_timeout)
                .connect(&url)
                .await
        }
    })
    .await?;

    info!(
        host = %database.host,
        database = %database.database,
        max_connections,
        "Database connection pool established"
    );

    Ok(pool)
}

/// Ensure all required tables exist, under the same retry discipline
pub async fn ensure_schema(pool: &PgPool, startup: &StartupConfig) -> DbResult<()> {
    let interval = Duration::from_secs(startup.retry_interval_secs);

    with_startup_retry("Schema initialization", interval, || {
        let pool = pool.clone();
        async move { schema::create_all(&pool).await }
    })
    .await?;

    info!("Database tables ready");
    Ok(())
}

/// Cheap connectivity probe
pub async fn health_check(pool: &PgPool) -> DbResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(DbError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_is_transient() {
        assert!(is_transient(&sqlx::Error::PoolTimedOut));
        assert!(is_transient(&sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused"
        ))));
        assert!(!is_transient(&sqlx::Error::RowNotFound));
    }

    #[tokio::test]
    async fn test_retry_until_store_accepts() {
        let attempts = Cell::new(0u32);

        let value = with_startup_retry("test operation", Duration::from_millis(1), || {
            attempts.set(attempts.get() + 1);
            let attempt = attempts.get();
            async move {
                if attempt <= 2 {
                    Err(sqlx::Error::PoolTimedOut)
                } else {
                    Ok(attempt)
                }
            }
        })
        .await
        .unwrap();

        // rejected twice, accepted on the third attempt
        assert_eq!(value, 3);
        assert_eq!(attempts.get(), 3);
    }

    #[tokio::test]
    async fn test_non_transient_error_is_fatal() {
        let attempts = Cell::new(0u32);

        let result: DbResult<()> =
            with_startup_retry("test operation", Duration::from_millis(1), || {
                attempts.set(attempts.get() + 1);
                async { Err(sqlx::Error::RowNotFound) }
            })
            .await;

        assert!(matches!(result, Err(DbError::Sqlx(sqlx::Error::RowNotFound))));
        assert_eq!(attempts.get(), 1);
    }
}
