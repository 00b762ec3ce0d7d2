//! Database connection pool management and schema bootstrap

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::time::Duration;

use crate::{
    config::DatabaseConfig,
    context::RequestContext,
    error::{Error, Result},
    sql::SqlHandler,
};

/// Idempotent schema for the items table
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        brand TEXT NOT NULL,
        purchase_price INTEGER NOT NULL,
        purchase_date TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_items_category ON items (category)",
];

/// Create a SQLite connection pool with retry logic
///
/// Retries `config.max_retries` times with exponential backoff starting at
/// `config.retry_delay_secs`.
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    let mut attempt = 0;
    let base_delay = Duration::from_secs(config.retry_delay_secs);

    loop {
        match try_create_pool(config).await {
            Ok(pool) => {
                if attempt > 0 {
                    tracing::info!(
                        "Database connection established after {} attempt(s)",
                        attempt + 1
                    );
                } else {
                    tracing::info!(
                        "Database connection pool created: max={}, min={}",
                        config.max_connections,
                        config.min_connections
                    );
                }
                return Ok(pool);
            }
            Err(e) => {
                attempt += 1;

                if attempt > config.max_retries {
                    tracing::error!(
                        "Failed to connect to database after {} attempts: {}",
                        config.max_retries + 1,
                        e
                    );
                    return Err(e);
                }

                let delay = base_delay * 2_u32.pow(attempt.saturating_sub(1));

                tracing::warn!(
                    "Database connection attempt {} failed: {}. Retrying in {:?}...",
                    attempt,
                    e,
                    delay
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Attempt to create a database pool (single try)
async fn try_create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
        .connect(&config.url)
        .await
        .map_err(|e| {
            Error::Internal(format!(
                "Failed to connect to database at '{}' ({}): {}",
                config.url,
                categorize_db_error(&e),
                e
            ))
        })
}

/// Single-connection in-memory pool
///
/// Every SQLite `:memory:` connection is its own database, so the pool is
/// pinned to one connection that is never recycled.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .map_err(|e| Error::Internal(format!("Failed to open in-memory database: {}", e)))
}

/// Create the items table and its category index if missing
pub async fn ensure_schema<H: SqlHandler>(handler: &H) -> Result<()> {
    let ctx = RequestContext::background();
    for statement in SCHEMA {
        handler.execute(&ctx, statement, &[]).await?;
    }
    tracing::debug!("Database schema ready");
    Ok(())
}

/// Categorize database error for better user guidance
fn categorize_db_error(err: &sqlx::Error) -> &'static str {
    use sqlx::Error;
    match err {
        Error::Configuration(_) => "configuration error - check the sqlite URL",
        Error::Database(_) => "database error",
        Error::Io(_) => "I/O error - check the database file path and permissions",
        Error::PoolTimedOut => "connection pool timeout",
        Error::PoolClosed => "connection pool closed",
        Error::WorkerCrashed => "database worker crashed",
        _ => "connection error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::{SqliteHandler, SqlValue};

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let handler = SqliteHandler::new(connect_in_memory().await.unwrap());
        ensure_schema(&handler).await.unwrap();
        ensure_schema(&handler).await.unwrap();

        let row = handler
            .query_row(
                &RequestContext::background(),
                "SELECT COUNT(*) FROM sqlite_master WHERE type = ? AND name = ?",
                &[SqlValue::from("table"), SqlValue::from("items")],
            )
            .await
            .unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_pool_gives_up_after_retries() {
        let config = DatabaseConfig {
            url: "sqlite:///nonexistent-dir/catalog/items.db".to_string(),
            max_connections: 1,
            min_connections: 0,
            connection_timeout_secs: 1,
            max_retries: 0,
            retry_delay_secs: 0,
        };

        let err = create_pool(&config).await.unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }
}
