//! SQLite database connection pool management.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::DatabaseConfig;

/// Open the pool described by the database section of the config.
///
/// WAL journaling and foreign keys are always on; the CHECK constraints
/// in the schema rely on the latter.
pub async fn create_pool(config: &DatabaseConfig) -> DomainResult<SqlitePool> {
    ensure_database_directory(&config.path)?;

    let url = format!("sqlite:{}", config.path);
    let connect_options = SqliteConnectOptions::from_str(&url)
        .map_err(|_| {
            DomainError::ValidationFailed(format!("invalid database path: {}", config.path))
        })?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(connect_options)
        .await?;

    Ok(pool)
}

/// In-memory pool for tests. Single connection so the database survives
/// for the pool's lifetime.
pub async fn create_test_pool() -> DomainResult<SqlitePool> {
    let connect_options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|_| DomainError::ValidationFailed("invalid test database URL".to_string()))?
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options)
        .await?;

    Ok(pool)
}

fn ensure_database_directory(path: &str) -> DomainResult<()> {
    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DomainError::ValidationFailed(format!(
                    "failed to create {}: {e}",
                    parent.display()
                ))
            })?;
        }
    }
    Ok(())
}
