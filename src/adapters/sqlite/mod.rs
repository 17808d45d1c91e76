//! SQLite database adapters for the quorum backend.

pub mod connection;
pub mod conversation_repository;
pub mod memory_repository;
pub mod migrations;
pub mod response_repository;
pub mod task_repository;
pub mod usage_repository;

pub use connection::{create_pool, create_test_pool};
pub use conversation_repository::SqliteConversationRepository;
pub use memory_repository::SqliteMemoryRepository;
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
pub use response_repository::SqliteResponseRepository;
pub use task_repository::SqliteTaskRepository;
pub use usage_repository::SqliteUsageRepository;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::DatabaseConfig;

/// Parse a UUID string from a SQLite row field.
pub fn parse_uuid(s: &str) -> DomainResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| DomainError::SerializationError(e.to_string()))
}

/// Parse an RFC3339 datetime string from a SQLite row field.
pub fn parse_datetime(s: &str) -> DomainResult<DateTime<Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| DomainError::SerializationError(e.to_string()))
        .map(|dt| dt.with_timezone(&Utc))
}

/// Open the configured database and bring the schema up to date.
pub async fn initialize_database(config: &DatabaseConfig) -> DomainResult<SqlitePool> {
    let pool = create_pool(config).await?;
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
    Ok(pool)
}

/// Create an in-memory test pool with all migrations applied.
pub async fn create_migrated_test_pool() -> DomainResult<SqlitePool> {
    let pool = create_test_pool().await?;
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
    Ok(pool)
}
