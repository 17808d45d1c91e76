//! SQLite implementation of the MemoryRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::adapters::sqlite::{parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Memory;
use crate::domain::ports::MemoryRepository;

#[derive(Clone)]
pub struct SqliteMemoryRepository {
    pool: SqlitePool,
}

impl SqliteMemoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct MemoryRow {
    id: String,
    key: String,
    value: String,
    category: String,
    updated_at: String,
}

impl TryFrom<MemoryRow> for Memory {
    type Error = DomainError;

    fn try_from(row: MemoryRow) -> DomainResult<Memory> {
        Ok(Memory {
            id: parse_uuid(&row.id)?,
            key: row.key,
            value: row.value,
            category: row.category,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}

#[async_trait]
impl MemoryRepository for SqliteMemoryRepository {
    async fn upsert(&self, memory: &Memory) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO memory (id, key, value, category, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT (key) DO UPDATE SET
                 value = excluded.value,
                 category = excluded.category,
                 updated_at = excluded.updated_at",
        )
        .bind(memory.id.to_string())
        .bind(&memory.key)
        .bind(&memory.value)
        .bind(&memory.category)
        .bind(memory.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> DomainResult<Option<Memory>> {
        let row: Option<MemoryRow> = sqlx::query_as("SELECT * FROM memory WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn list(&self, category: Option<&str>, limit: usize) -> DomainResult<Vec<Memory>> {
        let rows: Vec<MemoryRow> = if let Some(category) = category {
            sqlx::query_as(
                "SELECT * FROM memory WHERE category = ? ORDER BY updated_at DESC LIMIT ?",
            )
            .bind(category)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as("SELECT * FROM memory ORDER BY updated_at DESC LIMIT ?")
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await?
        };
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn delete(&self, key: &str) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM memory WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MemoryNotFound(key.to_string()));
        }
        Ok(())
    }
}
