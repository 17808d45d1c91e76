//! Memory service: key/value facts with an audit trail.

use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ChangeRecord, Memory};
use crate::domain::ports::{MemoryRepository, UsageRepository};

pub struct MemoryService {
    memories: Arc<dyn MemoryRepository>,
    usage: Arc<dyn UsageRepository>,
}

impl MemoryService {
    pub fn new(memories: Arc<dyn MemoryRepository>, usage: Arc<dyn UsageRepository>) -> Self {
        Self { memories, usage }
    }

    /// Store or replace a fact and append the audit row.
    pub async fn remember(
        &self,
        key: &str,
        value: &str,
        category: Option<&str>,
    ) -> DomainResult<Memory> {
        if key.trim().is_empty() {
            return Err(DomainError::ValidationFailed(
                "memory key cannot be empty".to_string(),
            ));
        }

        let memory = Memory::new(key, value, category.unwrap_or("general"));
        self.memories.upsert(&memory).await?;
        self.usage
            .record_change(&ChangeRecord::new("memory", key, "upsert", None))
            .await?;
        Ok(memory)
    }

    /// Look a fact up by key.
    pub async fn recall(&self, key: &str) -> DomainResult<Memory> {
        self.memories
            .get(key)
            .await?
            .ok_or_else(|| DomainError::MemoryNotFound(key.to_string()))
    }

    pub async fn list(&self, category: Option<&str>, limit: usize) -> DomainResult<Vec<Memory>> {
        self.memories.list(category, limit).await
    }

    /// Delete a fact and append the audit row.
    pub async fn forget(&self, key: &str) -> DomainResult<()> {
        self.memories.delete(key).await?;
        self.usage
            .record_change(&ChangeRecord::new("memory", key, "delete", None))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{
        create_migrated_test_pool, SqliteMemoryRepository, SqliteUsageRepository,
    };
    use crate::domain::ports::UsageRepository as _;

    async fn service() -> (MemoryService, Arc<SqliteUsageRepository>) {
        let pool = create_migrated_test_pool().await.unwrap();
        let usage = Arc::new(SqliteUsageRepository::new(pool.clone()));
        (
            MemoryService::new(Arc::new(SqliteMemoryRepository::new(pool)), usage.clone()),
            usage,
        )
    }

    #[tokio::test]
    async fn test_remember_and_recall() {
        let (service, usage) = service().await;

        service.remember("oncall", "alice", Some("ops")).await.unwrap();
        let memory = service.recall("oncall").await.unwrap();
        assert_eq!(memory.value, "alice");

        let changes = usage.changes_for("memory", "oncall").await.unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].action, "upsert");
    }

    #[tokio::test]
    async fn test_recall_missing_key() {
        let (service, _) = service().await;
        let err = service.recall("missing").await.unwrap_err();
        assert!(matches!(err, DomainError::MemoryNotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let (service, _) = service().await;
        let err = service.remember("  ", "value", None).await.unwrap_err();
        assert!(matches!(err, DomainError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_forget_records_change() {
        let (service, usage) = service().await;
        service.remember("temp", "x", None).await.unwrap();
        service.forget("temp").await.unwrap();

        assert!(service.recall("temp").await.is_err());
        let changes = usage.changes_for("memory", "temp").await.unwrap();
        assert_eq!(changes.len(), 2);
    }
}
