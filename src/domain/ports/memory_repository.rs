//! Memory repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::Memory;

/// Key/value fact store with unique keys.
#[async_trait]
pub trait MemoryRepository: Send + Sync {
    /// Insert or replace by key. Replacing bumps `updated_at`.
    async fn upsert(&self, memory: &Memory) -> DomainResult<()>;

    /// Fetch a memory by its unique key.
    async fn get(&self, key: &str) -> DomainResult<Option<Memory>>;

    /// List memories, optionally restricted to a category, newest first.
    async fn list(&self, category: Option<&str>, limit: usize) -> DomainResult<Vec<Memory>>;

    /// Delete by key.
    ///
    /// # Errors
    /// Returns [`crate::domain::errors::DomainError::MemoryNotFound`]
    /// when the key does not exist.
    async fn delete(&self, key: &str) -> DomainResult<()>;
}
