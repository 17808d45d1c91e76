//! Secret store port (Vault KV v2).

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::errors::DomainResult;

/// Key/value secret storage.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Read every field of the secret at `path`.
    async fn read_secret(&self, path: &str) -> DomainResult<HashMap<String, String>>;

    /// Write (create or overwrite) the secret at `path`.
    async fn write_secret(&self, path: &str, data: &HashMap<String, String>) -> DomainResult<()>;

    /// List child keys under `path`.
    async fn list_secrets(&self, path: &str) -> DomainResult<Vec<String>>;

    /// Delete the latest version of the secret at `path`.
    async fn delete_secret(&self, path: &str) -> DomainResult<()>;

    /// Whether the store is reachable and unsealed.
    async fn health(&self) -> DomainResult<bool>;
}
