//! Usage, health, and change-history repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{ChangeRecord, HealthCheck, UsageLog};

/// Append-only accounting store.
#[async_trait]
pub trait UsageRepository: Send + Sync {
    /// Record one outbound provider call.
    async fn log_usage(&self, log: &UsageLog) -> DomainResult<()>;

    /// Most recent usage rows, newest first.
    async fn recent_usage(&self, limit: usize) -> DomainResult<Vec<UsageLog>>;

    /// Record one provider health probe.
    async fn record_health(&self, check: &HealthCheck) -> DomainResult<()>;

    /// Latest recorded health row per provider.
    async fn latest_health(&self) -> DomainResult<Vec<HealthCheck>>;

    /// Append an audit-trail row.
    async fn record_change(&self, change: &ChangeRecord) -> DomainResult<()>;

    /// Audit rows for one entity, newest first.
    async fn changes_for(&self, entity: &str, entity_id: &str) -> DomainResult<Vec<ChangeRecord>>;
}
