//! SQLite implementation of the UsageRepository.
//!
//! Three append-mostly tables share one repository: usage accounting,
//! provider health probes, and the change-history audit trail.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::adapters::sqlite::{parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ChangeRecord, HealthCheck, UsageLog};
use crate::domain::ports::UsageRepository;

#[derive(Clone)]
pub struct SqliteUsageRepository {
    pool: SqlitePool,
}

impl SqliteUsageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UsageRow {
    id: String,
    provider: String,
    operation: String,
    units: i64,
    latency_ms: i64,
    ok: i64,
    created_at: String,
}

impl TryFrom<UsageRow> for UsageLog {
    type Error = DomainError;

    fn try_from(row: UsageRow) -> DomainResult<UsageLog> {
        Ok(UsageLog {
            id: parse_uuid(&row.id)?,
            provider: row.provider,
            operation: row.operation,
            units: row.units as u64,
            latency_ms: row.latency_ms as u64,
            ok: row.ok != 0,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct HealthRow {
    id: String,
    provider: String,
    healthy: i64,
    detail: Option<String>,
    checked_at: String,
}

impl TryFrom<HealthRow> for HealthCheck {
    type Error = DomainError;

    fn try_from(row: HealthRow) -> DomainResult<HealthCheck> {
        Ok(HealthCheck {
            id: parse_uuid(&row.id)?,
            provider: row.provider,
            healthy: row.healthy != 0,
            detail: row.detail,
            checked_at: parse_datetime(&row.checked_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ChangeRow {
    id: String,
    entity: String,
    entity_id: String,
    action: String,
    detail: Option<String>,
    created_at: String,
}

impl TryFrom<ChangeRow> for ChangeRecord {
    type Error = DomainError;

    fn try_from(row: ChangeRow) -> DomainResult<ChangeRecord> {
        Ok(ChangeRecord {
            id: parse_uuid(&row.id)?,
            entity: row.entity,
            entity_id: row.entity_id,
            action: row.action,
            detail: row.detail,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[async_trait]
impl UsageRepository for SqliteUsageRepository {
    async fn log_usage(&self, log: &UsageLog) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO usage_logs (id, provider, operation, units, latency_ms, ok, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(log.id.to_string())
        .bind(&log.provider)
        .bind(&log.operation)
        .bind(log.units as i64)
        .bind(log.latency_ms as i64)
        .bind(i64::from(log.ok))
        .bind(log.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recent_usage(&self, limit: usize) -> DomainResult<Vec<UsageLog>> {
        let rows: Vec<UsageRow> =
            sqlx::query_as("SELECT * FROM usage_logs ORDER BY created_at DESC LIMIT ?")
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn record_health(&self, check: &HealthCheck) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO health_checks (id, provider, healthy, detail, checked_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(check.id.to_string())
        .bind(&check.provider)
        .bind(i64::from(check.healthy))
        .bind(&check.detail)
        .bind(check.checked_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn latest_health(&self) -> DomainResult<Vec<HealthCheck>> {
        let rows: Vec<HealthRow> = sqlx::query_as(
            "SELECT h.* FROM health_checks h
             INNER JOIN (
                 SELECT provider, MAX(checked_at) AS checked_at
                 FROM health_checks GROUP BY provider
             ) latest ON h.provider = latest.provider AND h.checked_at = latest.checked_at
             ORDER BY h.provider",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn record_change(&self, change: &ChangeRecord) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO change_history (id, entity, entity_id, action, detail, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(change.id.to_string())
        .bind(&change.entity)
        .bind(&change.entity_id)
        .bind(&change.action)
        .bind(&change.detail)
        .bind(change.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn changes_for(&self, entity: &str, entity_id: &str) -> DomainResult<Vec<ChangeRecord>> {
        let rows: Vec<ChangeRow> = sqlx::query_as(
            "SELECT * FROM change_history WHERE entity = ? AND entity_id = ?
             ORDER BY created_at DESC",
        )
        .bind(entity)
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;

    #[tokio::test]
    async fn test_usage_round_trip() {
        let pool = create_migrated_test_pool().await.unwrap();
        let repo = SqliteUsageRepository::new(pool);

        repo.log_usage(&UsageLog::new("openai", "chat", 342, 810, true))
            .await
            .unwrap();

        let recent = repo.recent_usage(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].provider, "openai");
        assert!(recent[0].ok);
    }

    #[tokio::test]
    async fn test_latest_health_keeps_one_row_per_provider() {
        let pool = create_migrated_test_pool().await.unwrap();
        let repo = SqliteUsageRepository::new(pool);

        repo.record_health(&HealthCheck::unhealthy("vault", "sealed"))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        repo.record_health(&HealthCheck::healthy("vault")).await.unwrap();
        repo.record_health(&HealthCheck::healthy("openai")).await.unwrap();

        let latest = repo.latest_health().await.unwrap();
        assert_eq!(latest.len(), 2);
        let vault = latest.iter().find(|h| h.provider == "vault").unwrap();
        assert!(vault.healthy);
    }

    #[tokio::test]
    async fn test_change_history_scoped_to_entity() {
        let pool = create_migrated_test_pool().await.unwrap();
        let repo = SqliteUsageRepository::new(pool);

        repo.record_change(&ChangeRecord::new("tasks", "t1", "status_change", None))
            .await
            .unwrap();
        repo.record_change(&ChangeRecord::new("memory", "k1", "upsert", None))
            .await
            .unwrap();

        let changes = repo.changes_for("tasks", "t1").await.unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].action, "status_change");
    }
}
