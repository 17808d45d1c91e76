//! Usage accounting, provider health, and the audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One outbound provider call, recorded after the fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageLog {
    pub id: Uuid,
    pub provider: String,
    /// Operation label, e.g. "chat" or "dependabot_alerts".
    pub operation: String,
    /// Provider-specific unit count (tokens, characters, images).
    pub units: u64,
    pub latency_ms: u64,
    pub ok: bool,
    pub created_at: DateTime<Utc>,
}

impl UsageLog {
    pub fn new(
        provider: impl Into<String>,
        operation: impl Into<String>,
        units: u64,
        latency_ms: u64,
        ok: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            provider: provider.into(),
            operation: operation.into(),
            units,
            latency_ms,
            ok,
            created_at: Utc::now(),
        }
    }
}

/// Result of pinging one provider's cheapest endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub id: Uuid,
    pub provider: String,
    pub healthy: bool,
    pub detail: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl HealthCheck {
    pub fn healthy(provider: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            provider: provider.into(),
            healthy: true,
            detail: None,
            checked_at: Utc::now(),
        }
    }

    pub fn unhealthy(provider: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            provider: provider.into(),
            healthy: false,
            detail: Some(detail.into()),
            checked_at: Utc::now(),
        }
    }
}

/// Audit-trail row written whenever persistent state changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub id: Uuid,
    /// Entity table name, e.g. "tasks" or "memory".
    pub entity: String,
    pub entity_id: String,
    /// Action label, e.g. "status_change" or "upsert".
    pub action: String,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChangeRecord {
    pub fn new(
        entity: impl Into<String>,
        entity_id: impl Into<String>,
        action: impl Into<String>,
        detail: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity: entity.into(),
            entity_id: entity_id.into(),
            action: action.into(),
            detail,
            created_at: Utc::now(),
        }
    }
}
