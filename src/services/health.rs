//! Provider health checks.
//!
//! Probes the cheapest observable signal per provider (credential
//! presence for chat providers, `sys/health` for Vault) and records a
//! `health_checks` row for each.

use std::sync::Arc;

use crate::domain::errors::DomainResult;
use crate::domain::models::HealthCheck;
use crate::domain::ports::{ChatProvider, SecretStore, UsageRepository};

pub struct HealthService {
    chat_providers: Vec<Arc<dyn ChatProvider>>,
    secret_store: Option<Arc<dyn SecretStore>>,
    usage: Arc<dyn UsageRepository>,
}

impl HealthService {
    pub fn new(
        chat_providers: Vec<Arc<dyn ChatProvider>>,
        secret_store: Option<Arc<dyn SecretStore>>,
        usage: Arc<dyn UsageRepository>,
    ) -> Self {
        Self {
            chat_providers,
            secret_store,
            usage,
        }
    }

    /// Probe every configured provider and persist the results.
    pub async fn check_all(&self) -> DomainResult<Vec<HealthCheck>> {
        let mut checks = Vec::new();

        for provider in &self.chat_providers {
            let check = if provider.is_available().await {
                HealthCheck::healthy(provider.name())
            } else {
                HealthCheck::unhealthy(provider.name(), "credential not configured")
            };
            checks.push(check);
        }

        if let Some(store) = &self.secret_store {
            let check = match store.health().await {
                Ok(true) => HealthCheck::healthy("vault"),
                Ok(false) => HealthCheck::unhealthy("vault", "sealed or standby"),
                Err(e) => HealthCheck::unhealthy("vault", e.to_string()),
            };
            checks.push(check);
        }

        for check in &checks {
            self.usage.record_health(check).await?;
        }

        Ok(checks)
    }
}
