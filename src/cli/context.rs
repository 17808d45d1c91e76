//! Shared command context: config, database, repositories, services.

use anyhow::{Context as _, Result};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::adapters::devops::{
    GitHubClient, GitHubConfig, SnykClient, SnykConfig, SonarQubeClient, SonarQubeConfig,
    VaultClient,
};
use crate::adapters::providers::{
    ElevenLabsClient, ElevenLabsConfig, OpenAiClient, OpenAiConfig, PerplexityClient,
    PerplexityConfig, StabilityClient, StabilityConfig,
};
use crate::adapters::sqlite::{
    initialize_database, SqliteConversationRepository, SqliteMemoryRepository,
    SqliteResponseRepository, SqliteTaskRepository, SqliteUsageRepository,
};
use crate::domain::models::Config;
use crate::domain::ports::{ChatProvider, SecretStore};
use crate::infrastructure::config::ConfigLoader;
use crate::services::{
    ConsensusService, HealthService, MemoryService, RegisteredProvider, SearchHistory,
    SearchService, SecurityReportBuilder,
};

/// Static consensus trust weights per provider.
const OPENAI_WEIGHT: f64 = 0.6;
const PERPLEXITY_WEIGHT: f64 = 0.4;

/// Everything a command needs, wired once per invocation.
pub struct AppContext {
    pub config: Config,
    pub pool: SqlitePool,
    pub tasks: Arc<SqliteTaskRepository>,
    pub responses: Arc<SqliteResponseRepository>,
    pub memories: Arc<SqliteMemoryRepository>,
    pub conversations: Arc<SqliteConversationRepository>,
    pub usage: Arc<SqliteUsageRepository>,
    pub history: Arc<SearchHistory>,
}

impl AppContext {
    /// Load config, open the database, and apply migrations.
    pub async fn load() -> Result<Self> {
        let config = ConfigLoader::load()?;
        Self::with_config(config).await
    }

    pub async fn with_config(config: Config) -> Result<Self> {
        let pool = initialize_database(&config.database)
            .await
            .context("Failed to initialize database")?;

        let history = Arc::new(SearchHistory::new(config.history_capacity));
        Ok(Self {
            tasks: Arc::new(SqliteTaskRepository::new(pool.clone())),
            responses: Arc::new(SqliteResponseRepository::new(pool.clone())),
            memories: Arc::new(SqliteMemoryRepository::new(pool.clone())),
            conversations: Arc::new(SqliteConversationRepository::new(pool.clone())),
            usage: Arc::new(SqliteUsageRepository::new(pool.clone())),
            history,
            config,
            pool,
        })
    }

    /// The chat providers registered for consensus runs.
    pub fn chat_providers(&self) -> Result<Vec<RegisteredProvider>> {
        let openai = OpenAiClient::new(OpenAiConfig::from_provider_config(
            &self.config.providers.openai,
        ))?;
        let perplexity = PerplexityClient::new(PerplexityConfig::from_provider_config(
            &self.config.providers.perplexity,
        ))?;

        Ok(vec![
            RegisteredProvider {
                provider: Arc::new(openai),
                weight: OPENAI_WEIGHT,
            },
            RegisteredProvider {
                provider: Arc::new(perplexity),
                weight: PERPLEXITY_WEIGHT,
            },
        ])
    }

    pub fn consensus_service(&self) -> Result<ConsensusService> {
        Ok(ConsensusService::new(
            self.chat_providers()?,
            self.tasks.clone(),
            self.responses.clone(),
            self.usage.clone(),
        ))
    }

    pub fn search_service(&self) -> Result<SearchService> {
        let client = PerplexityClient::new(PerplexityConfig::from_provider_config(
            &self.config.providers.perplexity,
        ))?;
        Ok(SearchService::new(
            client,
            self.history.clone(),
            self.usage.clone(),
        ))
    }

    pub fn memory_service(&self) -> MemoryService {
        MemoryService::new(self.memories.clone(), self.usage.clone())
    }

    pub fn stability_client(&self) -> Result<StabilityClient> {
        Ok(StabilityClient::new(StabilityConfig::from_provider_config(
            &self.config.providers.stability,
        ))?)
    }

    pub fn elevenlabs_client(&self) -> Result<ElevenLabsClient> {
        Ok(ElevenLabsClient::new(
            ElevenLabsConfig::from_provider_config(&self.config.providers.elevenlabs),
        )?)
    }

    pub fn vault_client(&self) -> Result<VaultClient> {
        Ok(VaultClient::new(self.config.vault.clone())?)
    }

    pub fn security_report_builder(&self) -> Result<SecurityReportBuilder> {
        let github = GitHubClient::new(GitHubConfig::from_provider_config(
            &self.config.providers.github,
        ))?;
        let snyk = SnykClient::new(SnykConfig::from_provider_config(
            &self.config.providers.snyk,
        ))?;
        let sonarqube = SonarQubeClient::new(SonarQubeConfig::from_provider_config(
            &self.config.providers.sonarqube,
        ))?;
        Ok(SecurityReportBuilder::new(
            Some(github),
            Some(snyk),
            Some(sonarqube),
        ))
    }

    pub fn health_service(&self) -> Result<HealthService> {
        let providers: Vec<Arc<dyn ChatProvider>> = self
            .chat_providers()?
            .into_iter()
            .map(|entry| entry.provider)
            .collect();
        let vault: Arc<dyn SecretStore> = Arc::new(self.vault_client()?);
        Ok(HealthService::new(
            providers,
            Some(vault),
            self.usage.clone(),
        ))
    }
}
