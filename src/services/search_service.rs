//! Grounded search service.
//!
//! Wraps the Perplexity client, recording every operation into the
//! rolling history and the usage log.

use std::sync::Arc;

use crate::adapters::providers::PerplexityClient;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{GroundedAnswer, HistoryEntry, UsageLog, VerifiedClaim};
use crate::domain::ports::UsageRepository;
use crate::services::history::SearchHistory;

pub struct SearchService {
    client: PerplexityClient,
    history: Arc<SearchHistory>,
    usage: Arc<dyn UsageRepository>,
}

impl SearchService {
    pub fn new(
        client: PerplexityClient,
        history: Arc<SearchHistory>,
        usage: Arc<dyn UsageRepository>,
    ) -> Self {
        Self {
            client,
            history,
            usage,
        }
    }

    /// Run one grounded search, recording history and usage.
    pub async fn search(&self, query: &str) -> DomainResult<GroundedAnswer> {
        let result = self.client.search(query).await;

        self.history
            .record(HistoryEntry::new("search", query, result.is_ok()))
            .await;
        let latency = result.as_ref().map_or(0, |a| a.latency_ms);
        self.usage
            .log_usage(&UsageLog::new(
                "perplexity",
                "search",
                0,
                latency,
                result.is_ok(),
            ))
            .await?;

        result
    }

    /// Fan out many searches; each item succeeds or fails independently.
    pub async fn search_batch(
        &self,
        queries: &[String],
    ) -> DomainResult<Vec<Result<GroundedAnswer, DomainError>>> {
        let results = self.client.search_batch(queries).await;

        for (query, result) in queries.iter().zip(&results) {
            self.history
                .record(HistoryEntry::new("search", query, result.is_ok()))
                .await;
        }
        let ok = results.iter().filter(|r| r.is_ok()).count() as u64;
        self.usage
            .log_usage(&UsageLog::new(
                "perplexity",
                "search_batch",
                queries.len() as u64,
                0,
                ok == queries.len() as u64,
            ))
            .await?;

        Ok(results)
    }

    /// Verify a batch of claims; per-item errors are captured in the
    /// returned records.
    pub async fn verify_batch(&self, claims: &[String]) -> DomainResult<Vec<VerifiedClaim>> {
        let verdicts = self.client.verify_batch(claims).await;

        for verdict in &verdicts {
            self.history
                .record(HistoryEntry::new(
                    "verify",
                    &verdict.claim,
                    verdict.error.is_none(),
                ))
                .await;
        }
        let ok = verdicts.iter().filter(|v| v.error.is_none()).count() as u64;
        self.usage
            .log_usage(&UsageLog::new(
                "perplexity",
                "verify_batch",
                claims.len() as u64,
                0,
                ok == claims.len() as u64,
            ))
            .await?;

        Ok(verdicts)
    }

    /// The most recent history entries, newest first.
    pub async fn recent_history(&self, n: usize) -> Vec<HistoryEntry> {
        self.history.recent(n).await
    }
}
