//! Consensus pipeline: tasks -> ai_responses -> consensus_results.
//!
//! One run fans a prompt out to every registered chat provider, stores
//! each response (captured failures included), scores the successes with
//! a fixed linear weighted sum, and stores the winner. Task status moves
//! pending -> running -> completed, or failed when every provider errors.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AiResponse, ChangeRecord, ConsensusResult, Task, TaskStatus, UsageLog};
use crate::domain::ports::{ChatProvider, ResponseRepository, TaskRepository, UsageRepository};

/// Label stored in `consensus_results.method`.
const SCORING_METHOD: &str = "weighted_sum_v1";

/// Fixed scoring weights. Length and latency are normalized across the
/// response set before weighting; the provider weight is static config.
const LENGTH_WEIGHT: f64 = 0.5;
const LATENCY_WEIGHT: f64 = 0.3;
const PROVIDER_WEIGHT: f64 = 0.2;

/// A provider registered with the pipeline plus its static trust weight
/// in `[0, 1]`.
pub struct RegisteredProvider {
    pub provider: Arc<dyn ChatProvider>,
    pub weight: f64,
}

/// Everything one consensus run produced.
#[derive(Debug)]
pub struct ConsensusOutcome {
    pub task: Task,
    pub responses: Vec<AiResponse>,
    /// `None` when every provider failed.
    pub consensus: Option<ConsensusResult>,
    /// Winning content, when a consensus exists.
    pub winning_content: Option<String>,
}

/// The consensus/task pipeline service.
pub struct ConsensusService {
    providers: Vec<RegisteredProvider>,
    tasks: Arc<dyn TaskRepository>,
    responses: Arc<dyn ResponseRepository>,
    usage: Arc<dyn UsageRepository>,
}

impl ConsensusService {
    pub fn new(
        providers: Vec<RegisteredProvider>,
        tasks: Arc<dyn TaskRepository>,
        responses: Arc<dyn ResponseRepository>,
        usage: Arc<dyn UsageRepository>,
    ) -> Self {
        Self {
            providers,
            tasks,
            responses,
            usage,
        }
    }

    /// Run one prompt through the full pipeline.
    pub async fn run_task(&self, kind: &str, prompt: &str) -> DomainResult<ConsensusOutcome> {
        if self.providers.is_empty() {
            return Err(DomainError::ValidationFailed(
                "no chat providers registered".to_string(),
            ));
        }

        let mut task = Task::new(kind, prompt);
        self.tasks.create(&task).await?;
        self.record_status_change(&task, "created").await?;

        task.transition_to(TaskStatus::Running)?;
        self.tasks.update_status(task.id, TaskStatus::Running).await?;
        self.record_status_change(&task, "status_change").await?;

        let responses = self.fan_out(task.id, prompt).await?;

        let consensus = self.pick_winner(task.id, &responses);
        let final_status = if consensus.is_some() {
            TaskStatus::Completed
        } else {
            TaskStatus::Failed
        };

        if let Some(result) = &consensus {
            self.responses.insert_consensus(result).await?;
        }

        task.transition_to(final_status)?;
        self.tasks.update_status(task.id, final_status).await?;
        self.record_status_change(&task, "status_change").await?;

        let winning_content = consensus.as_ref().and_then(|c| {
            responses
                .iter()
                .find(|r| r.id == c.winning_response_id)
                .and_then(|r| r.content.clone())
        });

        info!(
            task_id = %task.id,
            providers = responses.len(),
            status = task.status.as_str(),
            "consensus run finished"
        );

        Ok(ConsensusOutcome {
            task,
            responses,
            consensus,
            winning_content,
        })
    }

    /// Fan the prompt out to every provider concurrently; capture each
    /// failure into its response row instead of failing the run.
    async fn fan_out(&self, task_id: Uuid, prompt: &str) -> DomainResult<Vec<AiResponse>> {
        let calls = self.providers.iter().map(|entry| {
            let provider = Arc::clone(&entry.provider);
            async move {
                let name = provider.name();
                let model = provider.model();
                let outcome = provider.chat(prompt).await;
                (name, model, outcome)
            }
        });

        let mut responses = Vec::with_capacity(self.providers.len());
        for (name, model, outcome) in join_all(calls).await {
            let response = match outcome {
                Ok(outcome) => {
                    let units = outcome.input_tokens + outcome.output_tokens;
                    self.usage
                        .log_usage(&UsageLog::new(name, "chat", units, outcome.latency_ms, true))
                        .await?;
                    AiResponse::success(task_id, name, outcome.model, outcome.content, outcome.latency_ms)
                        .with_tokens(outcome.input_tokens, outcome.output_tokens)
                }
                Err(e) => {
                    warn!(provider = name, error = %e, "provider failed during fan-out");
                    self.usage
                        .log_usage(&UsageLog::new(name, "chat", 0, 0, false))
                        .await?;
                    AiResponse::failure(task_id, name, model, e.to_string(), 0)
                }
            };
            self.responses.insert_response(&response).await?;
            responses.push(response);
        }

        Ok(responses)
    }

    /// Score the successful responses and pick the maximum. Ties break
    /// on earliest insertion. Returns `None` when nothing succeeded.
    fn pick_winner(&self, task_id: Uuid, responses: &[AiResponse]) -> Option<ConsensusResult> {
        let successes: Vec<&AiResponse> = responses.iter().filter(|r| r.is_success()).collect();
        if successes.is_empty() {
            return None;
        }

        let max_len = successes
            .iter()
            .map(|r| r.content.as_deref().map_or(0, str::len))
            .max()
            .unwrap_or(0)
            .max(1);
        let min_latency = successes
            .iter()
            .map(|r| r.latency_ms)
            .min()
            .unwrap_or(0)
            .max(1);

        let mut winner: Option<(&AiResponse, f64)> = None;
        for &response in &successes {
            let weight = self.weight_for(&response.provider);
            let length_score =
                response.content.as_deref().map_or(0, str::len) as f64 / max_len as f64;
            let latency_score = min_latency as f64 / response.latency_ms.max(1) as f64;
            let score = LENGTH_WEIGHT * length_score
                + LATENCY_WEIGHT * latency_score
                + PROVIDER_WEIGHT * weight;

            // Strictly greater keeps the earliest response on ties.
            if winner.map_or(true, |(_, best)| score > best) {
                winner = Some((response, score));
            }
        }

        winner.map(|(response, score)| {
            ConsensusResult::new(task_id, response.id, score, SCORING_METHOD)
        })
    }

    fn weight_for(&self, provider: &str) -> f64 {
        self.providers
            .iter()
            .find(|entry| entry.provider.name() == provider)
            .map_or(0.0, |entry| entry.weight)
    }

    async fn record_status_change(&self, task: &Task, action: &str) -> DomainResult<()> {
        self.usage
            .record_change(&ChangeRecord::new(
                "tasks",
                task.id.to_string(),
                action,
                Some(task.status.as_str().to_string()),
            ))
            .await
    }
}
