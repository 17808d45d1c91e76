//! SQLite implementation of the ResponseRepository.
//!
//! Covers both `ai_responses` and `consensus_results`; the two tables
//! only ever change together under the consensus pipeline.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AiResponse, ConsensusResult};
use crate::domain::ports::ResponseRepository;

#[derive(Clone)]
pub struct SqliteResponseRepository {
    pool: SqlitePool,
}

impl SqliteResponseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ResponseRow {
    id: String,
    task_id: String,
    provider: String,
    model: String,
    content: Option<String>,
    latency_ms: i64,
    input_tokens: i64,
    output_tokens: i64,
    error: Option<String>,
    created_at: String,
}

impl TryFrom<ResponseRow> for AiResponse {
    type Error = DomainError;

    fn try_from(row: ResponseRow) -> DomainResult<AiResponse> {
        Ok(AiResponse {
            id: parse_uuid(&row.id)?,
            task_id: parse_uuid(&row.task_id)?,
            provider: row.provider,
            model: row.model,
            content: row.content,
            latency_ms: row.latency_ms as u64,
            input_tokens: row.input_tokens as u64,
            output_tokens: row.output_tokens as u64,
            error: row.error,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ConsensusRow {
    id: String,
    task_id: String,
    winning_response_id: String,
    score: f64,
    method: String,
    created_at: String,
}

impl TryFrom<ConsensusRow> for ConsensusResult {
    type Error = DomainError;

    fn try_from(row: ConsensusRow) -> DomainResult<ConsensusResult> {
        Ok(ConsensusResult {
            id: parse_uuid(&row.id)?,
            task_id: parse_uuid(&row.task_id)?,
            winning_response_id: parse_uuid(&row.winning_response_id)?,
            score: row.score,
            method: row.method,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[async_trait]
impl ResponseRepository for SqliteResponseRepository {
    async fn insert_response(&self, response: &AiResponse) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO ai_responses (id, task_id, provider, model, content, latency_ms,
             input_tokens, output_tokens, error, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(response.id.to_string())
        .bind(response.task_id.to_string())
        .bind(&response.provider)
        .bind(&response.model)
        .bind(&response.content)
        .bind(response.latency_ms as i64)
        .bind(response.input_tokens as i64)
        .bind(response.output_tokens as i64)
        .bind(&response.error)
        .bind(response.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn responses_for_task(&self, task_id: Uuid) -> DomainResult<Vec<AiResponse>> {
        let rows: Vec<ResponseRow> =
            sqlx::query_as("SELECT * FROM ai_responses WHERE task_id = ? ORDER BY created_at, id")
                .bind(task_id.to_string())
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn insert_consensus(&self, result: &ConsensusResult) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO consensus_results (id, task_id, winning_response_id, score, method, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(result.id.to_string())
        .bind(result.task_id.to_string())
        .bind(result.winning_response_id.to_string())
        .bind(result.score)
        .bind(&result.method)
        .bind(result.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn consensus_for_task(&self, task_id: Uuid) -> DomainResult<Option<ConsensusResult>> {
        let row: Option<ConsensusRow> =
            sqlx::query_as("SELECT * FROM consensus_results WHERE task_id = ?")
                .bind(task_id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        row.map(TryInto::try_into).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use crate::adapters::sqlite::task_repository::SqliteTaskRepository;
    use crate::domain::models::Task;
    use crate::domain::ports::TaskRepository;

    async fn seeded_task(pool: &SqlitePool) -> Task {
        let task = Task::new("ask", "prompt");
        SqliteTaskRepository::new(pool.clone())
            .create(&task)
            .await
            .unwrap();
        task
    }

    #[tokio::test]
    async fn test_responses_round_trip_in_order() {
        let pool = create_migrated_test_pool().await.unwrap();
        let task = seeded_task(&pool).await;
        let repo = SqliteResponseRepository::new(pool);

        let ok = AiResponse::success(task.id, "openai", "gpt-4o", "answer", 250);
        let failed = AiResponse::failure(task.id, "perplexity", "sonar", "401 unauthorized", 90);
        repo.insert_response(&ok).await.unwrap();
        repo.insert_response(&failed).await.unwrap();

        let stored = repo.responses_for_task(task.id).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored[0].is_success());
        assert_eq!(stored[1].error.as_deref(), Some("401 unauthorized"));
    }

    #[tokio::test]
    async fn test_consensus_unique_per_task() {
        let pool = create_migrated_test_pool().await.unwrap();
        let task = seeded_task(&pool).await;
        let repo = SqliteResponseRepository::new(pool);

        let response = AiResponse::success(task.id, "openai", "gpt-4o", "answer", 250);
        repo.insert_response(&response).await.unwrap();

        let result = ConsensusResult::new(task.id, response.id, 0.87, "weighted_sum_v1");
        repo.insert_consensus(&result).await.unwrap();

        let fetched = repo.consensus_for_task(task.id).await.unwrap().unwrap();
        assert_eq!(fetched.winning_response_id, response.id);

        // A second consensus row for the same task violates the UNIQUE constraint.
        let duplicate = ConsensusResult::new(task.id, response.id, 0.5, "weighted_sum_v1");
        assert!(repo.insert_consensus(&duplicate).await.is_err());
    }

    #[tokio::test]
    async fn test_response_requires_existing_task() {
        let pool = create_migrated_test_pool().await.unwrap();
        let repo = SqliteResponseRepository::new(pool);

        let orphan = AiResponse::success(Uuid::new_v4(), "openai", "gpt-4o", "answer", 10);
        assert!(repo.insert_response(&orphan).await.is_err());
    }
}
