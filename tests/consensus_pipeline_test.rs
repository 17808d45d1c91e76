//! End-to-end consensus pipeline tests.
//!
//! Runs the full pipeline against real provider clients pointed at mock
//! HTTP servers and an in-memory database, then verifies every table the
//! run is supposed to touch.

use std::sync::Arc;

use quorum::adapters::providers::{
    OpenAiClient, OpenAiConfig, PerplexityClient, PerplexityConfig,
};
use quorum::adapters::sqlite::{
    create_migrated_test_pool, SqliteResponseRepository, SqliteTaskRepository,
    SqliteUsageRepository,
};
use quorum::domain::models::TaskStatus;
use quorum::domain::ports::{ResponseRepository, TaskRepository, UsageRepository};
use quorum::services::{ConsensusService, RegisteredProvider};

fn openai_body(content: &str) -> String {
    serde_json::json!({
        "model": "gpt-4o-mini",
        "choices": [{"message": {"role": "assistant", "content": content}}],
        "usage": {"prompt_tokens": 11, "completion_tokens": 23}
    })
    .to_string()
}

fn perplexity_body(content: &str) -> String {
    serde_json::json!({
        "model": "sonar",
        "choices": [{"message": {"role": "assistant", "content": content}}],
        "citations": ["https://example.com/"],
        "usage": {"prompt_tokens": 9, "completion_tokens": 17}
    })
    .to_string()
}

struct Harness {
    service: ConsensusService,
    tasks: Arc<SqliteTaskRepository>,
    responses: Arc<SqliteResponseRepository>,
    usage: Arc<SqliteUsageRepository>,
}

async fn harness(openai_url: String, perplexity_url: String) -> Harness {
    let pool = create_migrated_test_pool().await.unwrap();
    let tasks = Arc::new(SqliteTaskRepository::new(pool.clone()));
    let responses = Arc::new(SqliteResponseRepository::new(pool.clone()));
    let usage = Arc::new(SqliteUsageRepository::new(pool));

    let openai = OpenAiClient::new(OpenAiConfig {
        api_key: Some("test-key".to_string()),
        base_url: openai_url,
        ..Default::default()
    })
    .unwrap();
    let perplexity = PerplexityClient::new(PerplexityConfig {
        api_key: Some("test-key".to_string()),
        base_url: perplexity_url,
        ..Default::default()
    })
    .unwrap();

    let service = ConsensusService::new(
        vec![
            RegisteredProvider {
                provider: Arc::new(openai),
                weight: 0.6,
            },
            RegisteredProvider {
                provider: Arc::new(perplexity),
                weight: 0.4,
            },
        ],
        tasks.clone(),
        responses.clone(),
        usage.clone(),
    );

    Harness {
        service,
        tasks,
        responses,
        usage,
    }
}

#[tokio::test]
async fn test_full_run_persists_every_table() {
    let mut openai_server = mockito::Server::new_async().await;
    let mut perplexity_server = mockito::Server::new_async().await;

    openai_server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(openai_body("Borrowing lets you reference data without taking ownership."))
        .create_async()
        .await;
    perplexity_server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(perplexity_body("Borrowing is a reference."))
        .create_async()
        .await;

    let harness = harness(openai_server.url(), perplexity_server.url()).await;
    let outcome = harness
        .service
        .run_task("ask", "explain borrowing")
        .await
        .unwrap();

    // Task reached completed and is stored that way.
    let stored_task = harness.tasks.get(outcome.task.id).await.unwrap().unwrap();
    assert_eq!(stored_task.status, TaskStatus::Completed);

    // Both provider responses persisted with token counts.
    let stored_responses = harness
        .responses
        .responses_for_task(outcome.task.id)
        .await
        .unwrap();
    assert_eq!(stored_responses.len(), 2);
    assert!(stored_responses.iter().all(|r| r.is_success()));
    let openai_row = stored_responses
        .iter()
        .find(|r| r.provider == "openai")
        .unwrap();
    assert_eq!(openai_row.input_tokens, 11);
    assert_eq!(openai_row.output_tokens, 23);

    // Consensus row exists and points at a stored response.
    let consensus = harness
        .responses
        .consensus_for_task(outcome.task.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored_responses
        .iter()
        .any(|r| r.id == consensus.winning_response_id));
    assert!(consensus.score > 0.0 && consensus.score <= 1.0);

    // Usage accounting: one chat row per provider, both ok.
    let usage = harness.usage.recent_usage(10).await.unwrap();
    assert_eq!(usage.len(), 2);
    assert!(usage.iter().all(|u| u.operation == "chat" && u.ok));

    // Audit trail: created + running + completed.
    let changes = harness
        .usage
        .changes_for("tasks", &outcome.task.id.to_string())
        .await
        .unwrap();
    assert_eq!(changes.len(), 3);
}

#[tokio::test]
async fn test_all_providers_down_marks_task_failed() {
    let mut openai_server = mockito::Server::new_async().await;
    let mut perplexity_server = mockito::Server::new_async().await;

    openai_server
        .mock("POST", "/chat/completions")
        .with_status(500)
        .with_body("openai down")
        .create_async()
        .await;
    perplexity_server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body("bad key")
        .create_async()
        .await;

    let harness = harness(openai_server.url(), perplexity_server.url()).await;
    let outcome = harness.service.run_task("ask", "anyone there").await.unwrap();

    assert_eq!(outcome.task.status, TaskStatus::Failed);
    assert!(outcome.consensus.is_none());

    // Failures are captured per provider, not lost.
    let stored_responses = harness
        .responses
        .responses_for_task(outcome.task.id)
        .await
        .unwrap();
    assert_eq!(stored_responses.len(), 2);
    assert!(stored_responses.iter().all(|r| r.error.is_some()));

    // No consensus row was written.
    assert!(harness
        .responses
        .consensus_for_task(outcome.task.id)
        .await
        .unwrap()
        .is_none());

    // Usage rows recorded the failures.
    let usage = harness.usage.recent_usage(10).await.unwrap();
    assert!(usage.iter().all(|u| !u.ok));
}

#[test]
fn test_missing_api_key_is_captured_without_network() {
    // No mock servers needed: the missing key error fires before any
    // request, and the pipeline captures it like any provider failure.
    temp_env::with_var_unset("OPENAI_API_KEY", || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let pool = create_migrated_test_pool().await.unwrap();
            let tasks = Arc::new(SqliteTaskRepository::new(pool.clone()));
            let responses = Arc::new(SqliteResponseRepository::new(pool.clone()));
            let usage = Arc::new(SqliteUsageRepository::new(pool));

            let openai = OpenAiClient::new(OpenAiConfig::default()).unwrap();
            let service = ConsensusService::new(
                vec![RegisteredProvider {
                    provider: Arc::new(openai),
                    weight: 1.0,
                }],
                tasks,
                responses.clone(),
                usage,
            );

            let outcome = service.run_task("ask", "prompt").await.unwrap();
            assert_eq!(outcome.task.status, TaskStatus::Failed);

            let stored = responses.responses_for_task(outcome.task.id).await.unwrap();
            assert_eq!(stored.len(), 1);
            assert!(stored[0]
                .error
                .as_deref()
                .unwrap()
                .contains("OPENAI_API_KEY"));
        });
    });
}
