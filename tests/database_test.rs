//! Schema-level integration tests: CHECK constraints, foreign keys, and
//! cascade behavior that the repositories rely on.

use quorum::adapters::sqlite::{create_migrated_test_pool, SqliteResponseRepository, SqliteTaskRepository};
use quorum::domain::models::{AiResponse, Task, TaskStatus};
use quorum::domain::ports::{ResponseRepository, TaskRepository};

#[tokio::test]
async fn test_status_check_constraint_rejects_unknown_values() {
    let pool = create_migrated_test_pool().await.unwrap();

    let result = sqlx::query(
        "INSERT INTO tasks (id, kind, prompt, status, created_at, updated_at)
         VALUES ('t1', 'ask', 'p', 'paused', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await;

    assert!(result.is_err(), "unknown status must violate the CHECK constraint");
}

#[tokio::test]
async fn test_role_check_constraint() {
    let pool = create_migrated_test_pool().await.unwrap();

    let result = sqlx::query(
        "INSERT INTO conversations (id, channel, user_id, role, content, created_at)
         VALUES ('c1', 'C1', 'U1', 'moderator', 'hi', '2026-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_deleting_task_cascades_to_responses_and_consensus() {
    let pool = create_migrated_test_pool().await.unwrap();
    let tasks = SqliteTaskRepository::new(pool.clone());
    let responses = SqliteResponseRepository::new(pool.clone());

    let task = Task::new("ask", "prompt");
    tasks.create(&task).await.unwrap();
    let response = AiResponse::success(task.id, "openai", "gpt-4o", "answer", 50);
    responses.insert_response(&response).await.unwrap();

    sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(task.id.to_string())
        .execute(&pool)
        .await
        .unwrap();

    let remaining = responses.responses_for_task(task.id).await.unwrap();
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn test_memory_key_unique_constraint() {
    let pool = create_migrated_test_pool().await.unwrap();

    sqlx::query(
        "INSERT INTO memory (id, key, value, category, updated_at)
         VALUES ('m1', 'k', 'v1', 'general', '2026-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await
    .unwrap();

    // A second plain INSERT with the same key must fail; the repository
    // goes through ON CONFLICT instead.
    let result = sqlx::query(
        "INSERT INTO memory (id, key, value, category, updated_at)
         VALUES ('m2', 'k', 'v2', 'general', '2026-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_status_round_trip_through_repository() {
    let pool = create_migrated_test_pool().await.unwrap();
    let tasks = SqliteTaskRepository::new(pool);

    let mut task = Task::new("ask", "prompt");
    tasks.create(&task).await.unwrap();

    task.transition_to(TaskStatus::Running).unwrap();
    tasks.update_status(task.id, task.status).await.unwrap();
    task.transition_to(TaskStatus::Completed).unwrap();
    tasks.update_status(task.id, task.status).await.unwrap();

    let stored = tasks.get(task.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Completed);
}
