//! Task repository port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Task, TaskStatus};

/// Store of consensus tasks.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a new task.
    async fn create(&self, task: &Task) -> DomainResult<()>;

    /// Fetch a task by id.
    async fn get(&self, id: Uuid) -> DomainResult<Option<Task>>;

    /// Persist a status change. The caller is responsible for having
    /// validated the transition on the domain model first.
    async fn update_status(&self, id: Uuid, status: TaskStatus) -> DomainResult<()>;

    /// List tasks filtered by status, newest first.
    async fn list(&self, status: Option<TaskStatus>, limit: usize) -> DomainResult<Vec<Task>>;
}
