//! AI response and consensus result repository port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{AiResponse, ConsensusResult};

/// Store of per-provider responses and the consensus winner per task.
#[async_trait]
pub trait ResponseRepository: Send + Sync {
    /// Insert one provider's response (success or captured failure).
    async fn insert_response(&self, response: &AiResponse) -> DomainResult<()>;

    /// All responses recorded for a task, in insertion order.
    async fn responses_for_task(&self, task_id: Uuid) -> DomainResult<Vec<AiResponse>>;

    /// Store the consensus winner. At most one per task.
    async fn insert_consensus(&self, result: &ConsensusResult) -> DomainResult<()>;

    /// The stored consensus for a task, when one exists.
    async fn consensus_for_task(&self, task_id: Uuid) -> DomainResult<Option<ConsensusResult>>;
}
