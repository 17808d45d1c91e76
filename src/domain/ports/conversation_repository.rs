//! Conversation repository port.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::Conversation;

/// Append-only store of Slack conversation messages.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Append a message.
    async fn append(&self, conversation: &Conversation) -> DomainResult<()>;

    /// Fetch a single message by id.
    async fn get(&self, id: Uuid) -> DomainResult<Option<Conversation>>;

    /// Most recent messages for a channel, newest first.
    async fn recent_for_channel(&self, channel: &str, limit: usize) -> DomainResult<Vec<Conversation>>;
}
