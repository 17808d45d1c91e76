//! SQLite implementation of the ConversationRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Conversation, ConversationRole};
use crate::domain::ports::ConversationRepository;

#[derive(Clone)]
pub struct SqliteConversationRepository {
    pool: SqlitePool,
}

impl SqliteConversationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ConversationRow {
    id: String,
    channel: String,
    user_id: String,
    role: String,
    content: String,
    created_at: String,
}

impl TryFrom<ConversationRow> for Conversation {
    type Error = DomainError;

    fn try_from(row: ConversationRow) -> DomainResult<Conversation> {
        let role = ConversationRole::from_str(&row.role).ok_or_else(|| {
            DomainError::SerializationError(format!("unknown conversation role: {}", row.role))
        })?;
        Ok(Conversation {
            id: parse_uuid(&row.id)?,
            channel: row.channel,
            user_id: row.user_id,
            role,
            content: row.content,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[async_trait]
impl ConversationRepository for SqliteConversationRepository {
    async fn append(&self, conversation: &Conversation) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO conversations (id, channel, user_id, role, content, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(conversation.id.to_string())
        .bind(&conversation.channel)
        .bind(&conversation.user_id)
        .bind(conversation.role.as_str())
        .bind(&conversation.content)
        .bind(conversation.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Conversation>> {
        let row: Option<ConversationRow> =
            sqlx::query_as("SELECT * FROM conversations WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn recent_for_channel(
        &self,
        channel: &str,
        limit: usize,
    ) -> DomainResult<Vec<Conversation>> {
        let rows: Vec<ConversationRow> = sqlx::query_as(
            "SELECT * FROM conversations WHERE channel = ?
             ORDER BY created_at DESC LIMIT ?",
        )
        .bind(channel)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;

    #[tokio::test]
    async fn test_append_and_read_back() {
        let pool = create_migrated_test_pool().await.unwrap();
        let repo = SqliteConversationRepository::new(pool);

        let message = Conversation::new("C042", "U123", ConversationRole::User, "hello bot");
        repo.append(&message).await.unwrap();

        let fetched = repo.get(message.id).await.unwrap().unwrap();
        assert_eq!(fetched.channel, "C042");
        assert_eq!(fetched.role, ConversationRole::User);
    }

    #[tokio::test]
    async fn test_recent_is_scoped_to_channel() {
        let pool = create_migrated_test_pool().await.unwrap();
        let repo = SqliteConversationRepository::new(pool);

        repo.append(&Conversation::new("C1", "U1", ConversationRole::User, "one"))
            .await
            .unwrap();
        repo.append(&Conversation::new("C2", "U1", ConversationRole::User, "two"))
            .await
            .unwrap();

        let recent = repo.recent_for_channel("C1", 10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].content, "one");
    }
}
