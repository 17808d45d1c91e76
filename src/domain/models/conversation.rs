//! Conversation domain model.
//!
//! One row per message exchanged in a Slack channel; the backend only
//! appends and reads, it never edits history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationRole {
    User,
    Assistant,
    System,
}

impl ConversationRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(Self::User),
            "assistant" => Some(Self::Assistant),
            "system" => Some(Self::System),
            _ => None,
        }
    }
}

/// A single stored conversation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    /// Slack channel identifier the message belongs to.
    pub channel: String,
    /// Slack user id of the author ("bot" for assistant messages).
    pub user_id: String,
    pub role: ConversationRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(
        channel: impl Into<String>,
        user_id: impl Into<String>,
        role: ConversationRole,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.into(),
            user_id: user_id.into(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [
            ConversationRole::User,
            ConversationRole::Assistant,
            ConversationRole::System,
        ] {
            assert_eq!(ConversationRole::from_str(role.as_str()), Some(role));
        }
        assert_eq!(ConversationRole::from_str("bot"), None);
    }
}
