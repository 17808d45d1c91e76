//! Memory domain model.
//!
//! A flat key/value store the bot uses to remember facts across
//! conversations. Keys are globally unique; writing an existing key
//! replaces the value and bumps `updated_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single remembered fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub id: Uuid,
    /// Globally unique lookup key.
    pub key: String,
    pub value: String,
    /// Coarse grouping label, defaults to "general".
    pub category: String,
    pub updated_at: DateTime<Utc>,
}

impl Memory {
    pub fn new(key: impl Into<String>, value: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            key: key.into(),
            value: value.into(),
            category: category.into(),
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_memory() {
        let memory = Memory::new("team.standup", "daily at 09:30", "general");
        assert_eq!(memory.key, "team.standup");
        assert_eq!(memory.category, "general");
    }
}
