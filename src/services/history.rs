//! Bounded in-memory activity history.
//!
//! A rolling ring of the most recent operations, used only by the
//! introspection surface. Capacity is fixed at construction (200 by
//! default); when full, the oldest entry is evicted.

use std::collections::VecDeque;
use tokio::sync::RwLock;

use crate::domain::models::HistoryEntry;

/// Rolling FIFO history behind an async lock.
pub struct SearchHistory {
    entries: RwLock<VecDeque<HistoryEntry>>,
    capacity: usize,
}

impl SearchHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest when at capacity.
    pub async fn record(&self, entry: HistoryEntry) {
        let mut entries = self.entries.write().await;
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// The most recent `n` entries, newest first.
    pub async fn recent(&self, n: usize) -> Vec<HistoryEntry> {
        let entries = self.entries.read().await;
        entries.iter().rev().take(n).cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::new(200)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_never_exceeds_capacity() {
        let history = SearchHistory::new(200);
        for i in 0..450 {
            history
                .record(HistoryEntry::new("search", format!("query {i}"), true))
                .await;
        }
        assert_eq!(history.len().await, 200);
    }

    #[tokio::test]
    async fn test_eviction_is_oldest_first() {
        let history = SearchHistory::new(3);
        for i in 0..5 {
            history
                .record(HistoryEntry::new("search", format!("query {i}"), true))
                .await;
        }

        let recent = history.recent(10).await;
        let inputs: Vec<&str> = recent.iter().map(|e| e.input.as_str()).collect();
        // Newest first; queries 0 and 1 were evicted.
        assert_eq!(inputs, vec!["query 4", "query 3", "query 2"]);
    }

    #[tokio::test]
    async fn test_recent_limits_and_orders() {
        let history = SearchHistory::default();
        history.record(HistoryEntry::new("ask", "first", true)).await;
        history.record(HistoryEntry::new("ask", "second", false)).await;

        let recent = history.recent(1).await;
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].input, "second");
        assert!(!recent[0].ok);
    }

    #[tokio::test]
    async fn test_clear() {
        let history = SearchHistory::new(10);
        history.record(HistoryEntry::new("ask", "q", true)).await;
        history.clear().await;
        assert!(history.is_empty().await);
    }
}
