//! Grounded search results and the in-memory activity history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cited source attached to a grounded answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    pub url: String,
}

/// An answer from the web-search provider with its citations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundedAnswer {
    pub query: String,
    pub answer: String,
    pub citations: Vec<Citation>,
    pub model: String,
    pub latency_ms: u64,
}

/// Verdict for one claim from a verification batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedClaim {
    pub claim: String,
    /// The provider's verdict text; `None` when the call errored.
    pub verdict: Option<String>,
    pub citations: Vec<Citation>,
    /// Captured error for this item, when the call failed.
    pub error: Option<String>,
}

/// One entry in the rolling introspection history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Operation label, e.g. "search" or "ask".
    pub operation: String,
    /// The query or prompt that was issued.
    pub input: String,
    pub ok: bool,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(operation: impl Into<String>, input: impl Into<String>, ok: bool) -> Self {
        Self {
            operation: operation.into(),
            input: input.into(),
            ok,
            recorded_at: Utc::now(),
        }
    }
}
