//! Security report domain model.
//!
//! The aggregated report merges findings from Snyk, SonarQube, and the
//! GitHub security endpoints. A provider that fails contributes an entry
//! to `errors` instead of sinking the whole report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized severity across providers.
///
/// Each provider reports severity in its own vocabulary; adapters map
/// onto this shared scale before findings reach the report builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" | "info" | "minor" => Some(Self::Low),
            "medium" | "moderate" | "major" => Some(Self::Medium),
            "high" | "error" => Some(Self::High),
            "critical" | "blocker" => Some(Self::Critical),
            _ => None,
        }
    }
}

/// One normalized finding from any security provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vulnerability {
    /// Which provider reported the finding.
    pub source: String,
    /// Provider-native identifier (CVE, rule key, alert number).
    pub identifier: String,
    pub title: String,
    pub severity: Severity,
    /// Affected package/component/file, when the provider reports one.
    pub component: Option<String>,
    pub url: Option<String>,
}

/// Aggregated multi-provider security report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityReport {
    /// Repository the report was built for, as "owner/repo".
    pub subject: String,
    pub vulnerabilities: Vec<Vulnerability>,
    /// Provider failures captured during the fan-out, as "provider: message".
    pub errors: Vec<String>,
    /// Fixed weighted sum over severity counts.
    pub risk_score: f64,
    /// Letter grade derived from the risk score (A through F).
    pub grade: char,
    pub generated_at: DateTime<Utc>,
}

impl SecurityReport {
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.vulnerabilities
            .iter()
            .filter(|v| v.severity == severity)
            .count()
    }
}
