//! SonarQube / SonarCloud client.
//!
//! The token is sent as the basic-auth username with an empty password,
//! which is how both the hosted and self-managed editions authenticate.

use reqwest::Client;
use serde::Deserialize;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ProviderConfig, Severity, Vulnerability};

const PROVIDER: &str = "sonarqube";
const DEFAULT_BASE_URL: &str = "https://sonarcloud.io";

/// Quality gate verdict for a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityGate {
    pub project_key: String,
    /// "OK" or "ERROR" as reported by the server.
    pub status: String,
    /// Failed condition descriptions, metric plus actual value.
    pub failed_conditions: Vec<String>,
}

impl QualityGate {
    pub fn passed(&self) -> bool {
        self.status == "OK"
    }
}

/// Configuration for the SonarQube client.
#[derive(Debug, Clone)]
pub struct SonarQubeConfig {
    /// Token; falls back to `SONAR_TOKEN`.
    pub token: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for SonarQubeConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

impl SonarQubeConfig {
    pub fn from_provider_config(config: &ProviderConfig) -> Self {
        let defaults = Self::default();
        Self {
            token: config.api_key.clone(),
            base_url: config.base_url.clone().unwrap_or(defaults.base_url),
            timeout_secs: config.timeout_secs,
        }
    }

    fn get_token(&self) -> DomainResult<String> {
        self.token
            .clone()
            .or_else(|| std::env::var("SONAR_TOKEN").ok())
            .ok_or(DomainError::MissingApiKey {
                provider: PROVIDER,
                env_var: "SONAR_TOKEN",
            })
    }
}

/// SonarQube HTTP client.
#[derive(Clone)]
pub struct SonarQubeClient {
    config: SonarQubeConfig,
    client: Client,
}

impl SonarQubeClient {
    pub fn new(config: SonarQubeConfig) -> DomainResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::ValidationFailed(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> DomainResult<T> {
        let token = self.config.get_token()?;

        let response = self
            .client
            .get(url)
            .basic_auth(&token, Some(""))
            .send()
            .await
            .map_err(|e| DomainError::unreachable(PROVIDER, &e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::status(PROVIDER, status, body));
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::malformed(PROVIDER, e.to_string()))
    }

    /// Project quality gate status with failed conditions.
    pub async fn quality_gate(&self, project_key: &str) -> DomainResult<QualityGate> {
        let url = format!(
            "{}/api/qualitygates/project_status?projectKey={project_key}",
            self.config.base_url
        );
        let parsed: ProjectStatusResponse = self.get_json(&url).await?;

        Ok(QualityGate {
            project_key: project_key.to_string(),
            status: parsed.project_status.status,
            failed_conditions: parsed
                .project_status
                .conditions
                .into_iter()
                .filter(|c| c.status == "ERROR")
                .map(|c| format!("{} = {}", c.metric_key, c.actual_value.unwrap_or_default()))
                .collect(),
        })
    }

    /// Open vulnerabilities for one project, normalized.
    pub async fn list_issues(&self, project_key: &str) -> DomainResult<Vec<Vulnerability>> {
        let url = format!(
            "{}/api/issues/search?componentKeys={project_key}&types=VULNERABILITY&resolved=false",
            self.config.base_url
        );
        let parsed: IssuesResponse = self.get_json(&url).await?;

        Ok(parsed
            .issues
            .into_iter()
            .map(|issue| Vulnerability {
                source: PROVIDER.to_string(),
                identifier: issue.key,
                title: issue.message,
                severity: Severity::from_str(&issue.severity).unwrap_or(Severity::Low),
                component: Some(issue.component),
                url: None,
            })
            .collect())
    }
}

// -- wire types --

#[derive(Debug, Deserialize)]
struct ProjectStatusResponse {
    #[serde(rename = "projectStatus")]
    project_status: WireProjectStatus,
}

#[derive(Debug, Deserialize)]
struct WireProjectStatus {
    status: String,
    #[serde(default)]
    conditions: Vec<WireCondition>,
}

#[derive(Debug, Deserialize)]
struct WireCondition {
    status: String,
    #[serde(rename = "metricKey")]
    metric_key: String,
    #[serde(rename = "actualValue", default)]
    actual_value: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IssuesResponse {
    #[serde(default)]
    issues: Vec<WireIssue>,
}

#[derive(Debug, Deserialize)]
struct WireIssue {
    key: String,
    severity: String,
    message: String,
    component: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_token_is_config_error() {
        temp_env::with_var_unset("SONAR_TOKEN", || {
            let err = SonarQubeConfig::default().get_token().unwrap_err();
            assert!(matches!(
                err,
                DomainError::MissingApiKey { provider: "sonarqube", .. }
            ));
        });
    }

    #[tokio::test]
    async fn test_quality_gate_collects_failed_conditions() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock(
                "GET",
                "/api/qualitygates/project_status?projectKey=acme_api",
            )
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "projectStatus": {
                        "status": "ERROR",
                        "conditions": [
                            {"status": "OK", "metricKey": "coverage", "actualValue": "91.2"},
                            {"status": "ERROR", "metricKey": "new_bugs", "actualValue": "3"}
                        ]
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = SonarQubeClient::new(SonarQubeConfig {
            token: Some("test-token".to_string()),
            base_url: server.url(),
            ..Default::default()
        })
        .unwrap();

        let gate = client.quality_gate("acme_api").await.unwrap();
        assert!(!gate.passed());
        assert_eq!(gate.failed_conditions, vec!["new_bugs = 3".to_string()]);
    }

    #[tokio::test]
    async fn test_issues_map_sonar_severities() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock(
                "GET",
                "/api/issues/search?componentKeys=acme_api&types=VULNERABILITY&resolved=false",
            )
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "issues": [
                        {"key": "AX1", "severity": "BLOCKER", "message": "SQL injection", "component": "acme_api:src/db.rs"},
                        {"key": "AX2", "severity": "MINOR", "message": "Weak hash", "component": "acme_api:src/auth.rs"}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = SonarQubeClient::new(SonarQubeConfig {
            token: Some("test-token".to_string()),
            base_url: server.url(),
            ..Default::default()
        })
        .unwrap();

        let issues = client.list_issues("acme_api").await.unwrap();
        assert_eq!(issues[0].severity, Severity::Critical);
        assert_eq!(issues[1].severity, Severity::Low);
    }
}
