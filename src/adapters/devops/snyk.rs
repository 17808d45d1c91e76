//! Snyk vulnerability client.
//!
//! Wraps the v1 aggregated-issues endpoint and normalizes each issue
//! into a [`Vulnerability`] with the shared severity scale.

use reqwest::Client;
use serde::Deserialize;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ProviderConfig, Severity, Vulnerability};

const PROVIDER: &str = "snyk";
const DEFAULT_BASE_URL: &str = "https://api.snyk.io";

/// Configuration for the Snyk client.
#[derive(Debug, Clone)]
pub struct SnykConfig {
    /// API token; falls back to `SNYK_TOKEN`.
    pub token: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for SnykConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

impl SnykConfig {
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
            .or_else(|| std::env::var("SNYK_TOKEN").ok())
            .ok_or(DomainError::MissingApiKey {
                provider: PROVIDER,
                env_var: "SNYK_TOKEN",
            })
    }
}

/// Snyk HTTP client.
#[derive(Clone)]
pub struct SnykClient {
    config: SnykConfig,
    client: Client,
}

impl SnykClient {
    pub fn new(config: SnykConfig) -> DomainResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::ValidationFailed(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// Aggregated open issues for one project, normalized.
    pub async fn list_project_issues(
        &self,
        org: &str,
        project: &str,
    ) -> DomainResult<Vec<Vulnerability>> {
        let token = self.config.get_token()?;
        let url = format!(
            "{}/v1/org/{org}/project/{project}/aggregated-issues",
            self.config.base_url
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("token {token}"))
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| DomainError::unreachable(PROVIDER, &e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::status(PROVIDER, status, body));
        }

        let parsed: AggregatedIssuesResponse = response
            .json()
            .await
            .map_err(|e| DomainError::malformed(PROVIDER, e.to_string()))?;

        Ok(parsed
            .issues
            .into_iter()
            .map(|issue| Vulnerability {
                source: PROVIDER.to_string(),
                identifier: issue.id,
                title: issue.issue_data.title,
                severity: Severity::from_str(&issue.issue_data.severity)
                    .unwrap_or(Severity::Low),
                component: issue.pkg_name,
                url: issue.issue_data.url,
            })
            .collect())
    }
}

// -- wire types --

#[derive(Debug, Deserialize)]
struct AggregatedIssuesResponse {
    #[serde(default)]
    issues: Vec<WireIssue>,
}

#[derive(Debug, Deserialize)]
struct WireIssue {
    id: String,
    #[serde(rename = "pkgName", default)]
    pkg_name: Option<String>,
    #[serde(rename = "issueData")]
    issue_data: WireIssueData,
}

#[derive(Debug, Deserialize)]
struct WireIssueData {
    title: String,
    severity: String,
    #[serde(default)]
    url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_token_is_config_error() {
        temp_env::with_var_unset("SNYK_TOKEN", || {
            let err = SnykConfig::default().get_token().unwrap_err();
            assert!(matches!(
                err,
                DomainError::MissingApiKey { provider: "snyk", .. }
            ));
        });
    }

    #[tokio::test]
    async fn test_issues_are_normalized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/org/acme/project/api/aggregated-issues")
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "issues": [
                        {
                            "id": "SNYK-JS-LODASH-567746",
                            "pkgName": "lodash",
                            "issueData": {
                                "title": "Prototype Pollution",
                                "severity": "high",
                                "url": "https://snyk.io/vuln/SNYK-JS-LODASH-567746"
                            }
                        },
                        {
                            "id": "SNYK-JS-MINIMIST-559764",
                            "issueData": {"title": "Prototype Pollution", "severity": "medium"}
                        }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = SnykClient::new(SnykConfig {
            token: Some("test-token".to_string()),
            base_url: server.url(),
            ..Default::default()
        })
        .unwrap();

        let issues = client.list_project_issues("acme", "api").await.unwrap();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].severity, Severity::High);
        assert_eq!(issues[0].component.as_deref(), Some("lodash"));
        assert_eq!(issues[1].severity, Severity::Medium);
        assert!(issues[1].component.is_none());
    }
}
