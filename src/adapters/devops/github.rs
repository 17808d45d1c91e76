//! GitHub REST API client with rate limiting.
//!
//! Wraps the security endpoints (Dependabot and code-scanning alerts)
//! plus repository contents. A token-bucket rate limiter keeps the
//! client inside the 5 000 req/hour authenticated budget.

use base64::Engine as _;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ProviderConfig, Severity, Vulnerability};

const PROVIDER: &str = "github";
const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Token-bucket rate limiter.
///
/// Allows up to `capacity` requests per `window`; when the bucket is
/// empty, [`acquire`](RateLimiter::acquire) sleeps until the window
/// resets.
#[derive(Debug)]
pub struct RateLimiter {
    capacity: u32,
    tokens: u32,
    window: Duration,
    window_start: Instant,
}

impl RateLimiter {
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self {
            capacity,
            tokens: capacity,
            window,
            window_start: Instant::now(),
        }
    }

    /// Take one token, sleeping through the window reset if necessary.
    pub async fn acquire(&mut self) {
        let elapsed = self.window_start.elapsed();
        if elapsed >= self.window {
            self.tokens = self.capacity;
            self.window_start = Instant::now();
        }

        if self.tokens > 0 {
            self.tokens -= 1;
        } else {
            let remaining = self.window.saturating_sub(elapsed);
            tracing::warn!(
                sleep_ms = remaining.as_millis() as u64,
                "GitHub rate limit reached, sleeping"
            );
            tokio::time::sleep(remaining).await;
            self.tokens = self.capacity - 1;
            self.window_start = Instant::now();
        }
    }
}

/// Configuration for the GitHub client.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// Token; falls back to `GITHUB_TOKEN`.
    pub token: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

impl GitHubConfig {
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
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .ok_or(DomainError::MissingApiKey {
                provider: PROVIDER,
                env_var: "GITHUB_TOKEN",
            })
    }
}

/// A decoded file fetched through the contents endpoint.
#[derive(Debug, Clone)]
pub struct RepoFile {
    pub path: String,
    pub content: String,
}

/// GitHub REST API client.
#[derive(Clone)]
pub struct GitHubClient {
    config: GitHubConfig,
    client: Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl GitHubClient {
    pub fn new(config: GitHubConfig) -> DomainResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::ValidationFailed(format!("failed to create HTTP client: {e}")))?;
        // 5 000 authenticated requests per hour.
        let rate_limiter = RateLimiter::new(5_000, Duration::from_secs(3_600));
        Ok(Self {
            config,
            client,
            rate_limiter: Arc::new(Mutex::new(rate_limiter)),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> DomainResult<T> {
        let token = self.config.get_token()?;
        self.rate_limiter.lock().await.acquire().await;

        let response = self
            .client
            .get(format!("{}{path}", self.config.base_url))
            .header("Authorization", format!("Bearer {token}"))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", "quorum-bot")
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

    /// Open Dependabot alerts, normalized.
    pub async fn dependabot_alerts(
        &self,
        owner: &str,
        repo: &str,
    ) -> DomainResult<Vec<Vulnerability>> {
        let alerts: Vec<DependabotAlert> = self
            .get_json(&format!("/repos/{owner}/{repo}/dependabot/alerts?state=open&per_page=100"))
            .await?;

        Ok(alerts
            .into_iter()
            .map(|alert| Vulnerability {
                source: "github_dependabot".to_string(),
                identifier: alert
                    .security_advisory
                    .cve_id
                    .unwrap_or_else(|| format!("alert-{}", alert.number)),
                title: alert.security_advisory.summary,
                severity: Severity::from_str(&alert.security_advisory.severity)
                    .unwrap_or(Severity::Low),
                component: alert.dependency.package.map(|p| p.name),
                url: alert.html_url,
            })
            .collect())
    }

    /// Open code-scanning alerts, normalized.
    pub async fn code_scanning_alerts(
        &self,
        owner: &str,
        repo: &str,
    ) -> DomainResult<Vec<Vulnerability>> {
        let alerts: Vec<CodeScanningAlert> = self
            .get_json(&format!("/repos/{owner}/{repo}/code-scanning/alerts?state=open&per_page=100"))
            .await?;

        Ok(alerts
            .into_iter()
            .map(|alert| {
                let severity = alert
                    .rule
                    .security_severity_level
                    .as_deref()
                    .or(alert.rule.severity.as_deref())
                    .and_then(Severity::from_str)
                    .unwrap_or(Severity::Low);
                Vulnerability {
                    source: "github_code_scanning".to_string(),
                    identifier: alert.rule.id,
                    title: alert.rule.description,
                    severity,
                    component: alert.most_recent_instance.and_then(|i| i.location).map(|l| l.path),
                    url: alert.html_url,
                }
            })
            .collect())
    }

    /// Fetch and decode one file via the contents endpoint.
    pub async fn get_contents(&self, owner: &str, repo: &str, path: &str) -> DomainResult<RepoFile> {
        let contents: ContentsResponse = self
            .get_json(&format!("/repos/{owner}/{repo}/contents/{path}"))
            .await?;

        if contents.encoding.as_deref() != Some("base64") {
            return Err(DomainError::malformed(
                PROVIDER,
                format!("unexpected contents encoding: {:?}", contents.encoding),
            ));
        }

        // GitHub wraps the base64 payload across lines.
        let compact: String = contents
            .content
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| DomainError::malformed(PROVIDER, format!("invalid base64 content: {e}")))?;
        let content = String::from_utf8(bytes)
            .map_err(|e| DomainError::malformed(PROVIDER, format!("content is not UTF-8: {e}")))?;

        Ok(RepoFile {
            path: contents.path,
            content,
        })
    }
}

// -- wire types --

#[derive(Debug, Deserialize)]
struct DependabotAlert {
    number: u64,
    security_advisory: WireAdvisory,
    dependency: WireDependency,
    #[serde(default)]
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireAdvisory {
    summary: String,
    severity: String,
    #[serde(default)]
    cve_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireDependency {
    #[serde(default)]
    package: Option<WirePackage>,
}

#[derive(Debug, Deserialize)]
struct WirePackage {
    name: String,
}

#[derive(Debug, Deserialize)]
struct CodeScanningAlert {
    rule: WireRule,
    #[serde(default)]
    html_url: Option<String>,
    #[serde(default)]
    most_recent_instance: Option<WireInstance>,
}

#[derive(Debug, Deserialize)]
struct WireRule {
    id: String,
    description: String,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    security_severity_level: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireInstance {
    #[serde(default)]
    location: Option<WireLocation>,
}

#[derive(Debug, Deserialize)]
struct WireLocation {
    path: String,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    path: String,
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}
