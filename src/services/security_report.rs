//! Aggregated security report builder.
//!
//! Fans out concurrently to Snyk, SonarQube, and the two GitHub security
//! endpoints. Each section either contributes findings or contributes an
//! entry to `errors`; one provider failing never fails the report.

use chrono::Utc;
use tracing::info;

use crate::adapters::devops::{GitHubClient, SnykClient, SonarQubeClient};
use crate::domain::errors::DomainResult;
use crate::domain::models::{SecurityReport, Severity, Vulnerability};

/// Fixed risk weights per severity.
const CRITICAL_WEIGHT: f64 = 10.0;
const HIGH_WEIGHT: f64 = 5.0;
const MEDIUM_WEIGHT: f64 = 2.0;
const LOW_WEIGHT: f64 = 0.5;

/// Where the Snyk and SonarQube sections should look.
#[derive(Debug, Clone, Default)]
pub struct ScanTargets {
    /// Snyk org slug; the Snyk section is skipped when absent.
    pub snyk_org: Option<String>,
    /// Snyk project id.
    pub snyk_project: Option<String>,
    /// SonarQube project key; the section is skipped when absent.
    pub sonar_project_key: Option<String>,
}

/// Builds aggregated reports from whichever providers are configured.
pub struct SecurityReportBuilder {
    github: Option<GitHubClient>,
    snyk: Option<SnykClient>,
    sonarqube: Option<SonarQubeClient>,
}

impl SecurityReportBuilder {
    pub fn new(
        github: Option<GitHubClient>,
        snyk: Option<SnykClient>,
        sonarqube: Option<SonarQubeClient>,
    ) -> Self {
        Self {
            github,
            snyk,
            sonarqube,
        }
    }

    /// Build the aggregated report for one repository.
    pub async fn build(
        &self,
        owner: &str,
        repo: &str,
        targets: &ScanTargets,
    ) -> DomainResult<SecurityReport> {
        let dependabot = async {
            match &self.github {
                Some(client) => Some(client.dependabot_alerts(owner, repo).await),
                None => None,
            }
        };
        let code_scanning = async {
            match &self.github {
                Some(client) => Some(client.code_scanning_alerts(owner, repo).await),
                None => None,
            }
        };
        let snyk = async {
            match (&self.snyk, &targets.snyk_org, &targets.snyk_project) {
                (Some(client), Some(org), Some(project)) => {
                    Some(client.list_project_issues(org, project).await)
                }
                _ => None,
            }
        };
        let sonarqube = async {
            match (&self.sonarqube, &targets.sonar_project_key) {
                (Some(client), Some(key)) => Some(client.list_issues(key).await),
                _ => None,
            }
        };
        // A failed gate contributes findings even when the issue list is empty.
        let quality_gate = async {
            match (&self.sonarqube, &targets.sonar_project_key) {
                (Some(client), Some(key)) => Some(client.quality_gate(key).await),
                _ => None,
            }
        };

        let (dependabot, code_scanning, snyk, sonarqube, quality_gate) =
            tokio::join!(dependabot, code_scanning, snyk, sonarqube, quality_gate);

        let mut vulnerabilities = Vec::new();
        let mut errors = Vec::new();

        let sections = [
            ("github_dependabot", dependabot),
            ("github_code_scanning", code_scanning),
            ("snyk", snyk),
            ("sonarqube", sonarqube),
        ];
        for (provider, section) in sections {
            match section {
                Some(Ok(mut findings)) => vulnerabilities.append(&mut findings),
                Some(Err(e)) => errors.push(format!("{provider}: {e}")),
                None => {}
            }
        }

        match quality_gate {
            Some(Ok(gate)) if !gate.passed() => {
                for condition in gate.failed_conditions {
                    vulnerabilities.push(Vulnerability {
                        source: "sonarqube_quality_gate".to_string(),
                        identifier: gate.project_key.clone(),
                        title: format!("Quality gate condition failed: {condition}"),
                        severity: Severity::Medium,
                        component: None,
                        url: None,
                    });
                }
            }
            Some(Err(e)) => errors.push(format!("sonarqube_quality_gate: {e}")),
            _ => {}
        }

        let risk_score = risk_score(&vulnerabilities);
        let report = SecurityReport {
            subject: format!("{owner}/{repo}"),
            grade: grade(risk_score),
            risk_score,
            vulnerabilities,
            errors,
            generated_at: Utc::now(),
        };

        info!(
            subject = %report.subject,
            findings = report.vulnerabilities.len(),
            provider_errors = report.errors.len(),
            risk_score = report.risk_score,
            "security report built"
        );

        Ok(report)
    }
}

/// Fixed linear weighted sum over severity counts.
fn risk_score(vulnerabilities: &[Vulnerability]) -> f64 {
    vulnerabilities
        .iter()
        .map(|v| match v.severity {
            Severity::Critical => CRITICAL_WEIGHT,
            Severity::High => HIGH_WEIGHT,
            Severity::Medium => MEDIUM_WEIGHT,
            Severity::Low => LOW_WEIGHT,
        })
        .sum()
}

/// Letter grade bands over the risk score.
fn grade(score: f64) -> char {
    if score == 0.0 {
        'A'
    } else if score < 5.0 {
        'B'
    } else if score < 15.0 {
        'C'
    } else if score < 30.0 {
        'D'
    } else {
        'F'
    }
}
