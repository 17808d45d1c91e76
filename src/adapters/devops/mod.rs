//! DevOps provider clients: security scanners, GitHub, and Vault.

pub mod github;
pub mod snyk;
pub mod sonarqube;
pub mod vault;

pub use github::{GitHubClient, GitHubConfig, RateLimiter, RepoFile};
pub use snyk::{SnykClient, SnykConfig};
pub use sonarqube::{QualityGate, SonarQubeClient, SonarQubeConfig};
pub use vault::VaultClient;
