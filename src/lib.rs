//! Quorum - Slack assistant backend
//!
//! Quorum brokers requests to generative-AI providers (OpenAI, Perplexity,
//! Stability, ElevenLabs) and DevOps providers (Snyk, SonarQube, GitHub,
//! Vault), runs a consensus pipeline over the chat providers, and persists
//! conversation/task state in SQLite.
//!
//! # Architecture
//!
//! The crate follows Hexagonal Architecture:
//!
//! - **Domain Layer** (`domain`): models, errors, and port traits
//! - **Adapters** (`adapters`): provider HTTP clients and SQLite repositories
//! - **Services** (`services`): consensus pipeline, security report,
//!   scanners, history
//! - **Infrastructure** (`infrastructure`): config loading and logging
//! - **CLI Layer** (`cli`): command-line interface

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    AiResponse, Config, ConsensusResult, Conversation, Memory, SecurityReport, Task, TaskStatus,
};
pub use domain::ports::{
    ChatProvider, ConversationRepository, MemoryRepository, ResponseRepository, SecretStore,
    TaskRepository, UsageRepository,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ConsensusService, SearchHistory, SecretScanner, SecurityReportBuilder};
