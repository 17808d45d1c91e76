use serde::{Deserialize, Serialize};

/// Main configuration structure for quorum
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Per-provider endpoint and credential configuration
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Vault server configuration
    #[serde(default)]
    pub vault: VaultConfig,

    /// Rolling introspection history capacity
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

const fn default_history_capacity() -> usize {
    200
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            providers: ProvidersConfig::default(),
            vault: VaultConfig::default(),
            history_capacity: default_history_capacity(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".quorum/quorum.db".to_string()
}

const fn default_max_connections() -> u32 {
    10
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Settings shared by every HTTP provider client.
///
/// `api_key` is optional here because each client falls back to its
/// provider-specific environment variable at call time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProviderConfig {
    /// API key; falls back to the provider's env var when absent
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL override, mostly for tests and self-hosted instances
    #[serde(default)]
    pub base_url: Option<String>,

    /// Default model or voice identifier
    #[serde(default)]
    pub model: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_provider_timeout_secs() -> u64 {
    60
}

/// Per-provider configuration table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: ProviderConfig,

    #[serde(default)]
    pub perplexity: ProviderConfig,

    #[serde(default)]
    pub stability: ProviderConfig,

    #[serde(default)]
    pub elevenlabs: ProviderConfig,

    #[serde(default)]
    pub snyk: ProviderConfig,

    #[serde(default)]
    pub sonarqube: ProviderConfig,

    #[serde(default)]
    pub github: ProviderConfig,
}

/// Vault server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VaultConfig {
    /// Vault server address
    #[serde(default = "default_vault_addr")]
    pub addr: String,

    /// Vault token; falls back to VAULT_TOKEN
    #[serde(default)]
    pub token: Option<String>,

    /// KV v2 mount point
    #[serde(default = "default_vault_mount")]
    pub mount: String,

    /// Request timeout in seconds
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_vault_addr() -> String {
    "http://127.0.0.1:8200".to_string()
}

fn default_vault_mount() -> String {
    "secret".to_string()
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            addr: default_vault_addr(),
            token: None,
            mount: default_vault_mount(),
            timeout_secs: default_provider_timeout_secs(),
        }
    }
}
