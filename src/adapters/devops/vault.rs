//! HashiCorp Vault KV v2 client.
//!
//! KV v2 paths nest the payload under `data.data` and route reads and
//! writes through `{mount}/data/{path}` while listing goes through
//! `{mount}/metadata/{path}`. Listing uses the custom `LIST` method.

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::Deserialize;
use std::collections::HashMap;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::VaultConfig;
use crate::domain::ports::SecretStore;

const PROVIDER: &str = "vault";

/// Vault KV v2 client.
#[derive(Clone)]
pub struct VaultClient {
    config: VaultConfig,
    client: Client,
}

impl VaultClient {
    pub fn new(config: VaultConfig) -> DomainResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::ValidationFailed(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    fn get_token(&self) -> DomainResult<String> {
        self.config
            .token
            .clone()
            .or_else(|| std::env::var("VAULT_TOKEN").ok())
            .ok_or(DomainError::MissingApiKey {
                provider: PROVIDER,
                env_var: "VAULT_TOKEN",
            })
    }

    async fn request(
        &self,
        method: Method,
        url: String,
        body: Option<serde_json::Value>,
    ) -> DomainResult<reqwest::Response> {
        let token = self.get_token()?;

        let mut request = self.client.request(method, url).header("X-Vault-Token", token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DomainError::unreachable(PROVIDER, &e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::status(PROVIDER, status, body));
        }

        Ok(response)
    }
}

#[async_trait]
impl SecretStore for VaultClient {
    async fn read_secret(&self, path: &str) -> DomainResult<HashMap<String, String>> {
        let url = format!("{}/v1/{}/data/{path}", self.config.addr, self.config.mount);
        let response = self.request(Method::GET, url, None).await?;

        let parsed: ReadResponse = response
            .json()
            .await
            .map_err(|e| DomainError::malformed(PROVIDER, e.to_string()))?;

        Ok(parsed.data.data)
    }

    async fn write_secret(&self, path: &str, data: &HashMap<String, String>) -> DomainResult<()> {
        let url = format!("{}/v1/{}/data/{path}", self.config.addr, self.config.mount);
        let body = serde_json::json!({ "data": data });
        self.request(Method::POST, url, Some(body)).await?;
        Ok(())
    }

    async fn list_secrets(&self, path: &str) -> DomainResult<Vec<String>> {
        let url = format!("{}/v1/{}/metadata/{path}", self.config.addr, self.config.mount);
        let method = Method::from_bytes(b"LIST")
            .map_err(|e| DomainError::ValidationFailed(format!("invalid HTTP method: {e}")))?;
        let response = self.request(method, url, None).await?;

        let parsed: ListResponse = response
            .json()
            .await
            .map_err(|e| DomainError::malformed(PROVIDER, e.to_string()))?;

        Ok(parsed.data.keys)
    }

    async fn delete_secret(&self, path: &str) -> DomainResult<()> {
        let url = format!("{}/v1/{}/data/{path}", self.config.addr, self.config.mount);
        self.request(Method::DELETE, url, None).await?;
        Ok(())
    }

    async fn health(&self) -> DomainResult<bool> {
        // sys/health does not require a token; 200 means initialized,
        // unsealed, and active.
        let url = format!("{}/v1/sys/health", self.config.addr);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::unreachable(PROVIDER, &e))?;

        Ok(response.status().is_success())
    }
}

// -- wire types --

#[derive(Debug, Deserialize)]
struct ReadResponse {
    data: ReadData,
}

#[derive(Debug, Deserialize)]
struct ReadData {
    data: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    data: ListData,
}

#[derive(Debug, Deserialize)]
struct ListData {
    keys: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(server: &mockito::Server) -> VaultClient {
        VaultClient::new(VaultConfig {
            addr: server.url(),
            token: Some("test-token".to_string()),
            mount: "secret".to_string(),
            timeout_secs: 10,
        })
        .unwrap()
    }

    #[test]
    fn test_missing_token_is_config_error() {
        temp_env::with_var_unset("VAULT_TOKEN", || {
            let client = VaultClient::new(VaultConfig::default()).unwrap();
            let err = client.get_token().unwrap_err();
            assert!(matches!(
                err,
                DomainError::MissingApiKey { provider: "vault", .. }
            ));
        });
    }

    #[tokio::test]
    async fn test_read_unwraps_nested_data() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/secret/data/ci/tokens")
            .match_header("x-vault-token", "test-token")
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "data": {"data": {"api_key": "s3cr3t", "region": "eu-west-1"}}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let secret = client.read_secret("ci/tokens").await.unwrap();
        assert_eq!(secret.get("api_key").map(String::as_str), Some("s3cr3t"));
        assert_eq!(secret.len(), 2);
    }

    #[tokio::test]
    async fn test_list_uses_list_method() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("LIST", "/v1/secret/metadata/ci")
            .with_status(200)
            .with_body(r#"{"data": {"keys": ["tokens", "deploy/"]}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let keys = client.list_secrets("ci").await.unwrap();
        assert_eq!(keys, vec!["tokens".to_string(), "deploy/".to_string()]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_health_false_when_sealed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v1/sys/health")
            .with_status(503)
            .with_body(r#"{"sealed": true}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        assert!(!client.health().await.unwrap());
    }
}
