//! Structured secret stores consulted before the environment.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// Errors raised while reading a structured secret.
#[derive(Debug, thiserror::Error)]
pub enum SecretStoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("secret {name} is not a JSON object: {message}")]
    Malformed { name: String, message: String },

    #[error("secret {0} not found")]
    NotFound(String),

    #[error("secret store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("secret store returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid secret store settings: {0}")]
    Settings(String),
}

/// A source of the structured credential secret.
///
/// `fetch` returns the secret as a JSON object; which keys it carries is the
/// caller's concern.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Short description used in log lines.
    fn describe(&self) -> String;

    async fn fetch(&self, name: &str) -> Result<Value, SecretStoreError>;
}

/// Reads the secret from a JSON file on disk.
///
/// The file holds either the secret object itself or an object keyed by
/// secret name.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn fetch(&self, name: &str) -> Result<Value, SecretStoreError> {
        let content =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|source| SecretStoreError::Io {
                    path: self.path.clone(),
                    source,
                })?;

        let parsed: Value =
            serde_json::from_str(&content).map_err(|e| SecretStoreError::Malformed {
                name: name.to_string(),
                message: e.to_string(),
            })?;

        let secret = match parsed.get(name) {
            Some(nested) if nested.is_object() => nested.clone(),
            _ => parsed,
        };

        if !secret.is_object() {
            return Err(SecretStoreError::Malformed {
                name: name.to_string(),
                message: "expected an object".to_string(),
            });
        }
        Ok(secret)
    }
}

/// Settings for a HashiCorp Vault KV v2 mount.
#[derive(Clone)]
pub struct VaultSettings {
    pub addr: Url,
    pub token: String,
    pub namespace: Option<String>,
    pub mount: String,
}

impl std::fmt::Debug for VaultSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSettings")
            .field("addr", &self.addr.as_str())
            .field("token", &"<redacted>")
            .field("namespace", &self.namespace)
            .field("mount", &self.mount)
            .finish()
    }
}

/// Reads the secret from Vault's KV v2 engine.
#[derive(Debug, Clone)]
pub struct VaultSecretStore {
    settings: VaultSettings,
    client: Client,
}

impl VaultSecretStore {
    pub fn new(settings: VaultSettings) -> Result<Self, SecretStoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut token = HeaderValue::from_str(&settings.token)
            .map_err(|_| SecretStoreError::Settings("token is not a valid header".to_string()))?;
        token.set_sensitive(true);
        headers.insert("X-Vault-Token", token);

        if let Some(ref namespace) = settings.namespace {
            let value = HeaderValue::from_str(namespace).map_err(|_| {
                SecretStoreError::Settings("namespace is not a valid header".to_string())
            })?;
            headers.insert("X-Vault-Namespace", value);
        }

        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self { settings, client })
    }

    fn secret_url(&self, name: &str) -> Result<Url, SecretStoreError> {
        let mount = self.settings.mount.trim_matches('/');
        let name = name.trim_matches('/');
        self.settings
            .addr
            .join(&format!("v1/{}/data/{}", mount, name))
            .map_err(|e| SecretStoreError::Settings(e.to_string()))
    }
}

#[async_trait]
impl SecretStore for VaultSecretStore {
    fn describe(&self) -> String {
        format!("vault {} (mount {})", self.settings.addr, self.settings.mount)
    }

    async fn fetch(&self, name: &str) -> Result<Value, SecretStoreError> {
        let url = self.secret_url(name)?;
        debug!(url = %url, "Reading secret from Vault");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.as_u16() == 404 {
            return Err(SecretStoreError::NotFound(name.to_string()));
        }
        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|body| vault_errors(&body))
                .unwrap_or_else(|| text.trim().to_string());
            return Err(SecretStoreError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = serde_json::from_str(&text).map_err(|e| SecretStoreError::Malformed {
            name: name.to_string(),
            message: e.to_string(),
        })?;

        match body.pointer("/data/data") {
            Some(secret) if secret.is_object() => Ok(secret.clone()),
            _ => Err(SecretStoreError::Malformed {
                name: name.to_string(),
                message: "response has no data.data object".to_string(),
            }),
        }
    }
}

fn vault_errors(body: &Value) -> Option<String> {
    let errors = body.get("errors")?.as_array()?;
    let joined = errors
        .iter()
        .filter_map(Value::as_str)
        .collect::<Vec<_>>()
        .join("; ");
    Some(joined).filter(|s| !s.is_empty())
}
