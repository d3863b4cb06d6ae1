//! Credential loading.
//!
//! Each field of the [`CredentialBundle`] is taken from the structured secret
//! when present and non-blank, otherwise from the environment. A secret store
//! that cannot be reached or parsed is logged and skipped.

use crate::error::{ComposioError, ComposioResult};
use crate::secrets::{FileSecretStore, SecretStore, VaultSecretStore, VaultSettings};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

pub const API_KEY_ENV: &str = "COMPOSIO_API_KEY";
pub const NOTION_ACCOUNT_ENV: &str = "NOTION_CONNECTED_ACCOUNT_ID";
pub const ZOOM_ACCOUNT_ENV: &str = "ZOOM_CONNECTED_ACCOUNT_ID";
pub const SECRET_NAME_ENV: &str = "COMPOSIO_SECRET_NAME";
pub const SECRET_FILE_ENV: &str = "COMPOSIO_SECRET_FILE";
pub const VAULT_MOUNT_ENV: &str = "COMPOSIO_VAULT_MOUNT";

/// Name of the structured secret when `COMPOSIO_SECRET_NAME` is unset.
pub const DEFAULT_SECRET_NAME: &str = "composio/api-key";

const API_KEY_FIELD: &str = "api_key";

/// Environment lookup, injectable so tests never touch process state.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// An application reached through a connected account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Notion,
    Zoom,
}

impl Domain {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Notion => "Notion",
            Self::Zoom => "Zoom",
        }
    }

    /// Environment variable holding the connected-account id.
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::Notion => NOTION_ACCOUNT_ENV,
            Self::Zoom => ZOOM_ACCOUNT_ENV,
        }
    }

    /// Key of the connected-account id inside the structured secret.
    pub fn secret_key(&self) -> &'static str {
        match self {
            Self::Notion => "notion_connected_account_id",
            Self::Zoom => "zoom_connected_account_id",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// API key plus the per-domain connected-account ids.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialBundle {
    api_key: String,
    notion_connected_account_id: Option<String>,
    zoom_connected_account_id: Option<String>,
}

impl CredentialBundle {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            notion_connected_account_id: None,
            zoom_connected_account_id: None,
        }
    }

    pub fn with_connected_account(mut self, domain: Domain, id: impl Into<String>) -> Self {
        let id = Some(id.into());
        match domain {
            Domain::Notion => self.notion_connected_account_id = id,
            Domain::Zoom => self.zoom_connected_account_id = id,
        }
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn has_connected_account(&self, domain: Domain) -> bool {
        self.account_slot(domain).is_some()
    }

    /// Connected-account id for `domain`, or a configuration error naming
    /// the variable to set.
    pub fn connected_account(&self, domain: Domain) -> ComposioResult<&str> {
        self.account_slot(domain).ok_or_else(|| {
            ComposioError::config(format!(
                "no {} connected account configured; set {}",
                domain,
                domain.env_var()
            ))
        })
    }

    fn account_slot(&self, domain: Domain) -> Option<&str> {
        match domain {
            Domain::Notion => self.notion_connected_account_id.as_deref(),
            Domain::Zoom => self.zoom_connected_account_id.as_deref(),
        }
    }
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("api_key", &"<redacted>")
            .field(
                "notion_connected_account_id",
                &self.notion_connected_account_id,
            )
            .field("zoom_connected_account_id", &self.zoom_connected_account_id)
            .finish()
    }
}

/// Resolves a [`CredentialBundle`] from a secret store and the environment.
#[derive(Clone)]
pub struct CredentialLoader {
    store: Option<Arc<dyn SecretStore>>,
    secret_name: String,
    env: EnvLookup,
}

impl Default for CredentialLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialLoader {
    /// Environment-only loader over the process environment.
    pub fn new() -> Self {
        Self {
            store: None,
            secret_name: DEFAULT_SECRET_NAME.to_string(),
            env: Arc::new(|key: &str| std::env::var(key).ok()),
        }
    }

    /// Loader configured from the process environment, including the secret
    /// store selection.
    pub fn from_env() -> Self {
        Self::from_lookup(Arc::new(|key: &str| std::env::var(key).ok()))
    }

    /// Loader configured from an arbitrary lookup.
    ///
    /// Vault is used when `VAULT_ADDR` and `VAULT_TOKEN` are set, else a file
    /// when `COMPOSIO_SECRET_FILE` is set, else no store.
    pub fn from_lookup(env: EnvLookup) -> Self {
        let secret_name = non_blank(env(SECRET_NAME_ENV))
            .unwrap_or_else(|| DEFAULT_SECRET_NAME.to_string());
        let store = store_from_lookup(&env);

        Self {
            store,
            secret_name,
            env,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn SecretStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn without_store(mut self) -> Self {
        self.store = None;
        self
    }

    pub fn with_secret_name(mut self, name: impl Into<String>) -> Self {
        self.secret_name = name.into();
        self
    }

    pub fn with_env(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }

    pub fn secret_name(&self) -> &str {
        &self.secret_name
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    /// Produce the bundle, or fail when no API key is available from either
    /// source. No broker call is made.
    pub async fn load(&self) -> ComposioResult<CredentialBundle> {
        let secret = self.read_secret().await;

        let field = |secret_key: &str, env_key: &str| {
            secret
                .as_ref()
                .and_then(|s| s.get(secret_key))
                .and_then(Value::as_str)
                .and_then(|s| non_blank(Some(s.to_string())))
                .or_else(|| non_blank((self.env)(env_key)))
        };

        let api_key = field(API_KEY_FIELD, API_KEY_ENV).ok_or_else(|| {
            ComposioError::config(format!(
                "no Composio API key found in secret {} or the {} environment variable",
                self.secret_name, API_KEY_ENV
            ))
        })?;

        let mut bundle = CredentialBundle::new(api_key);
        for domain in [Domain::Notion, Domain::Zoom] {
            if let Some(id) = field(domain.secret_key(), domain.env_var()) {
                bundle = bundle.with_connected_account(domain, id);
            }
        }

        debug!(
            notion = bundle.has_connected_account(Domain::Notion),
            zoom = bundle.has_connected_account(Domain::Zoom),
            "Credentials loaded"
        );
        Ok(bundle)
    }

    async fn read_secret(&self) -> Option<Value> {
        let Some(store) = self.store.as_ref() else {
            debug!("No secret store configured, using environment");
            return None;
        };

        match store.fetch(&self.secret_name).await {
            Ok(secret) => Some(secret),
            Err(e) => {
                warn!(
                    store = %store.describe(),
                    secret = %self.secret_name,
                    error = %e,
                    "Secret store unavailable, falling back to environment"
                );
                None
            }
        }
    }
}

fn store_from_lookup(env: &EnvLookup) -> Option<Arc<dyn SecretStore>> {
    if let (Some(addr), Some(token)) = (non_blank(env("VAULT_ADDR")), non_blank(env("VAULT_TOKEN")))
    {
        let settings = Url::parse(&addr).map(|addr| VaultSettings {
            addr,
            token,
            namespace: non_blank(env("VAULT_NAMESPACE")),
            mount: non_blank(env(VAULT_MOUNT_ENV)).unwrap_or_else(|| "secret".to_string()),
        });
        match settings {
            Ok(settings) => match VaultSecretStore::new(settings) {
                Ok(store) => return Some(Arc::new(store)),
                Err(e) => warn!(error = %e, "Ignoring Vault secret store"),
            },
            Err(e) => warn!(error = %e, "Ignoring Vault secret store with invalid VAULT_ADDR"),
        }
    }

    non_blank(env(SECRET_FILE_ENV))
        .map(|path| Arc::new(FileSecretStore::new(path)) as Arc<dyn SecretStore>)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
