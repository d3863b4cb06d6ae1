//! Main client for the Composio SDK.

use crate::api::{ManagementClient, NotionClient, ZoomClient};
use crate::config::{default_base_url, ClientConfig};
use crate::credentials::{CredentialBundle, CredentialLoader, Domain};
use crate::error::{ComposioError, ComposioResult};
use crate::transport::{ActionExecutor, HttpTransport};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Entry point: owns the credentials and the shared transport, and hands out
/// domain and management clients.
#[derive(Clone)]
pub struct ComposioClient {
    credentials: CredentialBundle,
    executor: Arc<dyn ActionExecutor>,
}

impl ComposioClient {
    /// Create a new client builder.
    pub fn builder() -> ComposioClientBuilder {
        ComposioClientBuilder::new()
    }

    /// Load credentials from the configured secret store and environment and
    /// build a client for the production broker.
    pub async fn from_env() -> ComposioResult<Self> {
        let credentials = CredentialLoader::from_env().load().await?;
        Self::builder().credentials(credentials).build()
    }

    /// Build a client over an arbitrary executor.
    pub fn with_executor(credentials: CredentialBundle, executor: Arc<dyn ActionExecutor>) -> Self {
        Self {
            credentials,
            executor,
        }
    }

    pub fn credentials(&self) -> &CredentialBundle {
        &self.credentials
    }

    pub fn executor(&self) -> Arc<dyn ActionExecutor> {
        self.executor.clone()
    }

    /// Notion client for the configured Notion account.
    pub fn notion(&self) -> ComposioResult<NotionClient> {
        let account = self.credentials.connected_account(Domain::Notion)?;
        Ok(NotionClient::new(self.executor.clone(), account))
    }

    /// Zoom client for the configured Zoom account.
    pub fn zoom(&self) -> ComposioResult<ZoomClient> {
        let account = self.credentials.connected_account(Domain::Zoom)?;
        Ok(ZoomClient::new(self.executor.clone(), account))
    }

    pub fn management(&self) -> ManagementClient {
        ManagementClient::new(self.executor.clone())
    }
}

/// Builder for creating a ComposioClient.
#[derive(Default)]
pub struct ComposioClientBuilder {
    credentials: Option<CredentialBundle>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl ComposioClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credentials(mut self, credentials: CredentialBundle) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Broker root URL; defaults to the production broker.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn build(self) -> ComposioResult<ComposioClient> {
        let credentials = self
            .credentials
            .ok_or_else(|| ComposioError::config("credentials are required"))?;

        let base_url = match self.base_url {
            Some(url) => Url::parse(&url)?,
            None => default_base_url()?,
        };

        let mut config = ClientConfig::new(base_url, credentials.api_key());
        config.timeout = self.timeout;
        if let Some(user_agent) = self.user_agent {
            config.user_agent = user_agent;
        }

        let transport = HttpTransport::new(Arc::new(config))?;
        Ok(ComposioClient::with_executor(credentials, Arc::new(transport)))
    }
}
