//! Configuration types for the Composio SDK.

use std::fmt;
use std::time::Duration;
use url::Url;

/// Production broker endpoint.
pub const DEFAULT_BASE_URL: &str = "https://backend.composio.dev/";

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("composio-sdk/", env!("CARGO_PKG_VERSION"));

/// Configuration for the HTTP transport.
#[derive(Clone)]
pub struct ClientConfig {
    /// Broker root; versioned paths are joined onto it.
    pub base_url: Url,
    /// Broker API key, sent as `X-API-Key`.
    pub api_key: String,
    /// Per-request timeout. `None` keeps the transport defaults.
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

/// Parse the production broker endpoint.
pub fn default_base_url() -> Result<Url, url::ParseError> {
    Url::parse(DEFAULT_BASE_URL)
}

/// Make sure `url` ends in `/` so joined paths keep its last segment.
fn as_directory(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

impl ClientConfig {
    /// A base URL mounted under a path prefix keeps that prefix whether or
    /// not it ends in `/`.
    pub fn new(base_url: Url, api_key: impl Into<String>) -> Self {
        Self {
            base_url: as_directory(base_url),
            api_key: api_key.into(),
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
