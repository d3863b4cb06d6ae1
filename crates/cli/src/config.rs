use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Optional settings file for the `composio` binary.
///
/// ```toml
/// base_url = "https://backend.composio.dev/"
/// timeout_secs = 30
///
/// [credentials]
/// secret_name = "composio/api-key"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Broker root URL; the SDK default when absent.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Per-request timeout. No timeout when absent; must not be 0.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub user_agent: Option<String>,

    #[serde(default)]
    pub credentials: CredentialsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsConfig {
    /// Secret holding the API key and connected account ids.
    #[serde(default)]
    pub secret_name: Option<String>,
}

impl CliConfig {
    pub fn load(config_path: &Path) -> Result<Self> {
        // Load config file if it exists, otherwise use defaults
        if !config_path.exists() {
            tracing::debug!(
                path = %config_path.display(),
                "Configuration file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(config_path).context("Failed to read configuration file")?;
        let config: Self =
            toml::from_str(&content).context("Failed to parse configuration file")?;
        config.validate()?;
        tracing::debug!(path = %config_path.display(), "Loaded configuration");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.timeout_secs == Some(0) {
            bail!("timeout_secs must be at least 1; remove it to disable the timeout");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
