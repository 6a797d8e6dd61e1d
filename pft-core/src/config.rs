//! Configuration management
//!
//! Optional `settings.json` in the data directory:
//! ```json
//! {
//!   "plaid": { "clientId": "...", "secret": "...", "environment": "sandbox" },
//!   "httpTimeoutSecs": 120
//! }
//! ```
//! `PLAID_CLIENT_ID`, `PLAID_SECRET` and `PLAID_ENV` override the file.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapters::plaid::{PlaidEnvironment, DEFAULT_TIMEOUT_SECS};
use crate::domain::result::{Error, Result as DomainResult};

/// Name of the settings file inside the data directory
pub const SETTINGS_FILE: &str = "settings.json";

pub const PLAID_CLIENT_ID_ENV: &str = "PLAID_CLIENT_ID";
pub const PLAID_SECRET_ENV: &str = "PLAID_SECRET";
pub const PLAID_ENV_ENV: &str = "PLAID_ENV";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    plaid: PlaidSettings,
    #[serde(default)]
    http_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaidSettings {
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    secret: Option<String>,
    #[serde(default)]
    environment: Option<String>,
}

/// Resolved configuration
#[derive(Clone)]
pub struct Config {
    pub plaid_client_id: Option<String>,
    pub plaid_secret: Option<String>,
    pub plaid_environment: PlaidEnvironment,
    pub http_timeout_secs: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("plaid_client_id", &self.plaid_client_id)
            .field("plaid_secret", &self.plaid_secret.as_ref().map(|_| "<redacted>"))
            .field("plaid_environment", &self.plaid_environment)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plaid_client_id: None,
            plaid_secret: None,
            plaid_environment: PlaidEnvironment::Sandbox,
            http_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load config from the data directory and process environment
    pub fn load(data_dir: &Path) -> Result<Self> {
        Self::load_with_env(data_dir, |key| std::env::var(key).ok())
    }

    /// Load config using `env` to look up environment variables
    ///
    /// Empty variables count as unset.
    pub fn load_with_env<F>(data_dir: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings_path = data_dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {}", settings_path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", settings_path.display()))?
        } else {
            SettingsFile::default()
        };

        let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let environment = lookup(PLAID_ENV_ENV)
            .or(raw.plaid.environment)
            .map(|name| PlaidEnvironment::from_name(&name))
            .unwrap_or_default();

        Ok(Self {
            plaid_client_id: lookup(PLAID_CLIENT_ID_ENV).or(raw.plaid.client_id),
            plaid_secret: lookup(PLAID_SECRET_ENV).or(raw.plaid.secret),
            plaid_environment: environment,
            http_timeout_secs: raw.http_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        })
    }

    /// Client id and secret, or a configuration error naming what is missing
    pub fn plaid_credentials(&self) -> DomainResult<(&str, &str)> {
        let client_id = self
            .plaid_client_id
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                Error::config(format!(
                    "{} is not set (environment or plaid.clientId in {})",
                    PLAID_CLIENT_ID_ENV, SETTINGS_FILE
                ))
            })?;
        let secret = self
            .plaid_secret
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                Error::config(format!(
                    "{} is not set (environment or plaid.secret in {})",
                    PLAID_SECRET_ENV, SETTINGS_FILE
                ))
            })?;
        Ok((client_id, secret))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
