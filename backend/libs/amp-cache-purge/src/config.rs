//! Environment configuration

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::credentials::{CachedKeyProvider, CredentialProvider, FileKeyProvider};

pub const DEFAULT_PRIVATE_KEY_LOCATION: &str = "private-key.pem";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Purge configuration read from the environment.
///
/// | Variable | Default |
/// |---|---|
/// | `PRIVATE_KEY_LOCATION` | `private-key.pem` |
/// | `PRIVATE_KEY_PASSWORD` | empty (key not encrypted) |
/// | `PRIVATE_KEY_CACHE` | `false` (key read on every purge) |
/// | `PURGE_REQUEST_TIMEOUT_SECS` | `10` |
#[derive(Debug, Clone, Deserialize)]
pub struct PurgeConfig {
    #[serde(default)]
    pub private_key_location: String,
    #[serde(default)]
    pub private_key_password: String,
    #[serde(default)]
    pub private_key_cache: bool,
    #[serde(default = "default_request_timeout_secs")]
    pub purge_request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for PurgeConfig {
    fn default() -> Self {
        Self {
            private_key_location: DEFAULT_PRIVATE_KEY_LOCATION.to_string(),
            private_key_password: String::new(),
            private_key_cache: false,
            purge_request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl PurgeConfig {
    /// Load from the process environment (and `.env` when present)
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenv::dotenv().ok();
        envy::from_env::<PurgeConfig>()
    }

    /// Load from explicit key/value pairs, using the same variable names
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter::<_, PurgeConfig>(vars)
    }

    /// Key file location; an empty value means the default
    pub fn key_location(&self) -> PathBuf {
        if self.private_key_location.is_empty() {
            PathBuf::from(DEFAULT_PRIVATE_KEY_LOCATION)
        } else {
            PathBuf::from(&self.private_key_location)
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.purge_request_timeout_secs)
    }

    /// Credential provider matching the configured key caching policy
    pub fn credentials(&self) -> Arc<dyn CredentialProvider> {
        let provider = FileKeyProvider::new(self.key_location(), self.private_key_password.clone());
        if self.private_key_cache {
            Arc::new(CachedKeyProvider::new(provider))
        } else {
            Arc::new(provider)
        }
    }
}
