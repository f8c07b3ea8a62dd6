//! Visit store backend selection

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Which `VisitStore` adapter the binary wires in.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local, lost on restart
    #[default]
    Memory,
    /// The portal's REST backend
    Rest,
    /// A `visits` table in PostgreSQL
    Postgres,
}

/// Store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Base URL of the REST backend, e.g. `https://portal.example.com/api`
    pub base_url: Option<String>,

    /// Bearer token sent to the REST backend
    pub api_token: Option<SecretString>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate store configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.backend != StoreBackend::Rest {
            return Ok(());
        }

        let url = self
            .base_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or(ValidationError::MissingRequired("FRONT_DESK__STORE__BASE_URL"))?;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ValidationError::InvalidStoreUrl);
        }
        if *environment == Environment::Production && !url.starts_with("https://") {
            return Err(ValidationError::StoreUrlMustBeHttps);
        }
        if self.api_token.is_none() {
            return Err(ValidationError::MissingRequired("FRONT_DESK__STORE__API_TOKEN"));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            base_url: None,
            api_token: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}
