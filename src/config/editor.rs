//! Optimistic field editor configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Editor configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EditorSettings {
    /// Quiet period before a purpose edit is written, in milliseconds
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,

    /// Additional attempts after a failed write
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between attempts, in milliseconds
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
}

impl EditorSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Validate editor configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(50..=60_000).contains(&self.debounce_ms) {
            return Err(ValidationError::InvalidDebounce);
        }
        if self.max_retries > 10 {
            return Err(ValidationError::TooManyRetries);
        }
        Ok(())
    }
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff(),
        }
    }
}

fn default_debounce() -> u64 {
    1_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff() -> u64 {
    500
}
