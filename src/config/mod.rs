//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `FRONT_DESK` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use front_desk::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod editor;
mod error;
mod queue;
mod server;
mod store;

pub use database::DatabaseConfig;
pub use editor::EditorSettings;
pub use error::{ConfigError, ValidationError};
pub use queue::QueueConfig;
pub use server::{Environment, ServerConfig};
pub use store::{StoreBackend, StoreConfig};

use serde::Deserialize;
use std::sync::Arc;

use crate::application::{EditorConfig, FrontDeskConfig};
use crate::domain::queue::{NameOrDepartmentMatcher, QueueProjector};
use crate::domain::visit::DailySequencer;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields an in-memory
/// engine listening on port 8080.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Visit store backend selection
    #[serde(default)]
    pub store: StoreConfig,

    /// Database configuration (PostgreSQL backend only)
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Live queue tuning
    #[serde(default)]
    pub queue: QueueConfig,

    /// Optimistic editor tuning
    #[serde(default)]
    pub editor: EditorSettings,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `FRONT_DESK` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `FRONT_DESK__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `FRONT_DESK__STORE__BACKEND=rest` -> `store.backend = rest`
    /// - `FRONT_DESK__QUEUE__CALL_WINDOW_SECS=90` -> `queue.call_window_secs = 90`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("FRONT_DESK")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.store.validate(&self.server.environment)?;
        if self.store.backend == StoreBackend::Postgres {
            self.database.validate()?;
        }
        self.queue.validate()?;
        self.editor.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }

    /// Engine tunables derived from the queue and editor sections.
    pub fn front_desk(&self) -> Result<FrontDeskConfig, ValidationError> {
        let sequencer = DailySequencer::from_offset_secs(self.queue.utc_offset_secs())
            .ok_or(ValidationError::InvalidUtcOffset)?;
        let matcher = NameOrDepartmentMatcher::from_alias_map(&self.queue.alias_map()?);

        Ok(FrontDeskConfig {
            sequencer,
            projector: QueueProjector::new(Arc::new(matcher), self.queue.call_window()),
            editor: EditorConfig::default()
                .with_debounce(self.editor.debounce())
                .with_retries(self.editor.max_retries, self.editor.retry_backoff()),
        })
    }
}
