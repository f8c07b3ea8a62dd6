//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid socket address: {0}")]
    InvalidSocketAddr(String),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Invalid store base URL format")]
    InvalidStoreUrl,

    #[error("Store base URL must use HTTPS in production")]
    StoreUrlMustBeHttps,

    #[error("Poll interval must be between 500ms and 5 minutes")]
    InvalidPollInterval,

    #[error("Call window must be between 1 and 3600 seconds")]
    InvalidCallWindow,

    #[error("UTC offset must be within ±14 hours")]
    InvalidUtcOffset,

    #[error("Invalid department alias entry: {0}")]
    InvalidDepartmentAlias(String),

    #[error("Debounce window must be between 50ms and 60s")]
    InvalidDebounce,

    #[error("Retry count exceeds maximum allowed (10)")]
    TooManyRetries,
}
