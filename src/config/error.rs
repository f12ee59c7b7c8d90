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

    #[error("Invalid log filter: {0}")]
    InvalidLogLevel(String),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("Invalid sync gateway URL: {0}")]
    InvalidGatewayUrl(String),

    #[error("Sync gateway must use HTTPS in production")]
    GatewayMustBeHttps,

    #[error("Sync timeout must be between 1 and 120 seconds")]
    InvalidSyncTimeout,

    #[error("Sync retries must not exceed 10")]
    TooManyRetries,

    #[error("Reconcile batch size must be between 1 and 10000")]
    InvalidBatchSize,
}
