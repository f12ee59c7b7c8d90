//! Group-messaging provider configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;
use crate::application::DispatchMode;

/// Provider endpoint, credentials and retry policy
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Provider API root, e.g. `https://chat.example.com`
    pub base_url: String,

    /// Bearer token for the provider API
    pub api_token: Secret<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retries after the first attempt for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff before the first retry in milliseconds
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,

    /// How post-commit provider calls are scheduled
    #[serde(default)]
    pub dispatch: DispatchMode,
}

impl SyncConfig {
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::MissingRequired("SYNC__BASE_URL"));
        }
        if self.api_token.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("SYNC__API_TOKEN"));
        }
        let is_https = self.base_url.starts_with("https://");
        if !is_https && !self.base_url.starts_with("http://") {
            return Err(ValidationError::InvalidGatewayUrl(self.base_url.clone()));
        }
        if *environment == Environment::Production && !is_https {
            return Err(ValidationError::GatewayMustBeHttps);
        }
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidSyncTimeout);
        }
        if self.max_retries > 10 {
            return Err(ValidationError::TooManyRetries);
        }
        Ok(())
    }
}

fn default_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff() -> u64 {
    200
}
