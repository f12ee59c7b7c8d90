//! Process-level configuration: environment, logging, reconciliation.

use serde::Deserialize;

use super::error::ValidationError;

/// Runtime settings for the service process
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Environment name
    #[serde(default)]
    pub environment: Environment,

    /// Rust log filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Rows examined per reconciliation pass
    #[serde(default = "default_reconcile_batch_size")]
    pub reconcile_batch_size: u32,
}

/// Application environment
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl ServerConfig {
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.log_level.trim().is_empty() {
            return Err(ValidationError::InvalidLogLevel(self.log_level.clone()));
        }
        if self.reconcile_batch_size == 0 || self.reconcile_batch_size > 10_000 {
            return Err(ValidationError::InvalidBatchSize);
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            log_level: default_log_level(),
            reconcile_batch_size: default_reconcile_batch_size(),
        }
    }
}

fn default_log_level() -> String {
    "info,chat_spaces=debug,sqlx=warn".to_string()
}

fn default_reconcile_batch_size() -> u32 {
    500
}
