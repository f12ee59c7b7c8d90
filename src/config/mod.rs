//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `CHAT_SPACES` prefix and
//! nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use chat_spaces::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod server;
mod sync;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};
pub use sync::SyncConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Environment, logging and reconciliation settings
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL connection pool
    pub database: DatabaseConfig,

    /// Group-messaging provider
    pub sync: SyncConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` if present, then reads `CHAT_SPACES__*` variables:
    ///
    /// - `CHAT_SPACES__DATABASE__URL=...` -> `database.url`
    /// - `CHAT_SPACES__SYNC__DISPATCH=inline` -> `sync.dispatch`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CHAT_SPACES")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.sync.validate(&self.server.environment)?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::DispatchMode;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn set_minimal_env() {
        env::set_var("CHAT_SPACES__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("CHAT_SPACES__SYNC__BASE_URL", "https://chat.example.com");
        env::set_var("CHAT_SPACES__SYNC__API_TOKEN", "secret-token");
    }

    fn clear_env() {
        env::remove_var("CHAT_SPACES__DATABASE__URL");
        env::remove_var("CHAT_SPACES__SYNC__BASE_URL");
        env::remove_var("CHAT_SPACES__SYNC__API_TOKEN");
        env::remove_var("CHAT_SPACES__SYNC__DISPATCH");
        env::remove_var("CHAT_SPACES__SERVER__ENVIRONMENT");
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert_eq!(config.sync.api_token.expose_secret(), "secret-token");
        assert_eq!(config.sync.dispatch, DispatchMode::Detached);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inline_dispatch_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("CHAT_SPACES__SYNC__DISPATCH", "inline");
        let result = AppConfig::load();
        clear_env();

        assert_eq!(result.unwrap().sync.dispatch, DispatchMode::Inline);
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("CHAT_SPACES__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn test_missing_sync_section_fails() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("CHAT_SPACES__DATABASE__URL", "postgresql://test@localhost/test");
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_err());
    }
}
