//! Tracing subscriber setup.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ServerConfig;

/// Installs the global subscriber: JSON lines in production, compact
/// human-readable output elsewhere. `RUST_LOG` overrides `log_level`.
pub fn init_tracing(config: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if config.is_production() {
        fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(true)
            .init();
    } else {
        fmt().with_env_filter(filter).compact().init();
    }
}
