//! Sync gateway adapters.

mod http;
mod in_memory;

pub use http::{HttpGatewayConfig, HttpSyncGateway};
pub use in_memory::InMemorySyncGateway;
