//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `store` - Chat-space persistence (PostgreSQL, in-memory)
//! - `gateway` - Group-messaging provider (HTTP, in-memory)
//! - `directory` - Member lookup
//! - `reporting` - Sync failure reporting and membership notifications

pub mod directory;
pub mod gateway;
pub mod reporting;
pub mod store;

pub use directory::{PostgresMemberDirectory, StaticMemberDirectory};
pub use gateway::{HttpGatewayConfig, HttpSyncGateway, InMemorySyncGateway};
pub use reporting::{RecordingNotifier, RecordingReporter, TracingNotifier, TracingSyncReporter};
pub use store::{InMemoryChatSpaceStore, PostgresChatSpaceStore};
