//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `ChatSpaceStore` / `StoreTransaction` - Durable spaces and memberships
//! - `SyncGateway` - Remote group-messaging provider
//! - `SyncFailureReporter` - Out-of-band channel for swallowed sync failures
//! - `MembershipNotifier` - Notifications after committed transitions
//! - `MemberDirectory` - Platform member lookup

mod chat_space_store;
mod member_directory;
mod membership_notifier;
mod sync_gateway;
mod sync_reporter;

pub use chat_space_store::{ChatSpaceStore, StoreTransaction};
pub use member_directory::MemberDirectory;
pub use membership_notifier::MembershipNotifier;
pub use sync_gateway::{RemoteSpace, SyncError, SyncGateway};
pub use sync_reporter::{SyncCategory, SyncFailureReporter};
