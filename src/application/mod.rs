//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! `ChatSpaceService` is the single entry point callers use; it delegates
//! to one handler per use case.

mod authorization;
mod chat_space_service;
pub mod handlers;
mod member_counts;
mod sync_dispatcher;

pub use authorization::AuthorizationGuard;
pub use chat_space_service::{ChatSpaceService, SpaceInput};
pub use handlers::{ChatSpaceDeps, ReconcileMembersResult, SpaceView, StatusChange};
pub use member_counts::MemberCountAggregator;
pub use sync_dispatcher::{DispatchMode, SyncDispatcher, SyncJob};
