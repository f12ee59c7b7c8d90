//! Chat-space handlers.
//!
//! One handler per use case. Every handler follows the same shape: load,
//! authorize, decide (pure), commit (one transaction), then converge the
//! provider and notify.
//!
//! ## Commands
//! - Creating, updating, enabling/disabling and deleting spaces
//! - Joining, requesting, reviewing requests, adding, removing, leaving
//! - Upgrading and downgrading roles
//! - Reconciling members the provider missed
//!
//! ## Queries
//! - Space view for a viewer

mod add_member;
mod change_role;
mod create_space;
mod delete_space;
mod get_space;
mod join_space;
mod leave_space;
mod process_request;
mod reconcile_members;
mod remove_member;
mod request_to_join;
mod set_space_status;
pub(crate) mod shared;
mod update_space;

pub use shared::ChatSpaceDeps;

// Commands
pub use add_member::{AddMemberCommand, AddMemberHandler, AddMemberResult};
pub use change_role::{ChangeRoleCommand, ChangeRoleHandler, ChangeRoleResult};
pub use create_space::{CreateSpaceCommand, CreateSpaceHandler, CreateSpaceResult};
pub use delete_space::{DeleteSpaceCommand, DeleteSpaceHandler, DeleteSpaceResult};
pub use join_space::{JoinSpaceCommand, JoinSpaceHandler, JoinSpaceResult};
pub use leave_space::{LeaveSpaceCommand, LeaveSpaceHandler, LeaveSpaceResult};
pub use process_request::{ProcessRequestCommand, ProcessRequestHandler, ProcessRequestResult};
pub use reconcile_members::{
    ReconcileMembersCommand, ReconcileMembersHandler, ReconcileMembersResult,
};
pub use remove_member::{RemoveMemberCommand, RemoveMemberHandler, RemoveMemberResult};
pub use request_to_join::{RequestToJoinCommand, RequestToJoinHandler, RequestToJoinResult};
pub use set_space_status::{
    SetSpaceStatusCommand, SetSpaceStatusHandler, SetSpaceStatusResult, StatusChange,
};
pub use update_space::{UpdateSpaceCommand, UpdateSpaceHandler, UpdateSpaceResult};

// Queries
pub use get_space::{GetSpaceHandler, GetSpaceQuery, SpaceView};
