//! Chat-space domain module.
//!
//! Handles the space aggregate, membership rows, and the rules that move a
//! membership between request states and roles.
//!
//! # Module Structure
//!
//! - `aggregate` - ChatSpace aggregate, details validation, counter deltas
//! - `member` - SpaceMember entity and external membership handles
//! - `status` - SpaceStatus state machine and visibility
//! - `request_status` - RequestStatus and MemberRole state machines
//! - `transitions` - Pure membership transition decisions
//! - `notifications` - Notification kinds emitted after transitions
//! - `errors` - Caller-facing error taxonomy

mod aggregate;
mod errors;
mod member;
mod notifications;
mod request_status;
mod status;
pub mod transitions;

pub use aggregate::{ChatSpace, CounterDelta, ExternalSpaceRef, SpaceDetails};
pub use errors::{ChatSpaceError, ErrorKind};
pub use member::{MemberIdentity, MembershipRef, MembershipState, SpaceMember};
pub use notifications::{MembershipNotification, NotificationKind};
pub use request_status::{MemberRole, RequestStatus};
pub use status::{SpaceStatus, SpaceVisibility};
pub use transitions::{
    AddDecision, JoinIntent, MembershipTransition, MembershipWrite, RemoteEffect, Removal,
    ReviewDecision, RoleChange,
};
