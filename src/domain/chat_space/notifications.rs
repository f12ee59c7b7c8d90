//! Notification kinds emitted after membership transitions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{MemberId, SpaceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A member joined a public space.
    Joined,
    /// A member asked to join a private space.
    RequestReceived,
    RequestApproved,
    RequestDisapproved,
    /// An admin added a member directly.
    MemberAdded,
    MemberRemoved,
    MemberLeft,
    RoleUpgraded,
    RoleDowngraded,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Joined => "chat_space.joined",
            NotificationKind::RequestReceived => "chat_space.request_received",
            NotificationKind::RequestApproved => "chat_space.request_approved",
            NotificationKind::RequestDisapproved => "chat_space.request_disapproved",
            NotificationKind::MemberAdded => "chat_space.member_added",
            NotificationKind::MemberRemoved => "chat_space.member_removed",
            NotificationKind::MemberLeft => "chat_space.member_left",
            NotificationKind::RoleUpgraded => "chat_space.role_upgraded",
            NotificationKind::RoleDowngraded => "chat_space.role_downgraded",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened, who did it, and to whom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipNotification {
    pub kind: NotificationKind,
    pub actor: MemberId,
    pub target: MemberId,
    pub space_id: SpaceId,
}
