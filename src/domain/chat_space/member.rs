//! Membership of one member in one space.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MemberId, SpaceId, SpaceMemberId, Timestamp};

use super::{ExternalSpaceRef, MemberRole, RequestStatus};

/// Opaque handle of a membership in the external provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MembershipRef(pub String);

impl MembershipRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The handle the provider gives `member_id` inside `space_ref`.
    ///
    /// Memberships are named `{space}/members/{member}`, so the handle is
    /// known even when the add that created it was never recorded.
    pub fn derive(space_ref: &ExternalSpaceRef, member_id: &MemberId) -> Self {
        Self(format!("{}/members/{}", space_ref.name, member_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identity of a platform member as the external provider needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberIdentity {
    pub id: MemberId,
    pub display_name: String,
    pub email: String,
}

/// The fields a conditional membership write checks before applying.
///
/// Counter deltas are decided from these, so a write whose expected state
/// no longer matches storage must not commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipState {
    pub request_status: RequestStatus,
    pub role: MemberRole,
    pub removed: bool,
}

/// A member's relationship to a space.
///
/// Unique per `(space_id, member_id)`. Leaving or removal deletes the row.
/// A row flagged `removed` in storage is never counted and is treated as
/// absent by the transition rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceMember {
    pub id: SpaceMemberId,
    pub space_id: SpaceId,
    pub member_id: MemberId,
    pub role: MemberRole,
    pub request_status: RequestStatus,
    /// Comment supplied by the member with their request.
    pub member_comment: Option<String>,
    /// Comment supplied by the admin who reviewed the request.
    pub admin_comment: Option<String>,
    /// Set once the membership has been mirrored remotely.
    pub external_ref: Option<MembershipRef>,
    pub removed: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SpaceMember {
    fn new(
        space_id: SpaceId,
        member_id: MemberId,
        role: MemberRole,
        request_status: RequestStatus,
        member_comment: Option<String>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: SpaceMemberId::new(),
            space_id,
            member_id,
            role,
            request_status,
            member_comment,
            admin_comment: None,
            external_ref: None,
            removed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// The organizer row created together with its space.
    pub fn organizer(space_id: SpaceId, member_id: MemberId) -> Self {
        Self::new(space_id, member_id, MemberRole::Organizer, RequestStatus::Approved, None)
    }

    /// A regular member row approved on creation.
    pub fn approved(space_id: SpaceId, member_id: MemberId) -> Self {
        Self::new(space_id, member_id, MemberRole::Member, RequestStatus::Approved, None)
    }

    /// A regular member row awaiting review.
    pub fn pending(space_id: SpaceId, member_id: MemberId, comment: Option<String>) -> Self {
        Self::new(space_id, member_id, MemberRole::Member, RequestStatus::Pending, comment)
    }

    /// True if this row counts towards the space's total members.
    pub fn is_counted(&self) -> bool {
        self.request_status.is_counted() && !self.removed
    }

    pub fn state(&self) -> MembershipState {
        MembershipState {
            request_status: self.request_status,
            role: self.role,
            removed: self.removed,
        }
    }

    pub fn is_organizer(&self) -> bool {
        self.role == MemberRole::Organizer
    }

    pub fn is_admin(&self) -> bool {
        self.role == MemberRole::Admin && self.is_counted()
    }

    pub(crate) fn touched(self) -> Self {
        Self {
            updated_at: Timestamp::now(),
            ..self
        }
    }
}
