//! Membership transition rules.
//!
//! Pure functions: given the space, the current membership row (if any) and
//! the requested action, they either reject the action or return the single
//! write to perform together with its counter effect. Nothing here touches
//! storage, so the orchestrator can re-run a decision against a freshly read
//! row after a uniqueness conflict.
//!
//! ```text
//!            request (private)          approve
//!   (none) ───────────────────▶ PENDING ─────────▶ APPROVED ──▶ (deleted)
//!     │                           │  ▲                ▲   leave / remove
//!     │ join (public)             │  │ re-request     │
//!     └───────────────────────────┼──┼────────────────┘
//!                      disapprove ▼  │      approve / add
//!                              DISAPPROVED ─────────┘
//! ```

use crate::domain::foundation::{MemberId, StateMachine};

use super::{
    ChatSpace, ChatSpaceError, CounterDelta, MemberRole, MembershipState, NotificationKind,
    RequestStatus, SpaceMember, SpaceVisibility,
};

/// The single row write a transition performs.
///
/// Updates and deletes are conditional: they only apply while the stored
/// row is still in the state the decision was made from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipWrite {
    Insert(SpaceMember),
    Update {
        row: SpaceMember,
        expected: MembershipState,
    },
    /// Carries the row as it was read; its state is the precondition.
    Delete(SpaceMember),
}

impl MembershipWrite {
    /// Replaces `previous` with `row`, bumping its update time.
    fn update(previous: &SpaceMember, row: SpaceMember) -> Self {
        MembershipWrite::Update {
            row: row.touched(),
            expected: previous.state(),
        }
    }

    /// The row as it looks after the write (or as it was, for deletes).
    pub fn row(&self) -> &SpaceMember {
        match self {
            MembershipWrite::Insert(row)
            | MembershipWrite::Update { row, .. }
            | MembershipWrite::Delete(row) => row,
        }
    }
}

/// Work owed to the external provider once the write has committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteEffect {
    None,
    AddMember,
    RemoveMember,
}

/// Outcome of a successful transition decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipTransition {
    pub write: MembershipWrite,
    pub counter: CounterDelta,
    pub notification: NotificationKind,
}

impl MembershipTransition {
    fn new(write: MembershipWrite, counter: CounterDelta, notification: NotificationKind) -> Self {
        Self {
            write,
            counter,
            notification,
        }
    }

    pub fn row(&self) -> &SpaceMember {
        self.write.row()
    }

    /// Entering `Approved` adds the member remotely; leaving it removes them.
    pub fn remote_effect(&self) -> RemoteEffect {
        match self.counter {
            CounterDelta::Increment => RemoteEffect::AddMember,
            CounterDelta::Decrement => RemoteEffect::RemoveMember,
            CounterDelta::Unchanged => RemoteEffect::None,
        }
    }
}

/// Outcome of an admin add, which is idempotent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddDecision {
    Apply(MembershipTransition),
    AlreadyMember(SpaceMember),
}

/// Self-service entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinIntent {
    Join,
    Request { comment: Option<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Approve,
    Disapprove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleChange {
    Upgrade,
    Downgrade,
}

impl RoleChange {
    fn target(&self) -> MemberRole {
        match self {
            RoleChange::Upgrade => MemberRole::Admin,
            RoleChange::Downgrade => MemberRole::Member,
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            RoleChange::Upgrade => "upgrade",
            RoleChange::Downgrade => "downgrade",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The member leaves on their own.
    Leave,
    /// An organizer or admin removes the member.
    ByAdmin,
}

/// Rows flagged removed in storage behave as if absent.
fn live(existing: Option<&SpaceMember>) -> Option<&SpaceMember> {
    existing.filter(|row| !row.removed)
}

/// Rejects self-service joins by the organizer before any other rule runs.
pub fn ensure_not_organizer(space: &ChatSpace, member_id: MemberId) -> Result<(), ChatSpaceError> {
    if space.is_organizer(&member_id) {
        return Err(ChatSpaceError::organizer_immutable(
            space.id,
            member_id,
            "join their own space",
        ));
    }
    Ok(())
}

/// Reuses a stale row (if any) as a fresh member row for `member_id`.
fn revive(existing: Option<&SpaceMember>, fresh: SpaceMember) -> MembershipWrite {
    match existing {
        Some(stale) => MembershipWrite::update(
            stale,
            SpaceMember {
                id: stale.id,
                created_at: stale.created_at,
                ..fresh
            },
        ),
        None => MembershipWrite::Insert(fresh),
    }
}

/// Decides a self-service `join` or `request_to_join`.
pub fn decide_join(
    space: &ChatSpace,
    member_id: MemberId,
    existing: Option<&SpaceMember>,
    intent: JoinIntent,
) -> Result<MembershipTransition, ChatSpaceError> {
    ensure_not_organizer(space, member_id)?;
    space.ensure_joinable()?;

    // An existing request follows the same rules on every visibility, so a
    // space turning public never auto-approves a pending or refused request.
    if let Some(row) = live(existing) {
        match row.request_status {
            RequestStatus::Approved => {
                return Err(ChatSpaceError::already_joined(space.id, member_id));
            }
            RequestStatus::Pending => {
                return Err(ChatSpaceError::request_pending(space.id, member_id));
            }
            RequestStatus::Disapproved => {}
        }
    }

    let comment = match intent {
        JoinIntent::Join if space.visibility == SpaceVisibility::Private => {
            return Err(ChatSpaceError::CannotJoinPrivateSpaceDirectly(space.id));
        }
        JoinIntent::Join => None,
        JoinIntent::Request { comment } => comment,
    };

    let write = match live(existing) {
        Some(row) => {
            let status = row.request_status.transition_to(RequestStatus::Pending)?;
            MembershipWrite::update(
                row,
                SpaceMember {
                    request_status: status,
                    member_comment: comment,
                    admin_comment: None,
                    ..row.clone()
                },
            )
        }
        None if space.visibility == SpaceVisibility::Public => {
            let mut fresh = SpaceMember::approved(space.id, member_id);
            fresh.member_comment = comment;
            return Ok(MembershipTransition::new(
                revive(existing, fresh),
                CounterDelta::Increment,
                NotificationKind::Joined,
            ));
        }
        None => revive(existing, SpaceMember::pending(space.id, member_id, comment)),
    };

    Ok(MembershipTransition::new(
        write,
        CounterDelta::Unchanged,
        NotificationKind::RequestReceived,
    ))
}

/// Decides an admin's review of a pending or disapproved request.
pub fn decide_review(
    space: &ChatSpace,
    member_id: MemberId,
    existing: Option<&SpaceMember>,
    decision: ReviewDecision,
    admin_comment: Option<String>,
) -> Result<MembershipTransition, ChatSpaceError> {
    space.ensure_not_deleted()?;
    let row = live(existing).ok_or_else(|| ChatSpaceError::membership_not_found(space.id, member_id))?;

    let (target, counter, notification, verb) = match decision {
        ReviewDecision::Approve => (
            RequestStatus::Approved,
            CounterDelta::Increment,
            NotificationKind::RequestApproved,
            "approve",
        ),
        ReviewDecision::Disapprove => (
            RequestStatus::Disapproved,
            CounterDelta::Unchanged,
            NotificationKind::RequestDisapproved,
            "disapprove",
        ),
    };

    if row.request_status == RequestStatus::Approved {
        return Err(ChatSpaceError::already_joined(space.id, member_id));
    }
    if decision == ReviewDecision::Disapprove && row.request_status != RequestStatus::Pending {
        return Err(ChatSpaceError::invalid_transition(
            space.id,
            member_id,
            row.request_status.as_str(),
            verb,
        ));
    }

    let status = row.request_status.transition_to(target).map_err(|_| {
        ChatSpaceError::invalid_transition(space.id, member_id, row.request_status.as_str(), verb)
    })?;

    let updated = SpaceMember {
        request_status: status,
        admin_comment: admin_comment.or_else(|| row.admin_comment.clone()),
        ..row.clone()
    };

    Ok(MembershipTransition::new(
        MembershipWrite::update(row, updated),
        counter,
        notification,
    ))
}

/// Decides an admin adding a member directly, bypassing review.
pub fn decide_add(
    space: &ChatSpace,
    member_id: MemberId,
    existing: Option<&SpaceMember>,
) -> Result<AddDecision, ChatSpaceError> {
    space.ensure_not_deleted()?;

    let write = match live(existing) {
        Some(row) if row.request_status == RequestStatus::Approved => {
            return Ok(AddDecision::AlreadyMember(row.clone()));
        }
        Some(row) => MembershipWrite::update(
            row,
            SpaceMember {
                request_status: RequestStatus::Approved,
                ..row.clone()
            },
        ),
        None => revive(existing, SpaceMember::approved(space.id, member_id)),
    };

    Ok(AddDecision::Apply(MembershipTransition::new(
        write,
        CounterDelta::Increment,
        NotificationKind::MemberAdded,
    )))
}

/// Decides a leave or an admin removal. The row is always deleted.
pub fn decide_removal(
    space: &ChatSpace,
    member_id: MemberId,
    existing: Option<&SpaceMember>,
    removal: Removal,
) -> Result<MembershipTransition, ChatSpaceError> {
    space.ensure_not_deleted()?;
    let row = live(existing).ok_or_else(|| ChatSpaceError::membership_not_found(space.id, member_id))?;

    if row.is_organizer() {
        let action = match removal {
            Removal::Leave => "leave",
            Removal::ByAdmin => "be removed",
        };
        return Err(ChatSpaceError::organizer_immutable(space.id, member_id, action));
    }

    let counter = if row.is_counted() {
        CounterDelta::Decrement
    } else {
        CounterDelta::Unchanged
    };
    let notification = match removal {
        Removal::Leave => NotificationKind::MemberLeft,
        Removal::ByAdmin => NotificationKind::MemberRemoved,
    };

    Ok(MembershipTransition::new(
        MembershipWrite::Delete(row.clone()),
        counter,
        notification,
    ))
}

/// Decides promoting a member to admin or demoting an admin to member.
pub fn decide_role_change(
    space: &ChatSpace,
    member_id: MemberId,
    existing: Option<&SpaceMember>,
    change: RoleChange,
) -> Result<MembershipTransition, ChatSpaceError> {
    space.ensure_not_deleted()?;
    let row = live(existing).ok_or_else(|| ChatSpaceError::membership_not_found(space.id, member_id))?;

    if row.is_organizer() {
        return Err(ChatSpaceError::organizer_immutable(space.id, member_id, "change role"));
    }
    if row.request_status != RequestStatus::Approved {
        return Err(ChatSpaceError::invalid_transition(
            space.id,
            member_id,
            row.request_status.as_str(),
            change.verb(),
        ));
    }

    let role = row.role.transition_to(change.target()).map_err(|_| {
        ChatSpaceError::invalid_transition(space.id, member_id, row.role.as_str(), change.verb())
    })?;

    let notification = match change {
        RoleChange::Upgrade => NotificationKind::RoleUpgraded,
        RoleChange::Downgrade => NotificationKind::RoleDowngraded,
    };

    Ok(MembershipTransition::new(
        MembershipWrite::update(row, SpaceMember { role, ..row.clone() }),
        CounterDelta::Unchanged,
        notification,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat_space::{ExternalSpaceRef, SpaceDetails, SpaceStatus};
    use crate::domain::foundation::SpaceId;
    use proptest::prelude::*;

    fn space(visibility: SpaceVisibility) -> ChatSpace {
        ChatSpace::create(
            SpaceId::new(),
            SpaceDetails::new("Space", "Desc", vec![], None, visibility).unwrap(),
            MemberId::new(),
            ExternalSpaceRef {
                id: "ext".into(),
                name: "spaces/ext".into(),
            },
        )
    }

    fn request(comment: &str) -> JoinIntent {
        JoinIntent::Request {
            comment: Some(comment.to_string()),
        }
    }

    fn row_with(space: &ChatSpace, member: MemberId, status: RequestStatus) -> SpaceMember {
        SpaceMember {
            request_status: status,
            ..SpaceMember::pending(space.id, member, Some("old".into()))
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Join / request
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn first_join_on_public_space_is_approved_immediately() {
        let s = space(SpaceVisibility::Public);
        let t = decide_join(&s, MemberId::new(), None, JoinIntent::Join).unwrap();
        assert!(matches!(t.write, MembershipWrite::Insert(_)));
        assert_eq!(t.row().request_status, RequestStatus::Approved);
        assert_eq!(t.counter, CounterDelta::Increment);
        assert_eq!(t.remote_effect(), RemoteEffect::AddMember);
    }

    #[test]
    fn first_request_on_private_space_is_pending_with_comment() {
        let s = space(SpaceVisibility::Private);
        let t = decide_join(&s, MemberId::new(), None, request("hi")).unwrap();
        assert_eq!(t.row().request_status, RequestStatus::Pending);
        assert_eq!(t.row().member_comment.as_deref(), Some("hi"));
        assert_eq!(t.counter, CounterDelta::Unchanged);
        assert_eq!(t.notification, NotificationKind::RequestReceived);
    }

    #[test]
    fn direct_join_on_private_space_is_rejected() {
        let s = space(SpaceVisibility::Private);
        let err = decide_join(&s, MemberId::new(), None, JoinIntent::Join).unwrap_err();
        assert_eq!(err, ChatSpaceError::CannotJoinPrivateSpaceDirectly(s.id));
    }

    #[test]
    fn pending_re_request_is_rejected() {
        let s = space(SpaceVisibility::Private);
        let m = MemberId::new();
        let row = row_with(&s, m, RequestStatus::Pending);
        let err = decide_join(&s, m, Some(&row), request("again")).unwrap_err();
        assert_eq!(err, ChatSpaceError::request_pending(s.id, m));
    }

    #[test]
    fn disapproved_re_request_returns_to_pending_and_replaces_comment() {
        let s = space(SpaceVisibility::Private);
        let m = MemberId::new();
        let mut row = row_with(&s, m, RequestStatus::Disapproved);
        row.admin_comment = Some("no".into());
        let t = decide_join(&s, m, Some(&row), request("please")).unwrap();
        let updated = t.row();
        assert!(matches!(t.write, MembershipWrite::Update { .. }));
        assert_eq!(updated.id, row.id);
        assert_eq!(updated.request_status, RequestStatus::Pending);
        assert_eq!(updated.member_comment.as_deref(), Some("please"));
        assert_eq!(updated.admin_comment, None);
    }

    #[test]
    fn pending_request_stays_pending_after_space_turns_public() {
        let s = space(SpaceVisibility::Public);
        let m = MemberId::new();
        let row = row_with(&s, m, RequestStatus::Pending);
        for intent in [JoinIntent::Join, request("again")] {
            let err = decide_join(&s, m, Some(&row), intent).unwrap_err();
            assert_eq!(err, ChatSpaceError::request_pending(s.id, m));
        }
    }

    #[test]
    fn disapproved_member_on_public_space_goes_back_to_review() {
        let s = space(SpaceVisibility::Public);
        let m = MemberId::new();
        let row = row_with(&s, m, RequestStatus::Disapproved);
        let t = decide_join(&s, m, Some(&row), JoinIntent::Join).unwrap();
        assert_eq!(t.row().request_status, RequestStatus::Pending);
        assert_eq!(t.counter, CounterDelta::Unchanged);
        assert_eq!(t.remote_effect(), RemoteEffect::None);
    }

    #[test]
    fn updates_expect_the_state_they_were_decided_from() {
        let s = space(SpaceVisibility::Private);
        let m = MemberId::new();
        let row = row_with(&s, m, RequestStatus::Pending);
        let t = decide_review(&s, m, Some(&row), ReviewDecision::Approve, None).unwrap();
        match t.write {
            MembershipWrite::Update { expected, row: updated } => {
                assert_eq!(expected, row.state());
                assert_eq!(updated.request_status, RequestStatus::Approved);
            }
            other => panic!("expected Update, got {:?}", other),
        }
    }

    #[test]
    fn organizer_cannot_join_own_space() {
        let s = space(SpaceVisibility::Public);
        let err = decide_join(&s, s.organizer_id, None, JoinIntent::Join).unwrap_err();
        assert!(matches!(err, ChatSpaceError::OrganizerImmutable { .. }));
    }

    #[test]
    fn inactive_space_rejects_join() {
        let s = space(SpaceVisibility::Public)
            .with_status(SpaceStatus::Inactive)
            .unwrap();
        let err = decide_join(&s, MemberId::new(), None, JoinIntent::Join).unwrap_err();
        assert_eq!(err, ChatSpaceError::SpaceInactive(s.id));
    }

    #[test]
    fn removed_row_is_revived_in_place() {
        let s = space(SpaceVisibility::Public);
        let m = MemberId::new();
        let mut stale = SpaceMember::approved(s.id, m);
        stale.removed = true;
        let t = decide_join(&s, m, Some(&stale), JoinIntent::Join).unwrap();
        assert!(matches!(t.write, MembershipWrite::Update { .. }));
        assert_eq!(t.row().id, stale.id);
        assert!(!t.row().removed);
        assert_eq!(t.counter, CounterDelta::Increment);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Review
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn approve_pending_increments_and_keeps_admin_comment() {
        let s = space(SpaceVisibility::Private);
        let m = MemberId::new();
        let row = row_with(&s, m, RequestStatus::Pending);
        let t = decide_review(&s, m, Some(&row), ReviewDecision::Approve, Some("welcome".into()))
            .unwrap();
        assert_eq!(t.row().request_status, RequestStatus::Approved);
        assert_eq!(t.row().admin_comment.as_deref(), Some("welcome"));
        assert_eq!(t.counter, CounterDelta::Increment);
    }

    #[test]
    fn approve_disapproved_is_allowed() {
        let s = space(SpaceVisibility::Private);
        let m = MemberId::new();
        let row = row_with(&s, m, RequestStatus::Disapproved);
        let t = decide_review(&s, m, Some(&row), ReviewDecision::Approve, None).unwrap();
        assert_eq!(t.row().request_status, RequestStatus::Approved);
    }

    #[test]
    fn disapprove_pending_has_no_counter_effect() {
        let s = space(SpaceVisibility::Private);
        let m = MemberId::new();
        let row = row_with(&s, m, RequestStatus::Pending);
        let t = decide_review(&s, m, Some(&row), ReviewDecision::Disapprove, None).unwrap();
        assert_eq!(t.row().request_status, RequestStatus::Disapproved);
        assert_eq!(t.remote_effect(), RemoteEffect::None);
    }

    #[test]
    fn disapprove_disapproved_is_invalid() {
        let s = space(SpaceVisibility::Private);
        let m = MemberId::new();
        let row = row_with(&s, m, RequestStatus::Disapproved);
        let err = decide_review(&s, m, Some(&row), ReviewDecision::Disapprove, None).unwrap_err();
        assert!(matches!(err, ChatSpaceError::InvalidTransition { .. }));
    }

    #[test]
    fn review_without_row_is_not_found() {
        let s = space(SpaceVisibility::Private);
        let m = MemberId::new();
        let err = decide_review(&s, m, None, ReviewDecision::Approve, None).unwrap_err();
        assert_eq!(err, ChatSpaceError::membership_not_found(s.id, m));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Add / remove / role
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn add_on_private_space_approves_regardless_of_visibility() {
        let s = space(SpaceVisibility::Private);
        let decision = decide_add(&s, MemberId::new(), None).unwrap();
        match decision {
            AddDecision::Apply(t) => {
                assert_eq!(t.row().request_status, RequestStatus::Approved);
                assert_eq!(t.counter, CounterDelta::Increment);
            }
            other => panic!("expected Apply, got {:?}", other),
        }
    }

    #[test]
    fn add_existing_approved_member_is_a_no_op() {
        let s = space(SpaceVisibility::Public);
        let m = MemberId::new();
        let row = SpaceMember::approved(s.id, m);
        assert_eq!(
            decide_add(&s, m, Some(&row)).unwrap(),
            AddDecision::AlreadyMember(row)
        );
    }

    #[test]
    fn removing_approved_member_decrements() {
        let s = space(SpaceVisibility::Public);
        let m = MemberId::new();
        let row = SpaceMember::approved(s.id, m);
        let t = decide_removal(&s, m, Some(&row), Removal::ByAdmin).unwrap();
        assert!(matches!(t.write, MembershipWrite::Delete(_)));
        assert_eq!(t.counter, CounterDelta::Decrement);
        assert_eq!(t.remote_effect(), RemoteEffect::RemoveMember);
    }

    #[test]
    fn leaving_while_pending_only_deletes_row() {
        let s = space(SpaceVisibility::Private);
        let m = MemberId::new();
        let row = row_with(&s, m, RequestStatus::Pending);
        let t = decide_removal(&s, m, Some(&row), Removal::Leave).unwrap();
        assert_eq!(t.counter, CounterDelta::Unchanged);
        assert_eq!(t.notification, NotificationKind::MemberLeft);
    }

    #[test]
    fn organizer_cannot_leave_or_be_removed() {
        let s = space(SpaceVisibility::Public);
        let row = SpaceMember::organizer(s.id, s.organizer_id);
        for removal in [Removal::Leave, Removal::ByAdmin] {
            let err = decide_removal(&s, s.organizer_id, Some(&row), removal).unwrap_err();
            assert!(matches!(err, ChatSpaceError::OrganizerImmutable { .. }));
        }
    }

    #[test]
    fn upgrade_requires_approved_status() {
        let s = space(SpaceVisibility::Private);
        let m = MemberId::new();
        let row = row_with(&s, m, RequestStatus::Pending);
        let err = decide_role_change(&s, m, Some(&row), RoleChange::Upgrade).unwrap_err();
        assert!(matches!(err, ChatSpaceError::InvalidTransition { .. }));
    }

    #[test]
    fn upgrade_then_downgrade() {
        let s = space(SpaceVisibility::Public);
        let m = MemberId::new();
        let row = SpaceMember::approved(s.id, m);
        let up = decide_role_change(&s, m, Some(&row), RoleChange::Upgrade).unwrap();
        assert_eq!(up.row().role, MemberRole::Admin);
        assert_eq!(up.counter, CounterDelta::Unchanged);
        let down = decide_role_change(&s, m, Some(up.row()), RoleChange::Downgrade).unwrap();
        assert_eq!(down.row().role, MemberRole::Member);
    }

    #[test]
    fn upgrading_an_admin_is_invalid() {
        let s = space(SpaceVisibility::Public);
        let m = MemberId::new();
        let row = SpaceMember {
            role: MemberRole::Admin,
            ..SpaceMember::approved(s.id, m)
        };
        let err = decide_role_change(&s, m, Some(&row), RoleChange::Upgrade).unwrap_err();
        assert!(matches!(err, ChatSpaceError::InvalidTransition { .. }));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Properties
    // ════════════════════════════════════════════════════════════════════════════

    fn any_visibility() -> impl Strategy<Value = SpaceVisibility> {
        prop_oneof![Just(SpaceVisibility::Public), Just(SpaceVisibility::Private)]
    }

    fn any_intent() -> impl Strategy<Value = JoinIntent> {
        prop_oneof![
            Just(JoinIntent::Join),
            proptest::option::of("[a-z ]{0,12}").prop_map(|comment| JoinIntent::Request { comment }),
        ]
    }

    proptest! {
        #[test]
        fn approved_member_never_rejoins(visibility in any_visibility(), intent in any_intent()) {
            let s = space(visibility);
            let m = MemberId::new();
            let row = SpaceMember::approved(s.id, m);
            let err = decide_join(&s, m, Some(&row), intent).unwrap_err();
            prop_assert_eq!(err, ChatSpaceError::already_joined(s.id, m));
        }

        #[test]
        fn existing_request_is_never_auto_approved(
            visibility in any_visibility(),
            intent in any_intent(),
            pending in any::<bool>(),
        ) {
            let s = space(visibility);
            let m = MemberId::new();
            let status = if pending { RequestStatus::Pending } else { RequestStatus::Disapproved };
            let row = row_with(&s, m, status);
            if let Ok(t) = decide_join(&s, m, Some(&row), intent) {
                prop_assert_eq!(t.row().request_status, RequestStatus::Pending);
                prop_assert_eq!(t.counter, CounterDelta::Unchanged);
            }
        }

        #[test]
        fn counter_moves_only_on_approved_boundary(
            visibility in any_visibility(),
            intent in any_intent(),
        ) {
            let s = space(visibility);
            if let Ok(t) = decide_join(&s, MemberId::new(), None, intent) {
                let approved = t.row().request_status == RequestStatus::Approved;
                prop_assert_eq!(approved, t.counter == CounterDelta::Increment);
            }
        }
    }
}
