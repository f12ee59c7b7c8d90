//! ChangeRoleHandler - Command handler for promoting and demoting members.

use crate::domain::chat_space::{
    transitions, ChatSpaceError, MembershipTransition, RoleChange, SpaceMember,
};
use crate::domain::foundation::{MemberId, SpaceId};

use super::shared::ChatSpaceDeps;

/// Command to upgrade a member to admin or downgrade an admin to member.
#[derive(Debug, Clone)]
pub struct ChangeRoleCommand {
    pub space_id: SpaceId,
    pub actor_id: MemberId,
    pub member_id: MemberId,
    pub change: RoleChange,
}

#[derive(Debug, Clone)]
pub struct ChangeRoleResult {
    pub membership: SpaceMember,
}

/// Handler for role changes. Metadata only: no counter or remote effect.
pub struct ChangeRoleHandler {
    deps: ChatSpaceDeps,
}

impl ChangeRoleHandler {
    pub fn new(deps: ChatSpaceDeps) -> Self {
        Self { deps }
    }

    pub async fn handle(&self, cmd: ChangeRoleCommand) -> Result<ChangeRoleResult, ChatSpaceError> {
        let space = self.deps.load_space(&cmd.space_id).await?;
        self.deps
            .guard
            .verify_creator_or_admin(&space, &cmd.actor_id)
            .await?;

        let transition: MembershipTransition = self
            .deps
            .write_membership(&space, &cmd.member_id, |existing| {
                transitions::decide_role_change(&space, cmd.member_id, existing, cmd.change)
            })
            .await?;

        tracing::info!(
            space_id = %space.id,
            member_id = %cmd.member_id,
            role = %transition.row().role,
            "Member role changed"
        );

        self.deps.after_commit(&space, cmd.actor_id, &transition).await;

        Ok(ChangeRoleResult {
            membership: transition.row().clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::chat_space::shared::testing::Harness;
    use crate::domain::chat_space::{ErrorKind, MemberRole, NotificationKind, SpaceVisibility};

    fn change(space_id: SpaceId, actor: MemberId, member: MemberId, change: RoleChange) -> ChangeRoleCommand {
        ChangeRoleCommand {
            space_id,
            actor_id: actor,
            member_id: member,
            change,
        }
    }

    #[tokio::test]
    async fn upgrade_grants_admin_rights() {
        let h = Harness::new();
        let space = h.space(SpaceVisibility::Public).await;
        let member = h.member("Margaret");
        h.store.seed_membership(SpaceMember::approved(space.id, member));

        let result = ChangeRoleHandler::new(h.deps.clone())
            .handle(change(space.id, space.organizer_id, member, RoleChange::Upgrade))
            .await
            .unwrap();

        assert_eq!(result.membership.role, MemberRole::Admin);
        assert!(h.deps.guard.is_creator_or_admin(&space, &member).await);
        assert_eq!(h.total_members(&space), 1);
        assert_eq!(h.notifier.kinds(), vec![NotificationKind::RoleUpgraded]);
    }

    #[tokio::test]
    async fn downgrade_revokes_admin_rights() {
        let h = Harness::new();
        let space = h.space(SpaceVisibility::Public).await;
        let member = h.member("Margaret");
        h.store.seed_membership(SpaceMember {
            role: MemberRole::Admin,
            ..SpaceMember::approved(space.id, member)
        });

        ChangeRoleHandler::new(h.deps.clone())
            .handle(change(space.id, space.organizer_id, member, RoleChange::Downgrade))
            .await
            .unwrap();

        assert!(!h.deps.guard.is_creator_or_admin(&space, &member).await);
    }

    #[tokio::test]
    async fn pending_member_cannot_be_upgraded() {
        let h = Harness::new();
        let space = h.space(SpaceVisibility::Private).await;
        let member = h.member("Margaret");
        h.store
            .seed_membership(SpaceMember::pending(space.id, member, None));

        let err = ChangeRoleHandler::new(h.deps.clone())
            .handle(change(space.id, space.organizer_id, member, RoleChange::Upgrade))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::State);
        assert_eq!(h.row(&space, &member).unwrap().role, MemberRole::Member);
    }

    #[tokio::test]
    async fn organizer_role_is_fixed() {
        let h = Harness::new();
        let space = h.space(SpaceVisibility::Public).await;

        let err = ChangeRoleHandler::new(h.deps.clone())
            .handle(change(space.id, space.organizer_id, space.organizer_id, RoleChange::Downgrade))
            .await
            .unwrap_err();

        assert!(matches!(err, ChatSpaceError::OrganizerImmutable { .. }));
    }
}
