//! JoinSpaceHandler - Command handler for joining a public space.

use crate::domain::chat_space::{transitions, ChatSpaceError, JoinIntent, MembershipTransition, SpaceMember};
use crate::domain::foundation::{MemberId, SpaceId};

use super::shared::ChatSpaceDeps;

/// Command for a member joining a space on their own.
#[derive(Debug, Clone)]
pub struct JoinSpaceCommand {
    pub space_id: SpaceId,
    pub member_id: MemberId,
}

#[derive(Debug, Clone)]
pub struct JoinSpaceResult {
    pub membership: SpaceMember,
}

/// Handler for direct joins.
///
/// Public spaces approve immediately. Private spaces reject direct joins
/// with `CannotJoinPrivateSpaceDirectly`; members must request instead.
pub struct JoinSpaceHandler {
    deps: ChatSpaceDeps,
}

impl JoinSpaceHandler {
    pub fn new(deps: ChatSpaceDeps) -> Self {
        Self { deps }
    }

    pub async fn handle(&self, cmd: JoinSpaceCommand) -> Result<JoinSpaceResult, ChatSpaceError> {
        let space = self.deps.load_space(&cmd.space_id).await?;
        transitions::ensure_not_organizer(&space, cmd.member_id)?;

        let transition: MembershipTransition = self
            .deps
            .write_membership(&space, &cmd.member_id, |existing| {
                transitions::decide_join(&space, cmd.member_id, existing, JoinIntent::Join)
            })
            .await?;

        tracing::info!(
            space_id = %space.id,
            member_id = %cmd.member_id,
            "Member joined space"
        );

        self.deps
            .after_commit(&space, cmd.member_id, &transition)
            .await;

        Ok(JoinSpaceResult {
            membership: transition.row().clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::chat_space::shared::testing::Harness;
    use crate::domain::chat_space::{
        ErrorKind, NotificationKind, RequestStatus, SpaceStatus, SpaceVisibility,
    };

    #[tokio::test]
    async fn public_join_is_approved_counted_and_mirrored() {
        let h = Harness::new();
        let space = h.space(SpaceVisibility::Public).await;
        let member = h.member("Linus");

        let result = JoinSpaceHandler::new(h.deps.clone())
            .handle(JoinSpaceCommand {
                space_id: space.id,
                member_id: member,
            })
            .await
            .unwrap();

        assert_eq!(result.membership.request_status, RequestStatus::Approved);
        assert_eq!(h.total_members(&space), 2);
        assert!(h.row(&space, &member).unwrap().external_ref.is_some());
        assert_eq!(h.notifier.kinds(), vec![NotificationKind::Joined]);
    }

    #[tokio::test]
    async fn second_join_is_already_joined_without_mutation() {
        let h = Harness::new();
        let space = h.space(SpaceVisibility::Public).await;
        let member = h.member("Linus");
        let handler = JoinSpaceHandler::new(h.deps.clone());
        let cmd = JoinSpaceCommand {
            space_id: space.id,
            member_id: member,
        };
        handler.handle(cmd.clone()).await.unwrap();

        let err = handler.handle(cmd).await.unwrap_err();

        assert_eq!(err, ChatSpaceError::already_joined(space.id, member));
        assert_eq!(h.total_members(&space), 2);
    }

    #[tokio::test]
    async fn private_space_rejects_direct_join() {
        let h = Harness::new();
        let space = h.space(SpaceVisibility::Private).await;

        let err = JoinSpaceHandler::new(h.deps.clone())
            .handle(JoinSpaceCommand {
                space_id: space.id,
                member_id: h.member("Linus"),
            })
            .await
            .unwrap_err();

        assert_eq!(err, ChatSpaceError::CannotJoinPrivateSpaceDirectly(space.id));
    }

    #[tokio::test]
    async fn organizer_cannot_join_own_space() {
        let h = Harness::new();
        let space = h.space(SpaceVisibility::Public).await;

        let err = JoinSpaceHandler::new(h.deps.clone())
            .handle(JoinSpaceCommand {
                space_id: space.id,
                member_id: space.organizer_id,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ChatSpaceError::OrganizerImmutable { .. }));
        assert_eq!(h.total_members(&space), 1);
    }

    #[tokio::test]
    async fn inactive_space_rejects_join() {
        let h = Harness::new();
        let space = h.space(SpaceVisibility::Public).await;
        h.store
            .seed_space(space.clone().with_status(SpaceStatus::Inactive).unwrap());

        let err = JoinSpaceHandler::new(h.deps.clone())
            .handle(JoinSpaceCommand {
                space_id: space.id,
                member_id: h.member("Linus"),
            })
            .await
            .unwrap_err();

        assert_eq!(err, ChatSpaceError::SpaceInactive(space.id));
        assert_eq!(err.kind(), ErrorKind::State);
    }

    #[tokio::test]
    async fn unknown_space_is_not_found() {
        let h = Harness::new();
        let missing = SpaceId::new();
        let err = JoinSpaceHandler::new(h.deps.clone())
            .handle(JoinSpaceCommand {
                space_id: missing,
                member_id: h.member("Linus"),
            })
            .await
            .unwrap_err();
        assert_eq!(err, ChatSpaceError::SpaceNotFound(missing));
    }

    #[tokio::test]
    async fn remote_failure_does_not_undo_join() {
        let h = Harness::new();
        let space = h.space(SpaceVisibility::Public).await;
        let member = h.member("Linus");
        h.gateway.fail_next(crate::ports::SyncError::Timeout);

        JoinSpaceHandler::new(h.deps.clone())
            .handle(JoinSpaceCommand {
                space_id: space.id,
                member_id: member,
            })
            .await
            .unwrap();

        assert_eq!(h.total_members(&space), 2);
        assert!(h.row(&space, &member).unwrap().external_ref.is_none());
        assert_eq!(h.reporter.reports().len(), 1);
    }
}
