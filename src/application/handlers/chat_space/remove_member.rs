//! RemoveMemberHandler - Command handler for admins removing members.

use crate::domain::chat_space::{
    transitions, ChatSpaceError, MembershipTransition, Removal, SpaceMember,
};
use crate::domain::foundation::{MemberId, SpaceId};

use super::shared::ChatSpaceDeps;

#[derive(Debug, Clone)]
pub struct RemoveMemberCommand {
    pub space_id: SpaceId,
    pub actor_id: MemberId,
    pub member_id: MemberId,
}

#[derive(Debug, Clone)]
pub struct RemoveMemberResult {
    /// The row as it was before deletion.
    pub removed: SpaceMember,
}

/// Handler for admin removals. Works on requests too: removing a pending
/// or disapproved row just deletes it.
pub struct RemoveMemberHandler {
    deps: ChatSpaceDeps,
}

impl RemoveMemberHandler {
    pub fn new(deps: ChatSpaceDeps) -> Self {
        Self { deps }
    }

    pub async fn handle(
        &self,
        cmd: RemoveMemberCommand,
    ) -> Result<RemoveMemberResult, ChatSpaceError> {
        let space = self.deps.load_space(&cmd.space_id).await?;
        self.deps
            .guard
            .verify_creator_or_admin(&space, &cmd.actor_id)
            .await?;

        let transition: MembershipTransition = self
            .deps
            .write_membership(&space, &cmd.member_id, |existing| {
                transitions::decide_removal(&space, cmd.member_id, existing, Removal::ByAdmin)
            })
            .await?;

        tracing::info!(
            space_id = %space.id,
            member_id = %cmd.member_id,
            actor_id = %cmd.actor_id,
            "Member removed from space"
        );

        self.deps.after_commit(&space, cmd.actor_id, &transition).await;

        Ok(RemoveMemberResult {
            removed: transition.row().clone(),
        })
    }
}
