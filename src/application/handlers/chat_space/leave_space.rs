//! LeaveSpaceHandler - Command handler for members leaving a space.

use crate::domain::chat_space::{
    transitions, ChatSpaceError, MembershipTransition, Removal, SpaceMember,
};
use crate::domain::foundation::{MemberId, SpaceId};

use super::shared::ChatSpaceDeps;

#[derive(Debug, Clone)]
pub struct LeaveSpaceCommand {
    pub space_id: SpaceId,
    pub member_id: MemberId,
}

#[derive(Debug, Clone)]
pub struct LeaveSpaceResult {
    pub removed: SpaceMember,
}

/// Handler for self-service leave. Also withdraws an open request.
pub struct LeaveSpaceHandler {
    deps: ChatSpaceDeps,
}

impl LeaveSpaceHandler {
    pub fn new(deps: ChatSpaceDeps) -> Self {
        Self { deps }
    }

    pub async fn handle(&self, cmd: LeaveSpaceCommand) -> Result<LeaveSpaceResult, ChatSpaceError> {
        let space = self.deps.load_space(&cmd.space_id).await?;

        let transition: MembershipTransition = self
            .deps
            .write_membership(&space, &cmd.member_id, |existing| {
                transitions::decide_removal(&space, cmd.member_id, existing, Removal::Leave)
            })
            .await?;

        tracing::info!(
            space_id = %space.id,
            member_id = %cmd.member_id,
            "Member left space"
        );

        self.deps
            .after_commit(&space, cmd.member_id, &transition)
            .await;

        Ok(LeaveSpaceResult {
            removed: transition.row().clone(),
        })
    }
}
