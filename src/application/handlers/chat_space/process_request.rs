//! ProcessRequestHandler - Command handler for reviewing join requests.

use crate::domain::chat_space::{
    transitions, ChatSpaceError, MembershipTransition, ReviewDecision, SpaceMember,
};
use crate::domain::foundation::{MemberId, SpaceId};

use super::shared::ChatSpaceDeps;

/// Command for an organizer or admin approving or disapproving a request.
#[derive(Debug, Clone)]
pub struct ProcessRequestCommand {
    pub space_id: SpaceId,
    pub actor_id: MemberId,
    pub member_id: MemberId,
    pub decision: ReviewDecision,
    pub admin_comment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProcessRequestResult {
    pub membership: SpaceMember,
}

/// Handler for request review.
///
/// Approval counts the member and mirrors them remotely exactly once.
/// Disapproval only records the outcome.
pub struct ProcessRequestHandler {
    deps: ChatSpaceDeps,
}

impl ProcessRequestHandler {
    pub fn new(deps: ChatSpaceDeps) -> Self {
        Self { deps }
    }

    pub async fn handle(
        &self,
        cmd: ProcessRequestCommand,
    ) -> Result<ProcessRequestResult, ChatSpaceError> {
        let space = self.deps.load_space(&cmd.space_id).await?;
        self.deps
            .guard
            .verify_creator_or_admin(&space, &cmd.actor_id)
            .await?;

        let transition: MembershipTransition = self
            .deps
            .write_membership(&space, &cmd.member_id, |existing| {
                transitions::decide_review(
                    &space,
                    cmd.member_id,
                    existing,
                    cmd.decision,
                    cmd.admin_comment.clone(),
                )
            })
            .await?;

        tracing::info!(
            space_id = %space.id,
            member_id = %cmd.member_id,
            actor_id = %cmd.actor_id,
            status = %transition.row().request_status,
            "Join request processed"
        );

        self.deps.after_commit(&space, cmd.actor_id, &transition).await;

        Ok(ProcessRequestResult {
            membership: transition.row().clone(),
        })
    }
}
