//! RequestToJoinHandler - Command handler for membership requests.

use crate::domain::chat_space::{transitions, ChatSpaceError, JoinIntent, MembershipTransition, SpaceMember};
use crate::domain::foundation::{MemberId, SpaceId};

use super::shared::ChatSpaceDeps;

/// Command for a member asking to join a space.
#[derive(Debug, Clone)]
pub struct RequestToJoinCommand {
    pub space_id: SpaceId,
    pub member_id: MemberId,
    pub comment: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RequestToJoinResult {
    pub membership: SpaceMember,
}

/// Handler for join requests.
///
/// On a private space the request waits for review. A previously
/// disapproved request is reopened with the new comment. On a public space
/// the request is approved straight away.
pub struct RequestToJoinHandler {
    deps: ChatSpaceDeps,
}

impl RequestToJoinHandler {
    pub fn new(deps: ChatSpaceDeps) -> Self {
        Self { deps }
    }

    pub async fn handle(
        &self,
        cmd: RequestToJoinCommand,
    ) -> Result<RequestToJoinResult, ChatSpaceError> {
        let space = self.deps.load_space(&cmd.space_id).await?;
        transitions::ensure_not_organizer(&space, cmd.member_id)?;

        let transition: MembershipTransition = self
            .deps
            .write_membership(&space, &cmd.member_id, |existing| {
                transitions::decide_join(
                    &space,
                    cmd.member_id,
                    existing,
                    JoinIntent::Request {
                        comment: cmd.comment.clone(),
                    },
                )
            })
            .await?;

        tracing::info!(
            space_id = %space.id,
            member_id = %cmd.member_id,
            status = %transition.row().request_status,
            "Join request recorded"
        );

        self.deps
            .after_commit(&space, cmd.member_id, &transition)
            .await;

        Ok(RequestToJoinResult {
            membership: transition.row().clone(),
        })
    }
}
