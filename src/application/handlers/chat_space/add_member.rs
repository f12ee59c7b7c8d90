//! AddMemberHandler - Command handler for admins adding members directly.

use crate::domain::chat_space::{transitions, AddDecision, ChatSpaceError, SpaceMember};
use crate::domain::foundation::{MemberId, SpaceId};

use super::shared::ChatSpaceDeps;

/// Command for an organizer or admin adding a member, bypassing review.
#[derive(Debug, Clone)]
pub struct AddMemberCommand {
    pub space_id: SpaceId,
    pub actor_id: MemberId,
    pub member_id: MemberId,
}

#[derive(Debug, Clone)]
pub struct AddMemberResult {
    pub membership: SpaceMember,
    /// False when the member was already approved and nothing changed.
    pub added: bool,
}

/// Handler for direct adds.
///
/// Idempotent: adding an approved member changes nothing locally. If that
/// member was never mirrored remotely, the remote add is scheduled again.
pub struct AddMemberHandler {
    deps: ChatSpaceDeps,
}

impl AddMemberHandler {
    pub fn new(deps: ChatSpaceDeps) -> Self {
        Self { deps }
    }

    pub async fn handle(&self, cmd: AddMemberCommand) -> Result<AddMemberResult, ChatSpaceError> {
        let space = self.deps.load_space(&cmd.space_id).await?;
        self.deps
            .guard
            .verify_creator_or_admin(&space, &cmd.actor_id)
            .await?;
        self.deps.require_member(&cmd.member_id).await?;

        let decision = self
            .deps
            .write_membership(&space, &cmd.member_id, |existing| {
                transitions::decide_add(&space, cmd.member_id, existing)
            })
            .await?;

        match decision {
            AddDecision::Apply(transition) => {
                tracing::info!(
                    space_id = %space.id,
                    member_id = %cmd.member_id,
                    actor_id = %cmd.actor_id,
                    "Member added to space"
                );
                self.deps.after_commit(&space, cmd.actor_id, &transition).await;
                Ok(AddMemberResult {
                    membership: transition.row().clone(),
                    added: true,
                })
            }
            AddDecision::AlreadyMember(row) => {
                tracing::debug!(
                    space_id = %space.id,
                    member_id = %cmd.member_id,
                    "Member already approved, add is a no-op"
                );
                if row.external_ref.is_none() {
                    self.deps.schedule_remote_add(&space, &row).await;
                }
                Ok(AddMemberResult {
                    membership: row,
                    added: false,
                })
            }
        }
    }
}
