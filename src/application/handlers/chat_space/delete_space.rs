//! DeleteSpaceHandler - Command handler for soft-deleting spaces.

use crate::application::SyncJob;
use crate::domain::chat_space::{ChatSpace, ChatSpaceError, SpaceStatus};
use crate::domain::foundation::{MemberId, SpaceId};

use super::shared::ChatSpaceDeps;

#[derive(Debug, Clone)]
pub struct DeleteSpaceCommand {
    pub space_id: SpaceId,
    pub actor_id: MemberId,
}

#[derive(Debug, Clone)]
pub struct DeleteSpaceResult {
    pub space: ChatSpace,
    /// False when the space was already deleted.
    pub deleted: bool,
}

/// Handler for deletion.
///
/// The record stays with status `Deleted`; memberships are kept for
/// history. The remote space is deleted after commit. Deleting twice
/// succeeds without touching the provider again.
pub struct DeleteSpaceHandler {
    deps: ChatSpaceDeps,
}

impl DeleteSpaceHandler {
    pub fn new(deps: ChatSpaceDeps) -> Self {
        Self { deps }
    }

    pub async fn handle(&self, cmd: DeleteSpaceCommand) -> Result<DeleteSpaceResult, ChatSpaceError> {
        let space = self.deps.load_space(&cmd.space_id).await?;
        self.deps
            .guard
            .verify_creator_or_admin(&space, &cmd.actor_id)
            .await?;

        let (deleted, changed) = self
            .deps
            .write_space_status(space, |current| {
                if current.is_deleted() {
                    return Ok(current);
                }
                current.with_status(SpaceStatus::Deleted)
            })
            .await?;
        if !changed {
            return Ok(DeleteSpaceResult {
                space: deleted,
                deleted: false,
            });
        }

        tracing::info!(space_id = %deleted.id, actor_id = %cmd.actor_id, "Chat space deleted");

        self.deps
            .dispatcher
            .dispatch(SyncJob::DeleteSpace {
                space_id: deleted.id,
                space_ref: deleted.external_ref.clone(),
            })
            .await;

        Ok(DeleteSpaceResult {
            space: deleted,
            deleted: true,
        })
    }
}
