//! SetSpaceStatusHandler - Command handler for enabling and disabling spaces.

use crate::domain::chat_space::{ChatSpace, ChatSpaceError, SpaceStatus};
use crate::domain::foundation::{MemberId, SpaceId};

use super::shared::ChatSpaceDeps;

/// Requested activation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    Enable,
    Disable,
}

impl StatusChange {
    fn target(&self) -> SpaceStatus {
        match self {
            StatusChange::Enable => SpaceStatus::Active,
            StatusChange::Disable => SpaceStatus::Inactive,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SetSpaceStatusCommand {
    pub space_id: SpaceId,
    pub actor_id: MemberId,
    pub change: StatusChange,
}

#[derive(Debug, Clone)]
pub struct SetSpaceStatusResult {
    pub space: ChatSpace,
    /// False when the space already had the requested status.
    pub changed: bool,
}

/// Handler for enable/disable. Local only; the provider has no notion of
/// an inactive space. Repeating a change is a no-op.
pub struct SetSpaceStatusHandler {
    deps: ChatSpaceDeps,
}

impl SetSpaceStatusHandler {
    pub fn new(deps: ChatSpaceDeps) -> Self {
        Self { deps }
    }

    pub async fn handle(
        &self,
        cmd: SetSpaceStatusCommand,
    ) -> Result<SetSpaceStatusResult, ChatSpaceError> {
        let space = self.deps.load_space(&cmd.space_id).await?;
        self.deps
            .guard
            .verify_creator_or_admin(&space, &cmd.actor_id)
            .await?;

        let target = cmd.change.target();
        let (updated, changed) = self
            .deps
            .write_space_status(space, |current| current.with_status(target))
            .await?;

        if changed {
            tracing::info!(
                space_id = %updated.id,
                actor_id = %cmd.actor_id,
                to = %updated.status,
                "Chat space status changed"
            );
        }

        Ok(SetSpaceStatusResult {
            space: updated,
            changed,
        })
    }
}
