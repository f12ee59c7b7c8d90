//! CreateSpaceHandler - Command handler for creating chat spaces.
//!
//! Creation is the one operation that talks to the provider before the
//! local commit: a space without its remote counterpart is useless, so a
//! provider failure aborts the whole operation.

use crate::application::MemberCountAggregator;
use crate::domain::chat_space::{
    ChatSpace, ChatSpaceError, CounterDelta, SpaceDetails, SpaceMember, SpaceVisibility,
};
use crate::domain::foundation::{DomainError, MemberId, SpaceId};
use crate::ports::{RemoteSpace, SyncCategory};

use super::shared::ChatSpaceDeps;

/// Command to create a chat space.
#[derive(Debug, Clone)]
pub struct CreateSpaceCommand {
    pub organizer_id: MemberId,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub guidelines: Option<String>,
    pub visibility: SpaceVisibility,
}

/// Result of successful space creation.
#[derive(Debug, Clone)]
pub struct CreateSpaceResult {
    pub space: ChatSpace,
    pub organizer: SpaceMember,
}

pub struct CreateSpaceHandler {
    deps: ChatSpaceDeps,
}

impl CreateSpaceHandler {
    pub fn new(deps: ChatSpaceDeps) -> Self {
        Self { deps }
    }

    pub async fn handle(&self, cmd: CreateSpaceCommand) -> Result<CreateSpaceResult, ChatSpaceError> {
        // 1. Validate before any side effect
        let details = SpaceDetails::new(
            cmd.title,
            cmd.description,
            cmd.tags,
            cmd.guidelines,
            cmd.visibility,
        )?;
        self.deps.require_member(&cmd.organizer_id).await?;

        // 2. Create the remote space; failure aborts creation
        let external_ref = self
            .deps
            .gateway
            .create_space(&RemoteSpace::from(&details))
            .await
            .map_err(|e| {
                tracing::warn!(organizer_id = %cmd.organizer_id, "Remote space creation failed: {}", e);
                ChatSpaceError::unable_to_complete(format!("Could not create remote space: {}", e))
            })?;

        // 3. Persist space, organizer row and counter in one transaction
        let space = ChatSpace::create(SpaceId::new(), details, cmd.organizer_id, external_ref);
        let organizer = SpaceMember::organizer(space.id, cmd.organizer_id);

        if let Err(e) = self.persist(&space, &organizer).await {
            self.compensate(&space).await;
            return Err(e.into());
        }

        tracing::info!(
            space_id = %space.id,
            organizer_id = %cmd.organizer_id,
            visibility = %space.visibility,
            "Chat space created"
        );

        // 4. Mirror the organizer's membership
        self.deps.schedule_remote_add(&space, &organizer).await;

        Ok(CreateSpaceResult {
            space: space.with_counter(CounterDelta::Increment),
            organizer,
        })
    }

    async fn persist(&self, space: &ChatSpace, organizer: &SpaceMember) -> Result<(), DomainError> {
        let mut tx = self.deps.store.begin().await?;
        tx.insert_space(space).await?;
        tx.insert_membership(organizer).await?;
        MemberCountAggregator::stage_delta(tx.as_mut(), &space.id, CounterDelta::Increment).await?;
        tx.commit().await
    }

    /// Best-effort removal of a remote space whose local record never landed.
    async fn compensate(&self, space: &ChatSpace) {
        if let Err(e) = self.deps.gateway.delete_space(&space.external_ref).await {
            self.deps
                .reporter
                .report(
                    &format!(
                        "Remote space {} is orphaned after failed local creation: {}",
                        space.external_ref.name, e
                    ),
                    SyncCategory::SpaceCreate,
                )
                .await;
        }
    }
}
