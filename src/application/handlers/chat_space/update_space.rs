//! UpdateSpaceHandler - Command handler for editing space details.

use crate::application::SyncJob;
use crate::domain::chat_space::{ChatSpace, ChatSpaceError, SpaceDetails, SpaceVisibility};
use crate::domain::foundation::{DomainError, ErrorCode, MemberId, SpaceId};
use crate::ports::RemoteSpace;

use super::shared::ChatSpaceDeps;

/// Command replacing a space's descriptive fields.
#[derive(Debug, Clone)]
pub struct UpdateSpaceCommand {
    pub space_id: SpaceId,
    pub actor_id: MemberId,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub guidelines: Option<String>,
    pub visibility: SpaceVisibility,
}

#[derive(Debug, Clone)]
pub struct UpdateSpaceResult {
    pub space: ChatSpace,
}

pub struct UpdateSpaceHandler {
    deps: ChatSpaceDeps,
}

impl UpdateSpaceHandler {
    pub fn new(deps: ChatSpaceDeps) -> Self {
        Self { deps }
    }

    pub async fn handle(&self, cmd: UpdateSpaceCommand) -> Result<UpdateSpaceResult, ChatSpaceError> {
        let space = self.deps.load_space(&cmd.space_id).await?;
        self.deps
            .guard
            .verify_creator_or_admin(&space, &cmd.actor_id)
            .await?;
        space.ensure_not_deleted()?;

        let details = SpaceDetails::new(
            cmd.title,
            cmd.description,
            cmd.tags,
            cmd.guidelines,
            cmd.visibility,
        )?;
        let updated = space.with_details(details)?;
        self.persist(&updated).await?;

        tracing::info!(space_id = %updated.id, actor_id = %cmd.actor_id, "Chat space updated");

        self.deps
            .dispatcher
            .dispatch(SyncJob::UpdateSpace {
                space_id: updated.id,
                space_ref: updated.external_ref.clone(),
                space: RemoteSpace::from(&updated),
            })
            .await;

        Ok(UpdateSpaceResult { space: updated })
    }

    /// Writes the details; a space deleted since it was read stays deleted.
    async fn persist(&self, space: &ChatSpace) -> Result<(), ChatSpaceError> {
        let written: Result<(), DomainError> = async {
            let mut tx = self.deps.store.begin().await?;
            tx.update_space(space).await?;
            tx.commit().await
        }
        .await;
        match written {
            Err(e) if e.code == ErrorCode::SpaceDeleted => {
                Err(ChatSpaceError::AlreadyDeleted(space.id))
            }
            other => other.map_err(ChatSpaceError::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::chat_space::shared::testing::Harness;
    use crate::domain::chat_space::{ErrorKind, SpaceStatus};
    use crate::ports::{SyncCategory, SyncError};

    fn update(space: &ChatSpace, actor: MemberId, title: &str) -> UpdateSpaceCommand {
        UpdateSpaceCommand {
            space_id: space.id,
            actor_id: actor,
            title: title.to_string(),
            description: "Updated description".to_string(),
            tags: vec!["async".into()],
            guidelines: None,
            visibility: SpaceVisibility::Public,
        }
    }

    #[tokio::test]
    async fn update_persists_and_mirrors_details() {
        let h = Harness::new();
        let space = h.space(SpaceVisibility::Private).await;

        let result = UpdateSpaceHandler::new(h.deps.clone())
            .handle(update(&space, space.organizer_id, "Async Rust"))
            .await
            .unwrap();

        let stored = h.store.space(&space.id).unwrap();
        assert_eq!(stored.title, "Async Rust");
        assert_eq!(stored.visibility, SpaceVisibility::Public);
        assert_eq!(stored.total_members, 1);
        assert_eq!(result.space.tags, vec!["async".to_string()]);
        assert_eq!(
            h.gateway.remote_space(&space.external_ref).unwrap().title,
            "Async Rust"
        );
    }

    #[tokio::test]
    async fn remote_failure_keeps_local_update() {
        let h = Harness::new();
        let space = h.space(SpaceVisibility::Public).await;
        h.gateway.fail_next(SyncError::Rejected {
            status: 400,
            message: "bad".into(),
        });

        UpdateSpaceHandler::new(h.deps.clone())
            .handle(update(&space, space.organizer_id, "Renamed"))
            .await
            .unwrap();

        assert_eq!(h.store.space(&space.id).unwrap().title, "Renamed");
        assert_eq!(h.reporter.reports()[0].1, SyncCategory::SpaceUpdate);
    }

    #[tokio::test]
    async fn deleted_space_cannot_be_updated() {
        let h = Harness::new();
        let space = h.space(SpaceVisibility::Public).await;
        h.store
            .seed_space(space.clone().with_status(SpaceStatus::Deleted).unwrap());

        let err = UpdateSpaceHandler::new(h.deps.clone())
            .handle(update(&space, space.organizer_id, "Too late"))
            .await
            .unwrap_err();

        assert_eq!(err, ChatSpaceError::AlreadyDeleted(space.id));
    }

    #[tokio::test]
    async fn delete_racing_an_update_is_not_undone() {
        let h = Harness::new();
        let space = h.space(SpaceVisibility::Public).await;
        let deleted = space.clone().with_status(SpaceStatus::Deleted).unwrap();
        h.store.overwrite_space_on_next_begin(deleted);

        let err = UpdateSpaceHandler::new(h.deps.clone())
            .handle(update(&space, space.organizer_id, "Stale"))
            .await
            .unwrap_err();

        assert_eq!(err, ChatSpaceError::AlreadyDeleted(space.id));
        let stored = h.store.space(&space.id).unwrap();
        assert_eq!(stored.status, SpaceStatus::Deleted);
        assert_eq!(stored.title, space.title);
    }

    #[tokio::test]
    async fn update_keeps_status_set_concurrently() {
        let h = Harness::new();
        let space = h.space(SpaceVisibility::Public).await;
        let disabled = space.clone().with_status(SpaceStatus::Inactive).unwrap();
        h.store.overwrite_space_on_next_begin(disabled);

        UpdateSpaceHandler::new(h.deps.clone())
            .handle(update(&space, space.organizer_id, "Renamed"))
            .await
            .unwrap();

        let stored = h.store.space(&space.id).unwrap();
        assert_eq!(stored.title, "Renamed");
        assert_eq!(stored.status, SpaceStatus::Inactive);
    }

    #[tokio::test]
    async fn non_admin_cannot_update() {
        let h = Harness::new();
        let space = h.space(SpaceVisibility::Public).await;
        let outsider = h.member("Eve");

        let err = UpdateSpaceHandler::new(h.deps.clone())
            .handle(update(&space, outsider, "Hijacked"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert_eq!(h.store.space(&space.id).unwrap().title, space.title);
    }

    #[tokio::test]
    async fn empty_title_is_validation_error() {
        let h = Harness::new();
        let space = h.space(SpaceVisibility::Public).await;

        let err = UpdateSpaceHandler::new(h.deps.clone())
            .handle(update(&space, space.organizer_id, ""))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
