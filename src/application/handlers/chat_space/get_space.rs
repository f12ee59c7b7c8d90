//! GetSpaceHandler - Query handler for a space as seen by a viewer.

use serde::Serialize;

use crate::domain::chat_space::{ChatSpace, ChatSpaceError};
use crate::domain::foundation::{MemberId, SpaceId};

use super::shared::ChatSpaceDeps;

#[derive(Debug, Clone)]
pub struct GetSpaceQuery {
    pub space_id: SpaceId,
    /// Anonymous viewers can never manage.
    pub viewer_id: Option<MemberId>,
}

/// Space annotated for one viewer.
#[derive(Debug, Clone, Serialize)]
pub struct SpaceView {
    pub space: ChatSpace,
    pub viewer_can_manage: bool,
    pub pending_requests: u64,
}

pub struct GetSpaceHandler {
    deps: ChatSpaceDeps,
}

impl GetSpaceHandler {
    pub fn new(deps: ChatSpaceDeps) -> Self {
        Self { deps }
    }

    pub async fn handle(&self, query: GetSpaceQuery) -> Result<SpaceView, ChatSpaceError> {
        let space = self.deps.load_space(&query.space_id).await?;

        let viewer_can_manage = match &query.viewer_id {
            Some(viewer) => self.deps.guard.is_creator_or_admin(&space, viewer).await,
            None => false,
        };

        let pending_requests = self
            .deps
            .counts
            .pending_counts(&[space.id])
            .await?
            .get(&space.id)
            .copied()
            .unwrap_or(0);

        Ok(SpaceView {
            space,
            viewer_can_manage,
            pending_requests,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::chat_space::shared::testing::Harness;
    use crate::domain::chat_space::{SpaceMember, SpaceVisibility};

    #[tokio::test]
    async fn organizer_view_can_manage_and_sees_pending() {
        let h = Harness::new();
        let space = h.space(SpaceVisibility::Private).await;
        h.store
            .seed_membership(SpaceMember::pending(space.id, h.member("A"), None));

        let view = GetSpaceHandler::new(h.deps.clone())
            .handle(GetSpaceQuery {
                space_id: space.id,
                viewer_id: Some(space.organizer_id),
            })
            .await
            .unwrap();

        assert!(view.viewer_can_manage);
        assert_eq!(view.pending_requests, 1);
        assert_eq!(view.space.total_members, 1);
    }

    #[tokio::test]
    async fn anonymous_view_cannot_manage() {
        let h = Harness::new();
        let space = h.space(SpaceVisibility::Public).await;

        let view = GetSpaceHandler::new(h.deps.clone())
            .handle(GetSpaceQuery {
                space_id: space.id,
                viewer_id: None,
            })
            .await
            .unwrap();

        assert!(!view.viewer_can_manage);
        assert_eq!(view.pending_requests, 0);
    }

    #[tokio::test]
    async fn missing_space_is_not_found() {
        let h = Harness::new();
        let id = SpaceId::new();

        let err = GetSpaceHandler::new(h.deps.clone())
            .handle(GetSpaceQuery {
                space_id: id,
                viewer_id: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err, ChatSpaceError::SpaceNotFound(id));
    }
}
