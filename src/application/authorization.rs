//! AuthorizationGuard - the single gate for administrative space mutations.
//!
//! A member may administer a space if they organized it or hold the
//! `Admin` role in it. Self-service join, request and leave are not gated.

use std::sync::Arc;

use crate::domain::chat_space::{ChatSpace, ChatSpaceError};
use crate::domain::foundation::MemberId;
use crate::ports::ChatSpaceStore;

#[derive(Clone)]
pub struct AuthorizationGuard {
    store: Arc<dyn ChatSpaceStore>,
}

impl AuthorizationGuard {
    pub fn new(store: Arc<dyn ChatSpaceStore>) -> Self {
        Self { store }
    }

    /// Fails with `NotAnAdmin` unless `actor` organizes or administers `space`.
    pub async fn verify_creator_or_admin(
        &self,
        space: &ChatSpace,
        actor: &MemberId,
    ) -> Result<(), ChatSpaceError> {
        if space.is_organizer(actor) {
            return Ok(());
        }

        let admins = self.store.find_admins_of(&space.id).await?;
        if admins.contains(actor) {
            return Ok(());
        }

        tracing::info!(
            space_id = %space.id,
            member_id = %actor,
            "Rejected administrative action by non-admin"
        );
        Err(ChatSpaceError::not_an_admin(space.id, *actor))
    }

    /// Read-path variant for annotating responses. Never fails: a store
    /// error is logged and answered with `false`.
    pub async fn is_creator_or_admin(&self, space: &ChatSpace, actor: &MemberId) -> bool {
        if space.is_organizer(actor) {
            return true;
        }
        match self.store.find_admins_of(&space.id).await {
            Ok(admins) => admins.contains(actor),
            Err(e) => {
                tracing::warn!(space_id = %space.id, "Admin lookup failed: {}", e);
                false
            }
        }
    }
}
