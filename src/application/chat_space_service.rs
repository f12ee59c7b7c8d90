//! ChatSpaceService - the entry point for chat-space use cases.
//!
//! Composes the handlers over one set of ports. Each method maps to exactly
//! one handler; the service adds request tracing and nothing else.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::chat_space::{
    ChatSpace, ChatSpaceError, ReviewDecision, RoleChange, SpaceMember, SpaceVisibility,
};
use crate::domain::foundation::{MemberId, SpaceId};
use crate::ports::{
    ChatSpaceStore, MemberDirectory, MembershipNotifier, SyncFailureReporter, SyncGateway,
};

use super::handlers::{
    AddMemberCommand, AddMemberHandler, AddMemberResult, ChangeRoleCommand, ChangeRoleHandler,
    ChatSpaceDeps, CreateSpaceCommand, CreateSpaceHandler, CreateSpaceResult, DeleteSpaceCommand,
    DeleteSpaceHandler, DeleteSpaceResult, GetSpaceHandler, GetSpaceQuery, JoinSpaceCommand,
    JoinSpaceHandler, LeaveSpaceCommand, LeaveSpaceHandler, ProcessRequestCommand,
    ProcessRequestHandler, ReconcileMembersCommand, ReconcileMembersHandler,
    ReconcileMembersResult, RemoveMemberCommand, RemoveMemberHandler, RequestToJoinCommand,
    RequestToJoinHandler, SetSpaceStatusCommand, SetSpaceStatusHandler, SetSpaceStatusResult,
    SpaceView, StatusChange, UpdateSpaceCommand, UpdateSpaceHandler,
};
use super::DispatchMode;

/// Fields shared by space creation and update.
#[derive(Debug, Clone)]
pub struct SpaceInput {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub guidelines: Option<String>,
    pub visibility: SpaceVisibility,
}

#[derive(Clone)]
pub struct ChatSpaceService {
    deps: ChatSpaceDeps,
}

impl ChatSpaceService {
    pub fn new(
        store: Arc<dyn ChatSpaceStore>,
        directory: Arc<dyn MemberDirectory>,
        gateway: Arc<dyn SyncGateway>,
        notifier: Arc<dyn MembershipNotifier>,
        reporter: Arc<dyn SyncFailureReporter>,
        mode: DispatchMode,
    ) -> Self {
        Self {
            deps: ChatSpaceDeps::new(store, directory, gateway, notifier, reporter, mode),
        }
    }

    pub fn from_deps(deps: ChatSpaceDeps) -> Self {
        Self { deps }
    }

    #[tracing::instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_space(
        &self,
        organizer_id: MemberId,
        input: SpaceInput,
    ) -> Result<CreateSpaceResult, ChatSpaceError> {
        CreateSpaceHandler::new(self.deps.clone())
            .handle(CreateSpaceCommand {
                organizer_id,
                title: input.title,
                description: input.description,
                tags: input.tags,
                guidelines: input.guidelines,
                visibility: input.visibility,
            })
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn join(
        &self,
        space_id: SpaceId,
        member_id: MemberId,
    ) -> Result<SpaceMember, ChatSpaceError> {
        JoinSpaceHandler::new(self.deps.clone())
            .handle(JoinSpaceCommand {
                space_id,
                member_id,
            })
            .await
            .map(|r| r.membership)
    }

    #[tracing::instrument(skip(self, comment))]
    pub async fn request_to_join(
        &self,
        space_id: SpaceId,
        member_id: MemberId,
        comment: Option<String>,
    ) -> Result<SpaceMember, ChatSpaceError> {
        RequestToJoinHandler::new(self.deps.clone())
            .handle(RequestToJoinCommand {
                space_id,
                member_id,
                comment,
            })
            .await
            .map(|r| r.membership)
    }

    #[tracing::instrument(skip(self, admin_comment))]
    pub async fn process_request_to_join(
        &self,
        space_id: SpaceId,
        actor_id: MemberId,
        member_id: MemberId,
        decision: ReviewDecision,
        admin_comment: Option<String>,
    ) -> Result<SpaceMember, ChatSpaceError> {
        ProcessRequestHandler::new(self.deps.clone())
            .handle(ProcessRequestCommand {
                space_id,
                actor_id,
                member_id,
                decision,
                admin_comment,
            })
            .await
            .map(|r| r.membership)
    }

    #[tracing::instrument(skip(self))]
    pub async fn add_member(
        &self,
        space_id: SpaceId,
        actor_id: MemberId,
        member_id: MemberId,
    ) -> Result<AddMemberResult, ChatSpaceError> {
        AddMemberHandler::new(self.deps.clone())
            .handle(AddMemberCommand {
                space_id,
                actor_id,
                member_id,
            })
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove_member(
        &self,
        space_id: SpaceId,
        actor_id: MemberId,
        member_id: MemberId,
    ) -> Result<SpaceMember, ChatSpaceError> {
        RemoveMemberHandler::new(self.deps.clone())
            .handle(RemoveMemberCommand {
                space_id,
                actor_id,
                member_id,
            })
            .await
            .map(|r| r.removed)
    }

    #[tracing::instrument(skip(self))]
    pub async fn leave(
        &self,
        space_id: SpaceId,
        member_id: MemberId,
    ) -> Result<SpaceMember, ChatSpaceError> {
        LeaveSpaceHandler::new(self.deps.clone())
            .handle(LeaveSpaceCommand {
                space_id,
                member_id,
            })
            .await
            .map(|r| r.removed)
    }

    pub async fn upgrade_role(
        &self,
        space_id: SpaceId,
        actor_id: MemberId,
        member_id: MemberId,
    ) -> Result<SpaceMember, ChatSpaceError> {
        self.change_role(space_id, actor_id, member_id, RoleChange::Upgrade)
            .await
    }

    pub async fn downgrade_role(
        &self,
        space_id: SpaceId,
        actor_id: MemberId,
        member_id: MemberId,
    ) -> Result<SpaceMember, ChatSpaceError> {
        self.change_role(space_id, actor_id, member_id, RoleChange::Downgrade)
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn change_role(
        &self,
        space_id: SpaceId,
        actor_id: MemberId,
        member_id: MemberId,
        change: RoleChange,
    ) -> Result<SpaceMember, ChatSpaceError> {
        ChangeRoleHandler::new(self.deps.clone())
            .handle(ChangeRoleCommand {
                space_id,
                actor_id,
                member_id,
                change,
            })
            .await
            .map(|r| r.membership)
    }

    #[tracing::instrument(skip(self, input), fields(title = %input.title))]
    pub async fn update_space(
        &self,
        space_id: SpaceId,
        actor_id: MemberId,
        input: SpaceInput,
    ) -> Result<ChatSpace, ChatSpaceError> {
        UpdateSpaceHandler::new(self.deps.clone())
            .handle(UpdateSpaceCommand {
                space_id,
                actor_id,
                title: input.title,
                description: input.description,
                tags: input.tags,
                guidelines: input.guidelines,
                visibility: input.visibility,
            })
            .await
            .map(|r| r.space)
    }

    pub async fn enable_space(
        &self,
        space_id: SpaceId,
        actor_id: MemberId,
    ) -> Result<SetSpaceStatusResult, ChatSpaceError> {
        self.set_status(space_id, actor_id, StatusChange::Enable).await
    }

    pub async fn disable_space(
        &self,
        space_id: SpaceId,
        actor_id: MemberId,
    ) -> Result<SetSpaceStatusResult, ChatSpaceError> {
        self.set_status(space_id, actor_id, StatusChange::Disable).await
    }

    #[tracing::instrument(skip(self))]
    async fn set_status(
        &self,
        space_id: SpaceId,
        actor_id: MemberId,
        change: StatusChange,
    ) -> Result<SetSpaceStatusResult, ChatSpaceError> {
        SetSpaceStatusHandler::new(self.deps.clone())
            .handle(SetSpaceStatusCommand {
                space_id,
                actor_id,
                change,
            })
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_space(
        &self,
        space_id: SpaceId,
        actor_id: MemberId,
    ) -> Result<DeleteSpaceResult, ChatSpaceError> {
        DeleteSpaceHandler::new(self.deps.clone())
            .handle(DeleteSpaceCommand { space_id, actor_id })
            .await
    }

    pub async fn get_space(
        &self,
        space_id: SpaceId,
        viewer_id: Option<MemberId>,
    ) -> Result<SpaceView, ChatSpaceError> {
        GetSpaceHandler::new(self.deps.clone())
            .handle(GetSpaceQuery {
                space_id,
                viewer_id,
            })
            .await
    }

    /// Pending request counts for a page of spaces, zero-filled.
    pub async fn pending_counts(
        &self,
        space_ids: &[SpaceId],
    ) -> Result<HashMap<SpaceId, u64>, ChatSpaceError> {
        Ok(self.deps.counts.pending_counts(space_ids).await?)
    }

    /// Non-throwing admin check for response annotation.
    ///
    /// Unknown spaces and lookup failures answer `false`.
    pub async fn is_creator_or_admin(&self, space_id: SpaceId, member_id: MemberId) -> bool {
        match self.deps.store.find_space(&space_id).await {
            Ok(Some(space)) => self.deps.guard.is_creator_or_admin(&space, &member_id).await,
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(space_id = %space_id, "Space lookup failed: {}", e);
                false
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn reconcile(&self, limit: u32) -> Result<ReconcileMembersResult, ChatSpaceError> {
        ReconcileMembersHandler::new(self.deps.clone())
            .handle(ReconcileMembersCommand { limit })
            .await
    }
}
