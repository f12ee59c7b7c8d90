//! Collaborators and steps shared by the chat-space handlers.

use std::sync::Arc;

use crate::application::{
    AuthorizationGuard, DispatchMode, MemberCountAggregator, SyncDispatcher, SyncJob,
};
use crate::domain::chat_space::{
    AddDecision, ChatSpace, ChatSpaceError, MemberIdentity, MembershipNotification,
    MembershipTransition, RemoteEffect, SpaceMember, SpaceStatus,
};
use crate::domain::foundation::{DomainError, ErrorCode, MemberId, SpaceId};
use crate::ports::{
    ChatSpaceStore, MemberDirectory, MembershipNotifier, SyncCategory, SyncFailureReporter,
    SyncGateway,
};

/// Attempts at a conditional write before a conflict is surfaced.
const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Ports and application services every chat-space handler needs.
#[derive(Clone)]
pub struct ChatSpaceDeps {
    pub store: Arc<dyn ChatSpaceStore>,
    pub directory: Arc<dyn MemberDirectory>,
    pub gateway: Arc<dyn SyncGateway>,
    pub notifier: Arc<dyn MembershipNotifier>,
    pub reporter: Arc<dyn SyncFailureReporter>,
    pub dispatcher: SyncDispatcher,
    pub guard: AuthorizationGuard,
    pub counts: MemberCountAggregator,
}

impl ChatSpaceDeps {
    pub fn new(
        store: Arc<dyn ChatSpaceStore>,
        directory: Arc<dyn MemberDirectory>,
        gateway: Arc<dyn SyncGateway>,
        notifier: Arc<dyn MembershipNotifier>,
        reporter: Arc<dyn SyncFailureReporter>,
        mode: DispatchMode,
    ) -> Self {
        let dispatcher =
            SyncDispatcher::new(gateway.clone(), store.clone(), reporter.clone(), mode);
        Self {
            guard: AuthorizationGuard::new(store.clone()),
            counts: MemberCountAggregator::new(store.clone()),
            store,
            directory,
            gateway,
            notifier,
            reporter,
            dispatcher,
        }
    }

    pub(crate) async fn load_space(&self, id: &SpaceId) -> Result<ChatSpace, ChatSpaceError> {
        self.store
            .find_space(id)
            .await?
            .ok_or(ChatSpaceError::SpaceNotFound(*id))
    }

    pub(crate) async fn require_member(
        &self,
        id: &MemberId,
    ) -> Result<MemberIdentity, ChatSpaceError> {
        self.directory
            .find_member(id)
            .await?
            .ok_or(ChatSpaceError::MemberNotFound(*id))
    }

    /// Reads the member's row, decides, and commits the decided write.
    ///
    /// A conflicting concurrent writer (duplicate insert, or the row changed
    /// or vanished since it was read) causes the row to be read again and
    /// the decision re-run.
    pub(crate) async fn write_membership<D, F>(
        &self,
        space: &ChatSpace,
        member_id: &MemberId,
        decide: F,
    ) -> Result<D, ChatSpaceError>
    where
        D: MembershipDecision,
        F: Fn(Option<&SpaceMember>) -> Result<D, ChatSpaceError> + Send + Sync,
    {
        let mut attempt = 1;
        loop {
            let existing = self.store.find_membership(&space.id, member_id).await?;
            let decision = decide(existing.as_ref())?;
            let committed = match decision.transition() {
                Some(transition) => self.counts.commit(transition).await,
                None => return Ok(decision),
            };

            match committed {
                Ok(()) => return Ok(decision),
                Err(e) if is_write_conflict(&e) && attempt < MAX_WRITE_ATTEMPTS => {
                    tracing::debug!(
                        space_id = %space.id,
                        member_id = %member_id,
                        attempt,
                        "Membership write conflicted, re-reading row"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Moves a space to the status `decide` picks for it.
    ///
    /// The write only applies while the stored status is the one the
    /// decision saw; otherwise the space is read again and the decision
    /// re-run. Returns the space and whether its status changed.
    pub(crate) async fn write_space_status<F>(
        &self,
        space: ChatSpace,
        decide: F,
    ) -> Result<(ChatSpace, bool), ChatSpaceError>
    where
        F: Fn(ChatSpace) -> Result<ChatSpace, ChatSpaceError> + Send + Sync,
    {
        let mut current = space;
        let mut attempt = 1;
        loop {
            let id = current.id;
            let previous = current.status;
            let updated = decide(current)?;
            if updated.status == previous {
                return Ok((updated, false));
            }

            match self.commit_space_status(&id, previous, updated.status).await {
                Ok(()) => return Ok((updated, true)),
                Err(e) if e.code == ErrorCode::StaleWrite && attempt < MAX_WRITE_ATTEMPTS => {
                    tracing::debug!(
                        space_id = %id,
                        attempt,
                        "Space status changed concurrently, re-reading space"
                    );
                    attempt += 1;
                    current = self.load_space(&id).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn commit_space_status(
        &self,
        id: &SpaceId,
        expected: SpaceStatus,
        status: SpaceStatus,
    ) -> Result<(), DomainError> {
        let mut tx = self.store.begin().await?;
        tx.set_space_status(id, expected, status).await?;
        tx.commit().await
    }

    /// Post-commit work: converge the provider, then notify.
    ///
    /// Never fails; every problem is reported or logged.
    pub(crate) async fn after_commit(
        &self,
        space: &ChatSpace,
        actor: MemberId,
        transition: &MembershipTransition,
    ) {
        let row = transition.row();
        match transition.remote_effect() {
            RemoteEffect::AddMember => self.schedule_remote_add(space, row).await,
            RemoteEffect::RemoveMember => {
                self.dispatcher
                    .dispatch(SyncJob::RemoveMember {
                        space_id: space.id,
                        space_ref: space.external_ref.clone(),
                        member_id: row.member_id,
                        membership_ref: row.external_ref.clone(),
                    })
                    .await
            }
            RemoteEffect::None => {}
        }

        let notification = MembershipNotification {
            kind: transition.notification,
            actor,
            target: row.member_id,
            space_id: space.id,
        };
        if let Err(e) = self.notifier.emit(&notification).await {
            tracing::warn!(
                space_id = %space.id,
                kind = %notification.kind,
                "Failed to emit membership notification: {}",
                e
            );
        }
    }

    /// Hands a remote add for `row` to the dispatcher.
    pub(crate) async fn schedule_remote_add(&self, space: &ChatSpace, row: &SpaceMember) {
        let member = match self.directory.find_member(&row.member_id).await {
            Ok(Some(member)) => member,
            Ok(None) => {
                self.reporter
                    .report(
                        &format!(
                            "Member {} of {} is not in the directory; remote add skipped",
                            row.member_id, space.id
                        ),
                        SyncCategory::MemberAdd,
                    )
                    .await;
                return;
            }
            Err(e) => {
                self.reporter
                    .report(
                        &format!(
                            "Directory lookup for {} failed; remote add skipped: {}",
                            row.member_id, e
                        ),
                        SyncCategory::MemberAdd,
                    )
                    .await;
                return;
            }
        };

        self.dispatcher
            .dispatch(SyncJob::AddMember {
                space_id: space.id,
                space_ref: space.external_ref.clone(),
                membership_id: row.id,
                member,
            })
            .await;
    }
}

/// A decision that may carry a transition to commit.
pub(crate) trait MembershipDecision: Send {
    fn transition(&self) -> Option<&MembershipTransition>;
}

impl MembershipDecision for MembershipTransition {
    fn transition(&self) -> Option<&MembershipTransition> {
        Some(self)
    }
}

impl MembershipDecision for AddDecision {
    fn transition(&self) -> Option<&MembershipTransition> {
        match self {
            AddDecision::Apply(transition) => Some(transition),
            AddDecision::AlreadyMember(_) => None,
        }
    }
}

fn is_write_conflict(err: &DomainError) -> bool {
    matches!(
        err.code,
        ErrorCode::UniqueViolation | ErrorCode::MembershipNotFound | ErrorCode::StaleWrite
    )
}

#[cfg(test)]
pub(crate) mod testing {
    //! Wiring of in-memory adapters for handler tests.

    use super::*;
    use crate::adapters::directory::StaticMemberDirectory;
    use crate::adapters::gateway::InMemorySyncGateway;
    use crate::adapters::reporting::{RecordingNotifier, RecordingReporter};
    use crate::adapters::store::InMemoryChatSpaceStore;
    use crate::domain::chat_space::{CounterDelta, SpaceDetails, SpaceVisibility};
    use crate::ports::RemoteSpace;

    pub struct Harness {
        pub store: Arc<InMemoryChatSpaceStore>,
        pub gateway: Arc<InMemorySyncGateway>,
        pub reporter: Arc<RecordingReporter>,
        pub notifier: Arc<RecordingNotifier>,
        pub directory: Arc<StaticMemberDirectory>,
        pub deps: ChatSpaceDeps,
    }

    impl Harness {
        pub fn new() -> Self {
            let store = Arc::new(InMemoryChatSpaceStore::new());
            let gateway = Arc::new(InMemorySyncGateway::new());
            let reporter = Arc::new(RecordingReporter::new());
            let notifier = Arc::new(RecordingNotifier::new());
            let directory = Arc::new(StaticMemberDirectory::new());
            let deps = ChatSpaceDeps::new(
                store.clone(),
                directory.clone(),
                gateway.clone(),
                notifier.clone(),
                reporter.clone(),
                DispatchMode::Inline,
            );
            Self {
                store,
                gateway,
                reporter,
                notifier,
                directory,
                deps,
            }
        }

        /// Registers a new member in the directory.
        pub fn member(&self, name: &str) -> MemberId {
            let id = MemberId::new();
            self.directory.insert(MemberIdentity {
                id,
                display_name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
            });
            id
        }

        /// Seeds an active space with its organizer row, mirrored remotely.
        pub async fn space(&self, visibility: SpaceVisibility) -> ChatSpace {
            let organizer = self.member("Organizer");
            let details =
                SpaceDetails::new("Rustaceans", "Systems talk", vec![], None, visibility).unwrap();
            let external_ref = self
                .gateway
                .create_space(&RemoteSpace::from(&details))
                .await
                .unwrap();
            let space = ChatSpace::create(SpaceId::new(), details, organizer, external_ref)
                .with_counter(CounterDelta::Increment);
            self.store.seed_space(space.clone());
            self.store
                .seed_membership(SpaceMember::organizer(space.id, organizer));
            space
        }

        pub fn row(&self, space: &ChatSpace, member: &MemberId) -> Option<SpaceMember> {
            self.store
                .membership_rows(&space.id)
                .into_iter()
                .find(|row| &row.member_id == member)
        }

        pub fn total_members(&self, space: &ChatSpace) -> i64 {
            self.store.space(&space.id).unwrap().total_members
        }
    }
}
