//! SyncDispatcher - converges the remote provider after local commits.
//!
//! Local state is authoritative. Once a mutation has committed, the matching
//! gateway call is handed to the dispatcher, which either runs it on a
//! detached task (production) or awaits it in place (tests, tooling). In both
//! modes a failure is reported to the [`SyncFailureReporter`] and never
//! reaches the caller.
//!
//! ## Tolerated outcomes
//!
//! | Job | Treated as success |
//! |-----|--------------------|
//! | `RemoveMember` | remote member already absent |
//! | `DeleteSpace` | remote space already absent |
//!
//! Membership handles are derived from the space and member when a row was
//! never mirrored, so a removal always reaches the provider. An add whose
//! row ended while the call was in flight is undone once its handle cannot
//! be stored.

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::chat_space::{ExternalSpaceRef, MemberIdentity, MembershipRef};
use crate::domain::foundation::{MemberId, SpaceId, SpaceMemberId};
use crate::ports::{
    ChatSpaceStore, RemoteSpace, SyncCategory, SyncError, SyncFailureReporter, SyncGateway,
};

/// How post-commit gateway work is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Spawn onto the tokio runtime and return immediately.
    #[default]
    Detached,
    /// Await the gateway call before returning.
    Inline,
}

/// One unit of remote convergence work.
#[derive(Debug, Clone)]
pub enum SyncJob {
    UpdateSpace {
        space_id: SpaceId,
        space_ref: ExternalSpaceRef,
        space: RemoteSpace,
    },
    DeleteSpace {
        space_id: SpaceId,
        space_ref: ExternalSpaceRef,
    },
    AddMember {
        space_id: SpaceId,
        space_ref: ExternalSpaceRef,
        membership_id: SpaceMemberId,
        member: MemberIdentity,
    },
    RemoveMember {
        space_id: SpaceId,
        space_ref: ExternalSpaceRef,
        member_id: MemberId,
        membership_ref: Option<MembershipRef>,
    },
}

impl SyncJob {
    fn category(&self) -> SyncCategory {
        match self {
            SyncJob::UpdateSpace { .. } => SyncCategory::SpaceUpdate,
            SyncJob::DeleteSpace { .. } => SyncCategory::SpaceDelete,
            SyncJob::AddMember { .. } => SyncCategory::MemberAdd,
            SyncJob::RemoveMember { .. } => SyncCategory::MemberRemove,
        }
    }
}

#[derive(Clone)]
pub struct SyncDispatcher {
    gateway: Arc<dyn SyncGateway>,
    store: Arc<dyn ChatSpaceStore>,
    reporter: Arc<dyn SyncFailureReporter>,
    mode: DispatchMode,
}

impl SyncDispatcher {
    pub fn new(
        gateway: Arc<dyn SyncGateway>,
        store: Arc<dyn ChatSpaceStore>,
        reporter: Arc<dyn SyncFailureReporter>,
        mode: DispatchMode,
    ) -> Self {
        Self {
            gateway,
            store,
            reporter,
            mode,
        }
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Schedule `job` according to the dispatch mode. Never fails.
    pub async fn dispatch(&self, job: SyncJob) {
        match self.mode {
            DispatchMode::Inline => {
                self.run(job).await;
            }
            DispatchMode::Detached => {
                let dispatcher = self.clone();
                tokio::spawn(async move {
                    dispatcher.run(job).await;
                });
            }
        }
    }

    /// Run `job` to completion, reporting any failure.
    ///
    /// Returns true if the remote side converged.
    pub async fn run(&self, job: SyncJob) -> bool {
        let category = job.category();
        match self.execute(job).await {
            Ok(()) => true,
            Err(message) => {
                self.reporter.report(&message, category).await;
                false
            }
        }
    }

    async fn execute(&self, job: SyncJob) -> Result<(), String> {
        match job {
            SyncJob::UpdateSpace {
                space_id,
                space_ref,
                space,
            } => self
                .gateway
                .update_space(&space_ref, &space)
                .await
                .map_err(|e| format!("Failed to update remote space for {}: {}", space_id, e)),

            SyncJob::DeleteSpace {
                space_id,
                space_ref,
            } => match self.gateway.delete_space(&space_ref).await {
                Ok(()) | Err(SyncError::NotFound(_)) => Ok(()),
                Err(e) => Err(format!(
                    "Failed to delete remote space {} for {}: {}",
                    space_ref.name, space_id, e
                )),
            },

            SyncJob::AddMember {
                space_id,
                space_ref,
                membership_id,
                member,
            } => {
                let membership_ref = self
                    .gateway
                    .add_member(&space_ref, &member)
                    .await
                    .map_err(|e| {
                        format!(
                            "Failed to add member {} to remote space of {}: {}",
                            member.id, space_id, e
                        )
                    })?;

                tracing::debug!(
                    space_id = %space_id,
                    member_id = %member.id,
                    membership_ref = membership_ref.as_str(),
                    "Remote member added"
                );

                match self
                    .store
                    .set_membership_external_ref(&membership_id, &membership_ref)
                    .await
                {
                    Ok(true) => {}
                    Ok(false) => {
                        tracing::info!(
                            space_id = %space_id,
                            member_id = %member.id,
                            "Membership ended during remote add, removing remote member"
                        );
                        self.remove_remote(&space_ref, &membership_ref)
                            .await
                            .map_err(|e| {
                                format!(
                                    "Member {} left {} during remote add and could not be removed remotely: {}",
                                    member.id, space_id, e
                                )
                            })?;
                    }
                    Err(e) => {
                        self.reporter
                            .report(
                                &format!(
                                    "Member {} was added remotely to {} but its handle {} was not stored: {}",
                                    member.id,
                                    space_id,
                                    membership_ref.as_str(),
                                    e
                                ),
                                SyncCategory::RefWriteBack,
                            )
                            .await;
                    }
                }
                Ok(())
            }

            SyncJob::RemoveMember {
                space_id,
                space_ref,
                member_id,
                membership_ref,
            } => {
                let membership_ref = membership_ref.unwrap_or_else(|| {
                    tracing::debug!(
                        space_id = %space_id,
                        member_id = %member_id,
                        "No stored membership handle, removing by derived handle"
                    );
                    MembershipRef::derive(&space_ref, &member_id)
                });
                self.remove_remote(&space_ref, &membership_ref)
                    .await
                    .map_err(|e| {
                        format!(
                            "Failed to remove member {} from remote space of {}: {}",
                            member_id, space_id, e
                        )
                    })
            }
        }
    }

    /// Removes a remote membership; an absent one counts as removed.
    async fn remove_remote(
        &self,
        space_ref: &ExternalSpaceRef,
        membership_ref: &MembershipRef,
    ) -> Result<(), SyncError> {
        match self.gateway.remove_member(space_ref, membership_ref).await {
            Ok(()) | Err(SyncError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
