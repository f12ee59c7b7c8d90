//! ReconcileMembersHandler - re-mirrors approved members the provider missed.
//!
//! Post-commit remote adds are fire-and-forget, so an outage leaves approved
//! rows without a remote handle. A reconciliation pass picks those rows up
//! and retries the add, storing the handle on success.

use std::collections::HashMap;

use crate::application::SyncJob;
use crate::domain::chat_space::{ChatSpace, ChatSpaceError};
use crate::domain::foundation::SpaceId;
use crate::ports::SyncCategory;

use super::shared::ChatSpaceDeps;

#[derive(Debug, Clone)]
pub struct ReconcileMembersCommand {
    /// Maximum rows to look at in one pass.
    pub limit: u32,
}

impl Default for ReconcileMembersCommand {
    fn default() -> Self {
        Self { limit: 500 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileMembersResult {
    pub attempted: usize,
    pub synced: usize,
    pub failed: usize,
    /// Rows whose space is gone or deleted, or whose member is unknown.
    pub skipped: usize,
}

pub struct ReconcileMembersHandler {
    deps: ChatSpaceDeps,
}

impl ReconcileMembersHandler {
    pub fn new(deps: ChatSpaceDeps) -> Self {
        Self { deps }
    }

    pub async fn handle(
        &self,
        cmd: ReconcileMembersCommand,
    ) -> Result<ReconcileMembersResult, ChatSpaceError> {
        let rows = self.deps.store.find_unsynced_memberships(cmd.limit).await?;
        let mut result = ReconcileMembersResult::default();
        let mut spaces: HashMap<SpaceId, Option<ChatSpace>> = HashMap::new();

        for row in rows {
            let space = match spaces.get(&row.space_id) {
                Some(cached) => cached.clone(),
                None => {
                    let found = self.deps.store.find_space(&row.space_id).await?;
                    spaces.insert(row.space_id, found.clone());
                    found
                }
            };
            let Some(space) = space.filter(|s| !s.is_deleted()) else {
                result.skipped += 1;
                continue;
            };

            let member = match self.deps.directory.find_member(&row.member_id).await? {
                Some(member) => member,
                None => {
                    self.deps
                        .reporter
                        .report(
                            &format!(
                                "Member {} of {} is not in the directory; cannot reconcile",
                                row.member_id, space.id
                            ),
                            SyncCategory::Reconcile,
                        )
                        .await;
                    result.skipped += 1;
                    continue;
                }
            };

            result.attempted += 1;
            let synced = self
                .deps
                .dispatcher
                .run(SyncJob::AddMember {
                    space_id: space.id,
                    space_ref: space.external_ref.clone(),
                    membership_id: row.id,
                    member,
                })
                .await;
            if synced {
                result.synced += 1;
            } else {
                result.failed += 1;
            }
        }

        tracing::info!(
            attempted = result.attempted,
            synced = result.synced,
            failed = result.failed,
            skipped = result.skipped,
            "Membership reconciliation pass finished"
        );

        Ok(result)
    }
}
