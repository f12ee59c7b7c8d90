//! Out-of-band reporting of swallowed sync failures.

use async_trait::async_trait;
use std::fmt;

/// Which post-commit operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncCategory {
    SpaceCreate,
    SpaceUpdate,
    SpaceDelete,
    MemberAdd,
    MemberRemove,
    /// Storing a remote membership handle locally failed.
    RefWriteBack,
    Reconcile,
}

impl SyncCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncCategory::SpaceCreate => "space_create",
            SyncCategory::SpaceUpdate => "space_update",
            SyncCategory::SpaceDelete => "space_delete",
            SyncCategory::MemberAdd => "member_add",
            SyncCategory::MemberRemove => "member_remove",
            SyncCategory::RefWriteBack => "ref_write_back",
            SyncCategory::Reconcile => "reconcile",
        }
    }
}

impl fmt::Display for SyncCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receives diagnostics for gateway failures that were not surfaced to
/// the caller. Fire-and-forget: implementations must not fail.
#[async_trait]
pub trait SyncFailureReporter: Send + Sync {
    async fn report(&self, message: &str, category: SyncCategory);
}
