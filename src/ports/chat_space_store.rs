//! Chat-space store port.
//!
//! Defines the contract for persisting spaces and membership rows.
//!
//! # Design
//!
//! - **Explicit transactions**: every mutation goes through a
//!   [`StoreTransaction`] obtained from [`ChatSpaceStore::begin`]; the
//!   membership write and the counter update commit together or not at all
//! - **Unique constraint**: one membership row per `(space_id, member_id)`;
//!   a violating insert fails with `ErrorCode::UniqueViolation`
//! - **Conditional writes**: membership updates and deletes carry the state
//!   they were decided from and fail with `ErrorCode::StaleWrite` when the
//!   stored row has moved on; space updates never write `status`, which
//!   changes only through [`StoreTransaction::set_space_status`]
//! - **Atomic counter**: `increment_counter` / `decrement_counter` are
//!   applied by the storage layer, never read-modify-write by callers
//!
//! # Example
//!
//! ```ignore
//! let mut tx = store.begin().await?;
//! tx.insert_membership(&row).await?;
//! tx.increment_counter(&row.space_id).await?;
//! tx.commit().await?;
//! ```

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::domain::chat_space::{ChatSpace, MembershipRef, MembershipState, SpaceMember, SpaceStatus};
use crate::domain::foundation::{DomainError, MemberId, SpaceId, SpaceMemberId};

/// Read side of the store plus the transaction factory.
#[async_trait]
pub trait ChatSpaceStore: Send + Sync {
    /// Find a space by id. Deleted spaces are returned too.
    async fn find_space(&self, id: &SpaceId) -> Result<Option<ChatSpace>, DomainError>;

    /// Find the membership row of `member_id` in `space_id`.
    async fn find_membership(
        &self,
        space_id: &SpaceId,
        member_id: &MemberId,
    ) -> Result<Option<SpaceMember>, DomainError>;

    /// Member ids holding the `Admin` role (approved, not removed) in a space.
    async fn find_admins_of(&self, space_id: &SpaceId) -> Result<HashSet<MemberId>, DomainError>;

    /// Pending request counts for many spaces in one query.
    ///
    /// Spaces without pending requests may be absent from the map.
    async fn count_pending(
        &self,
        space_ids: &[SpaceId],
    ) -> Result<HashMap<SpaceId, u64>, DomainError>;

    /// Approved rows that have not yet been mirrored remotely.
    async fn find_unsynced_memberships(&self, limit: u32) -> Result<Vec<SpaceMember>, DomainError>;

    /// Record the remote handle of a membership after it was mirrored.
    ///
    /// Returns false, writing nothing, when the row was deleted or is no
    /// longer approved, so the caller can undo the remote add.
    async fn set_membership_external_ref(
        &self,
        id: &SpaceMemberId,
        external_ref: &MembershipRef,
    ) -> Result<bool, DomainError>;

    /// Start a transaction.
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, DomainError>;
}

/// One unit of work against the store.
///
/// Dropping a transaction without committing discards its writes.
#[async_trait]
pub trait StoreTransaction: Send {
    async fn insert_space(&mut self, space: &ChatSpace) -> Result<(), DomainError>;

    /// Persist descriptive fields. Never touches `status` or `total_members`.
    ///
    /// # Errors
    ///
    /// - `SpaceNotFound` if the space does not exist
    /// - `SpaceDeleted` if the space has been deleted
    async fn update_space(&mut self, space: &ChatSpace) -> Result<(), DomainError>;

    /// Move a space from `expected` to `status`.
    ///
    /// # Errors
    ///
    /// - `SpaceNotFound` if the space does not exist
    /// - `StaleWrite` if the stored status is no longer `expected`
    async fn set_space_status(
        &mut self,
        space_id: &SpaceId,
        expected: SpaceStatus,
        status: SpaceStatus,
    ) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `UniqueViolation` if the member already has a row in the space
    async fn insert_membership(&mut self, membership: &SpaceMember) -> Result<(), DomainError>;

    /// Replace a row that is still in the `expected` state.
    ///
    /// Leaves `external_ref` alone; see
    /// [`ChatSpaceStore::set_membership_external_ref`].
    ///
    /// # Errors
    ///
    /// - `MembershipNotFound` if the row no longer exists
    /// - `StaleWrite` if the stored row is no longer in `expected`
    async fn update_membership(
        &mut self,
        membership: &SpaceMember,
        expected: MembershipState,
    ) -> Result<(), DomainError>;

    /// Delete a row that is still in the state `membership` was read in.
    ///
    /// # Errors
    ///
    /// - `MembershipNotFound` if the row no longer exists
    /// - `StaleWrite` if the stored row changed since it was read
    async fn delete_membership(&mut self, membership: &SpaceMember) -> Result<(), DomainError>;

    async fn increment_counter(&mut self, space_id: &SpaceId) -> Result<(), DomainError>;

    async fn decrement_counter(&mut self, space_id: &SpaceId) -> Result<(), DomainError>;

    async fn commit(self: Box<Self>) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_space_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn ChatSpaceStore) {}
    }

    #[test]
    fn store_transaction_is_object_safe() {
        fn _accepts_box(_tx: Box<dyn StoreTransaction>) {}
    }
}
