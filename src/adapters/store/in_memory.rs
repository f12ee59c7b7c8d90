//! In-memory chat-space store for testing.
//!
//! Transactions stage their writes and apply them under a single lock on
//! commit, so the uniqueness constraint and the atomic counter behave like
//! the database under concurrent tasks.
//!
//! # Security Note
//!
//! This adapter is for **testing only** and should not be used in production.
//! It uses `.expect()` on lock operations which will panic if locks are poisoned.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::chat_space::{
    ChatSpace, CounterDelta, MembershipRef, MembershipState, RequestStatus, SpaceMember, SpaceStatus,
};
use crate::domain::foundation::{
    DomainError, ErrorCode, MemberId, SpaceId, SpaceMemberId, Timestamp,
};
use crate::ports::{ChatSpaceStore, StoreTransaction};

#[derive(Debug, Clone, Default)]
struct State {
    spaces: HashMap<SpaceId, ChatSpace>,
    memberships: HashMap<SpaceMemberId, SpaceMember>,
}

impl State {
    fn row_of(&self, space_id: &SpaceId, member_id: &MemberId) -> Option<&SpaceMember> {
        self.memberships
            .values()
            .find(|m| &m.space_id == space_id && &m.member_id == member_id)
    }

    fn apply(&mut self, op: Op) -> Result<(), DomainError> {
        match op {
            Op::InsertSpace(space) => {
                self.spaces.insert(space.id, space);
            }
            Op::UpdateSpace(space) => {
                let current = self
                    .spaces
                    .get_mut(&space.id)
                    .ok_or_else(|| space_not_found(&space.id))?;
                if current.is_deleted() {
                    return Err(DomainError::new(
                        ErrorCode::SpaceDeleted,
                        format!("Space {} has been deleted", space.id),
                    ));
                }
                *current = ChatSpace {
                    status: current.status,
                    total_members: current.total_members,
                    ..space
                };
            }
            Op::SetSpaceStatus {
                space_id,
                expected,
                status,
            } => {
                let current = self
                    .spaces
                    .get_mut(&space_id)
                    .ok_or_else(|| space_not_found(&space_id))?;
                if current.status != expected {
                    return Err(DomainError::stale_write(format!(
                        "Space {} is {}, expected {}",
                        space_id,
                        current.status.as_str(),
                        expected.as_str()
                    )));
                }
                current.status = status;
                current.updated_at = Timestamp::now();
            }
            Op::InsertMembership(row) => {
                if self.row_of(&row.space_id, &row.member_id).is_some() {
                    return Err(duplicate(&row));
                }
                self.memberships.insert(row.id, row);
            }
            Op::UpdateMembership(row, expected) => {
                let current = self
                    .memberships
                    .get_mut(&row.id)
                    .ok_or_else(|| membership_not_found(&row))?;
                if current.state() != expected {
                    return Err(stale(&row));
                }
                *current = SpaceMember {
                    external_ref: current.external_ref.take(),
                    ..row
                };
            }
            Op::DeleteMembership(row) => {
                let current = self
                    .memberships
                    .get(&row.id)
                    .ok_or_else(|| membership_not_found(&row))?;
                if current.state() != row.state() {
                    return Err(stale(&row));
                }
                self.memberships.remove(&row.id);
            }
            Op::Counter(space_id, delta) => {
                let space = self
                    .spaces
                    .get(&space_id)
                    .ok_or_else(|| space_not_found(&space_id))?;
                if space.total_members + delta.as_i64() < 0 {
                    tracing::error!(
                        space_id = %space_id,
                        "Member counter would go negative, counter has drifted from rows"
                    );
                    return Err(DomainError::database(format!(
                        "Member counter of space {} would go negative",
                        space_id
                    )));
                }
                let updated = space.clone().with_counter(delta);
                self.spaces.insert(space_id, updated);
            }
        }
        Ok(())
    }
}

/// A write applied as soon as the next transaction begins.
#[derive(Debug, Clone)]
enum Overwrite {
    Space(ChatSpace),
    Membership(SpaceMember),
}

#[derive(Debug, Clone)]
enum Op {
    InsertSpace(ChatSpace),
    UpdateSpace(ChatSpace),
    SetSpaceStatus {
        space_id: SpaceId,
        expected: SpaceStatus,
        status: SpaceStatus,
    },
    InsertMembership(SpaceMember),
    UpdateMembership(SpaceMember, MembershipState),
    DeleteMembership(SpaceMember),
    Counter(SpaceId, CounterDelta),
}

fn space_not_found(id: &SpaceId) -> DomainError {
    DomainError::new(ErrorCode::SpaceNotFound, format!("Space {} not found", id))
}

fn membership_not_found(row: &SpaceMember) -> DomainError {
    DomainError::new(
        ErrorCode::MembershipNotFound,
        format!("Membership {} not found", row.id),
    )
}

fn stale(row: &SpaceMember) -> DomainError {
    DomainError::stale_write(format!("Membership {} changed since it was read", row.id))
}

fn duplicate(row: &SpaceMember) -> DomainError {
    DomainError::unique_violation(format!(
        "Member {} already has a row in space {}",
        row.member_id, row.space_id
    ))
}

/// In-memory store for testing.
///
/// # Panics
///
/// Methods may panic if internal locks are poisoned. This is acceptable
/// for test code but this adapter should NOT be used in production.
#[derive(Default)]
pub struct InMemoryChatSpaceStore {
    state: Arc<Mutex<State>>,
    fail_reads: AtomicBool,
    fail_commits: Arc<AtomicBool>,
    on_next_begin: Mutex<Vec<Overwrite>>,
}

impl InMemoryChatSpaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::MutexGuard<'_, State>, DomainError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DomainError::database("Simulated read failure"));
        }
        Ok(self
            .state
            .lock()
            .expect("InMemoryChatSpaceStore: state lock poisoned"))
    }

    // === Test Helpers ===

    /// Inserts or replaces a space as is, counter included.
    pub fn seed_space(&self, space: ChatSpace) {
        self.state
            .lock()
            .expect("InMemoryChatSpaceStore: state lock poisoned")
            .spaces
            .insert(space.id, space);
    }

    /// Inserts or replaces a membership row without touching counters.
    pub fn seed_membership(&self, row: SpaceMember) {
        self.state
            .lock()
            .expect("InMemoryChatSpaceStore: state lock poisoned")
            .memberships
            .insert(row.id, row);
    }

    /// Replaces `space` when the next transaction begins, like a writer
    /// committing between a handler's read and its write.
    pub fn overwrite_space_on_next_begin(&self, space: ChatSpace) {
        self.on_next_begin
            .lock()
            .expect("InMemoryChatSpaceStore: overwrite lock poisoned")
            .push(Overwrite::Space(space));
    }

    /// Replaces the row with `row.id` when the next transaction begins.
    pub fn overwrite_membership_on_next_begin(&self, row: SpaceMember) {
        self.on_next_begin
            .lock()
            .expect("InMemoryChatSpaceStore: overwrite lock poisoned")
            .push(Overwrite::Membership(row));
    }

    /// Makes every read fail with a database error.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every commit fail with a database error.
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    pub fn space(&self, id: &SpaceId) -> Option<ChatSpace> {
        self.state
            .lock()
            .expect("InMemoryChatSpaceStore: state lock poisoned")
            .spaces
            .get(id)
            .cloned()
    }

    pub fn space_count(&self) -> usize {
        self.state
            .lock()
            .expect("InMemoryChatSpaceStore: state lock poisoned")
            .spaces
            .len()
    }

    /// Rows of a space, oldest first.
    pub fn membership_rows(&self, space_id: &SpaceId) -> Vec<SpaceMember> {
        let state = self
            .state
            .lock()
            .expect("InMemoryChatSpaceStore: state lock poisoned");
        let mut rows: Vec<SpaceMember> = state
            .memberships
            .values()
            .filter(|m| &m.space_id == space_id)
            .cloned()
            .collect();
        rows.sort_by_key(|m| *m.created_at.as_datetime());
        rows
    }
}

#[async_trait]
impl ChatSpaceStore for InMemoryChatSpaceStore {
    async fn find_space(&self, id: &SpaceId) -> Result<Option<ChatSpace>, DomainError> {
        Ok(self.read()?.spaces.get(id).cloned())
    }

    async fn find_membership(
        &self,
        space_id: &SpaceId,
        member_id: &MemberId,
    ) -> Result<Option<SpaceMember>, DomainError> {
        Ok(self.read()?.row_of(space_id, member_id).cloned())
    }

    async fn find_admins_of(&self, space_id: &SpaceId) -> Result<HashSet<MemberId>, DomainError> {
        Ok(self
            .read()?
            .memberships
            .values()
            .filter(|m| &m.space_id == space_id && m.is_admin())
            .map(|m| m.member_id)
            .collect())
    }

    async fn count_pending(
        &self,
        space_ids: &[SpaceId],
    ) -> Result<HashMap<SpaceId, u64>, DomainError> {
        let state = self.read()?;
        let mut counts = HashMap::new();
        for row in state.memberships.values() {
            if row.request_status == RequestStatus::Pending
                && !row.removed
                && space_ids.contains(&row.space_id)
            {
                *counts.entry(row.space_id).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn find_unsynced_memberships(&self, limit: u32) -> Result<Vec<SpaceMember>, DomainError> {
        let state = self.read()?;
        let mut rows: Vec<SpaceMember> = state
            .memberships
            .values()
            .filter(|m| m.is_counted() && m.external_ref.is_none())
            .cloned()
            .collect();
        rows.sort_by_key(|m| *m.created_at.as_datetime());
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn set_membership_external_ref(
        &self,
        id: &SpaceMemberId,
        external_ref: &MembershipRef,
    ) -> Result<bool, DomainError> {
        let mut state = self.read()?;
        match state.memberships.get_mut(id) {
            Some(row) if row.is_counted() => {
                row.external_ref = Some(external_ref.clone());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, DomainError> {
        let overwrites = std::mem::take(
            &mut *self
                .on_next_begin
                .lock()
                .expect("InMemoryChatSpaceStore: overwrite lock poisoned"),
        );
        if !overwrites.is_empty() {
            let mut state = self
                .state
                .lock()
                .expect("InMemoryChatSpaceStore: state lock poisoned");
            for overwrite in overwrites {
                match overwrite {
                    Overwrite::Space(space) => {
                        state.spaces.insert(space.id, space);
                    }
                    Overwrite::Membership(row) => {
                        state.memberships.insert(row.id, row);
                    }
                }
            }
        }

        Ok(Box::new(InMemoryTransaction {
            state: self.state.clone(),
            fail_commit: self.fail_commits.clone(),
            ops: Vec::new(),
        }))
    }
}

/// Staged writes applied all-or-nothing on commit.
struct InMemoryTransaction {
    state: Arc<Mutex<State>>,
    fail_commit: Arc<AtomicBool>,
    ops: Vec<Op>,
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    async fn insert_space(&mut self, space: &ChatSpace) -> Result<(), DomainError> {
        self.ops.push(Op::InsertSpace(space.clone()));
        Ok(())
    }

    async fn update_space(&mut self, space: &ChatSpace) -> Result<(), DomainError> {
        self.ops.push(Op::UpdateSpace(space.clone()));
        Ok(())
    }

    async fn insert_membership(&mut self, membership: &SpaceMember) -> Result<(), DomainError> {
        let exists = self
            .state
            .lock()
            .expect("InMemoryChatSpaceStore: state lock poisoned")
            .row_of(&membership.space_id, &membership.member_id)
            .is_some();
        if exists {
            return Err(duplicate(membership));
        }
        self.ops.push(Op::InsertMembership(membership.clone()));
        Ok(())
    }

    async fn set_space_status(
        &mut self,
        space_id: &SpaceId,
        expected: SpaceStatus,
        status: SpaceStatus,
    ) -> Result<(), DomainError> {
        self.ops.push(Op::SetSpaceStatus {
            space_id: *space_id,
            expected,
            status,
        });
        Ok(())
    }

    async fn update_membership(
        &mut self,
        membership: &SpaceMember,
        expected: MembershipState,
    ) -> Result<(), DomainError> {
        self.ops
            .push(Op::UpdateMembership(membership.clone(), expected));
        Ok(())
    }

    async fn delete_membership(&mut self, membership: &SpaceMember) -> Result<(), DomainError> {
        self.ops.push(Op::DeleteMembership(membership.clone()));
        Ok(())
    }

    async fn increment_counter(&mut self, space_id: &SpaceId) -> Result<(), DomainError> {
        self.ops.push(Op::Counter(*space_id, CounterDelta::Increment));
        Ok(())
    }

    async fn decrement_counter(&mut self, space_id: &SpaceId) -> Result<(), DomainError> {
        self.ops.push(Op::Counter(*space_id, CounterDelta::Decrement));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        let this = *self;
        if this.fail_commit.load(Ordering::SeqCst) {
            return Err(DomainError::database("Simulated commit failure"));
        }
        let mut state = this
            .state
            .lock()
            .expect("InMemoryChatSpaceStore: state lock poisoned");
        let mut next = state.clone();
        for op in this.ops {
            next.apply(op)?;
        }
        *state = next;
        Ok(())
    }
}
