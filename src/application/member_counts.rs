//! MemberCountAggregator - keeps space counters in step with membership rows.
//!
//! A transition's row write and its counter delta always commit in the same
//! store transaction, so no reader can observe one without the other.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::chat_space::{CounterDelta, MembershipTransition, MembershipWrite};
use crate::domain::foundation::{DomainError, SpaceId};
use crate::ports::{ChatSpaceStore, StoreTransaction};

#[derive(Clone)]
pub struct MemberCountAggregator {
    store: Arc<dyn ChatSpaceStore>,
}

impl MemberCountAggregator {
    pub fn new(store: Arc<dyn ChatSpaceStore>) -> Self {
        Self { store }
    }

    /// Stage a transition's row write and counter delta in `tx`.
    pub async fn stage(
        tx: &mut dyn StoreTransaction,
        transition: &MembershipTransition,
    ) -> Result<(), DomainError> {
        match &transition.write {
            MembershipWrite::Insert(row) => tx.insert_membership(row).await?,
            MembershipWrite::Update { row, expected } => tx.update_membership(row, *expected).await?,
            MembershipWrite::Delete(row) => tx.delete_membership(row).await?,
        }
        Self::stage_delta(tx, &transition.row().space_id, transition.counter).await
    }

    /// Stage a bare counter delta in `tx`.
    pub async fn stage_delta(
        tx: &mut dyn StoreTransaction,
        space_id: &SpaceId,
        delta: CounterDelta,
    ) -> Result<(), DomainError> {
        match delta {
            CounterDelta::Increment => tx.increment_counter(space_id).await,
            CounterDelta::Decrement => tx.decrement_counter(space_id).await,
            CounterDelta::Unchanged => Ok(()),
        }
    }

    /// Commit a transition in its own transaction.
    ///
    /// # Errors
    ///
    /// - `UniqueViolation` if a concurrent writer inserted the same
    ///   `(space, member)` row first; nothing was written
    /// - `StaleWrite` or `MembershipNotFound` if the row changed or vanished
    ///   after the transition was decided; nothing was written
    pub async fn commit(&self, transition: &MembershipTransition) -> Result<(), DomainError> {
        let mut tx = self.store.begin().await?;
        Self::stage(tx.as_mut(), transition).await?;
        tx.commit().await
    }

    /// Pending request counts for a batch of spaces, zero-filled.
    pub async fn pending_counts(
        &self,
        space_ids: &[SpaceId],
    ) -> Result<HashMap<SpaceId, u64>, DomainError> {
        if space_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut counts = self.store.count_pending(space_ids).await?;
        for id in space_ids {
            counts.entry(*id).or_insert(0);
        }
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::InMemoryChatSpaceStore;
    use crate::domain::chat_space::{
        transitions, ChatSpace, ExternalSpaceRef, JoinIntent, SpaceDetails, SpaceMember,
        SpaceVisibility,
    };
    use crate::domain::foundation::MemberId;

    fn seeded(visibility: SpaceVisibility) -> (Arc<InMemoryChatSpaceStore>, ChatSpace) {
        let store = Arc::new(InMemoryChatSpaceStore::new());
        let space = ChatSpace::create(
            SpaceId::new(),
            SpaceDetails::new("Counted", "Desc", vec![], None, visibility).unwrap(),
            MemberId::new(),
            ExternalSpaceRef {
                id: "c".into(),
                name: "spaces/c".into(),
            },
        );
        store.seed_space(space.clone());
        (store, space)
    }

    #[tokio::test]
    async fn commit_writes_row_and_counter_together() {
        let (store, space) = seeded(SpaceVisibility::Public);
        let counts = MemberCountAggregator::new(store.clone());
        let t = transitions::decide_join(&space, MemberId::new(), None, JoinIntent::Join).unwrap();

        counts.commit(&t).await.unwrap();

        assert_eq!(store.space(&space.id).unwrap().total_members, 1);
        assert_eq!(store.membership_rows(&space.id).len(), 1);
    }

    #[tokio::test]
    async fn duplicate_insert_is_reported_and_nothing_changes() {
        let (store, space) = seeded(SpaceVisibility::Public);
        let counts = MemberCountAggregator::new(store.clone());
        let member = MemberId::new();
        store.seed_membership(SpaceMember::pending(space.id, member, None));

        let t = transitions::decide_join(&space, member, None, JoinIntent::Join).unwrap();
        let err = counts.commit(&t).await.unwrap_err();

        assert!(err.is_unique_violation());
        assert_eq!(store.space(&space.id).unwrap().total_members, 0);
    }

    #[tokio::test]
    async fn pending_counts_default_to_zero() {
        let (store, space) = seeded(SpaceVisibility::Private);
        let other = SpaceId::new();
        store.seed_membership(SpaceMember::pending(space.id, MemberId::new(), None));
        store.seed_membership(SpaceMember::pending(space.id, MemberId::new(), None));
        let counts = MemberCountAggregator::new(store);

        let result = counts.pending_counts(&[space.id, other]).await.unwrap();

        assert_eq!(result.get(&space.id), Some(&2));
        assert_eq!(result.get(&other), Some(&0));
    }
}
