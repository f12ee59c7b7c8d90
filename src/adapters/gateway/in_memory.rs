//! In-memory sync gateway for tests and local runs.
//!
//! # Security Note
//!
//! Holds remote state in process memory. **Use for testing only.**

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::chat_space::{ExternalSpaceRef, MemberIdentity, MembershipRef};
use crate::domain::foundation::MemberId;
use crate::ports::{RemoteSpace, SyncError, SyncGateway};

#[derive(Default)]
struct RemoteState {
    spaces: HashMap<String, RemoteSpace>,
    /// Membership handle to (space name, member).
    members: HashMap<String, (String, MemberId)>,
    fail_next: Option<SyncError>,
    /// Call number that fails, and how.
    fail_at: Option<(usize, SyncError)>,
    calls: usize,
}

/// Mimics the provider: idempotent adds, `NotFound` for absent resources.
#[derive(Default)]
pub struct InMemorySyncGateway {
    state: Mutex<RemoteState>,
}

impl InMemorySyncGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next call fail with `error`. Later calls succeed.
    pub fn fail_next(&self, error: SyncError) {
        self.lock().fail_next = Some(error);
    }

    /// Lets `successes` calls through, then fails the one after with `error`.
    pub fn fail_after(&self, successes: usize, error: SyncError) {
        let mut state = self.lock();
        let at = state.calls + successes + 1;
        state.fail_at = Some((at, error));
    }

    /// Registers a remote member directly, bypassing the call counter.
    pub fn seed_member(&self, space_ref: &ExternalSpaceRef, member_id: MemberId) -> MembershipRef {
        let handle = MembershipRef::derive(space_ref, &member_id);
        self.lock()
            .members
            .insert(handle.as_str().to_string(), (space_ref.name.clone(), member_id));
        handle
    }

    pub fn member_count(&self, space_ref: &ExternalSpaceRef) -> usize {
        self.lock()
            .members
            .values()
            .filter(|(space, _)| space == &space_ref.name)
            .count()
    }

    pub fn has_member(&self, space_ref: &ExternalSpaceRef, member_id: &MemberId) -> bool {
        self.lock()
            .members
            .contains_key(MembershipRef::derive(space_ref, member_id).as_str())
    }

    pub fn space_count(&self) -> usize {
        self.lock().spaces.len()
    }

    pub fn remote_space(&self, space_ref: &ExternalSpaceRef) -> Option<RemoteSpace> {
        self.lock().spaces.get(&space_ref.name).cloned()
    }

    /// Number of gateway calls made so far, failed ones included.
    pub fn call_count(&self) -> usize {
        self.lock().calls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RemoteState> {
        self.state.lock().expect("InMemorySyncGateway: lock poisoned")
    }

    /// Counts the call and takes any injected failure.
    fn begin(&self) -> Result<std::sync::MutexGuard<'_, RemoteState>, SyncError> {
        let mut state = self.lock();
        state.calls += 1;
        if let Some(error) = state.fail_next.take() {
            return Err(error);
        }
        if matches!(&state.fail_at, Some((at, _)) if *at == state.calls) {
            if let Some((_, error)) = state.fail_at.take() {
                return Err(error);
            }
        }
        Ok(state)
    }
}

#[async_trait]
impl SyncGateway for InMemorySyncGateway {
    async fn create_space(&self, space: &RemoteSpace) -> Result<ExternalSpaceRef, SyncError> {
        let mut state = self.begin()?;
        let id = Uuid::new_v4().simple().to_string();
        let name = format!("spaces/{}", id);
        state.spaces.insert(name.clone(), space.clone());
        Ok(ExternalSpaceRef { id, name })
    }

    async fn update_space(
        &self,
        space_ref: &ExternalSpaceRef,
        space: &RemoteSpace,
    ) -> Result<(), SyncError> {
        let mut state = self.begin()?;
        match state.spaces.get_mut(&space_ref.name) {
            Some(existing) => {
                *existing = space.clone();
                Ok(())
            }
            None => Err(SyncError::NotFound(space_ref.name.clone())),
        }
    }

    async fn delete_space(&self, space_ref: &ExternalSpaceRef) -> Result<(), SyncError> {
        let mut state = self.begin()?;
        if state.spaces.remove(&space_ref.name).is_none() {
            return Err(SyncError::NotFound(space_ref.name.clone()));
        }
        state.members.retain(|_, (space, _)| space != &space_ref.name);
        Ok(())
    }

    async fn add_member(
        &self,
        space_ref: &ExternalSpaceRef,
        member: &MemberIdentity,
    ) -> Result<MembershipRef, SyncError> {
        let mut state = self.begin()?;
        if !state.spaces.contains_key(&space_ref.name) {
            return Err(SyncError::NotFound(space_ref.name.clone()));
        }
        let handle = MembershipRef::derive(space_ref, &member.id);
        state
            .members
            .insert(handle.as_str().to_string(), (space_ref.name.clone(), member.id));
        Ok(handle)
    }

    async fn remove_member(
        &self,
        _space_ref: &ExternalSpaceRef,
        membership: &MembershipRef,
    ) -> Result<(), SyncError> {
        let mut state = self.begin()?;
        match state.members.remove(membership.as_str()) {
            Some(_) => Ok(()),
            None => Err(SyncError::NotFound(membership.as_str().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote() -> RemoteSpace {
        RemoteSpace {
            title: "Rust".into(),
            description: "Systems".into(),
            guidelines: None,
        }
    }

    fn identity() -> MemberIdentity {
        MemberIdentity {
            id: MemberId::new(),
            display_name: "Ada".into(),
            email: "ada@example.com".into(),
        }
    }

    #[tokio::test]
    async fn add_member_is_idempotent() {
        let gateway = InMemorySyncGateway::new();
        let space_ref = gateway.create_space(&remote()).await.unwrap();
        let member = identity();

        let first = gateway.add_member(&space_ref, &member).await.unwrap();
        let second = gateway.add_member(&space_ref, &member).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(gateway.member_count(&space_ref), 1);
    }

    #[tokio::test]
    async fn removing_absent_member_is_not_found() {
        let gateway = InMemorySyncGateway::new();
        let space_ref = gateway.create_space(&remote()).await.unwrap();

        let err = gateway
            .remove_member(&space_ref, &MembershipRef::new("spaces/x/members/y"))
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::NotFound(_)));
    }

    #[tokio::test]
    async fn injected_failure_applies_once() {
        let gateway = InMemorySyncGateway::new();
        gateway.fail_next(SyncError::Timeout);

        assert_eq!(gateway.create_space(&remote()).await, Err(SyncError::Timeout));
        assert!(gateway.create_space(&remote()).await.is_ok());
        assert_eq!(gateway.call_count(), 2);
        assert_eq!(gateway.space_count(), 1);
    }

    #[tokio::test]
    async fn delayed_failure_hits_the_counted_call() {
        let gateway = InMemorySyncGateway::new();
        gateway.fail_after(1, SyncError::Timeout);

        assert!(gateway.create_space(&remote()).await.is_ok());
        assert_eq!(gateway.create_space(&remote()).await, Err(SyncError::Timeout));
        assert!(gateway.create_space(&remote()).await.is_ok());
    }

    #[tokio::test]
    async fn deleting_space_drops_its_members() {
        let gateway = InMemorySyncGateway::new();
        let space_ref = gateway.create_space(&remote()).await.unwrap();
        gateway.seed_member(&space_ref, MemberId::new());

        gateway.delete_space(&space_ref).await.unwrap();

        assert_eq!(gateway.member_count(&space_ref), 0);
        assert!(gateway.remote_space(&space_ref).is_none());
    }
}
