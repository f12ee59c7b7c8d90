//! External sync gateway port.
//!
//! Thin abstraction over the remote group-messaging provider. Each call is
//! independently fallible and reports failure as a [`SyncError`] so callers
//! can tell provider failures apart from local ones.
//!
//! Implementations must make `add_member` idempotent (an already-present
//! member yields its existing handle) and treat an already-absent member in
//! `remove_member` as success.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::chat_space::{
    ChatSpace, ExternalSpaceRef, MemberIdentity, MembershipRef, SpaceDetails,
};

/// Errors raised by the remote provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Provider request timed out")]
    Timeout,

    #[error("Provider rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Remote resource not found: {0}")]
    NotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected provider response: {0}")]
    InvalidResponse(String),
}

impl SyncError {
    /// Returns true if the same call may succeed when retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::Unavailable(_) | SyncError::Timeout | SyncError::Transport(_)
        )
    }
}

/// Descriptive fields mirrored to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSpace {
    pub title: String,
    pub description: String,
    pub guidelines: Option<String>,
}

impl From<&SpaceDetails> for RemoteSpace {
    fn from(details: &SpaceDetails) -> Self {
        Self {
            title: details.title.clone(),
            description: details.description.clone(),
            guidelines: details.guidelines.clone(),
        }
    }
}

impl From<&ChatSpace> for RemoteSpace {
    fn from(space: &ChatSpace) -> Self {
        Self {
            title: space.title.clone(),
            description: space.description.clone(),
            guidelines: space.guidelines.clone(),
        }
    }
}

#[async_trait]
pub trait SyncGateway: Send + Sync {
    /// Create the remote space and return its handle.
    async fn create_space(&self, space: &RemoteSpace) -> Result<ExternalSpaceRef, SyncError>;

    async fn update_space(
        &self,
        space_ref: &ExternalSpaceRef,
        space: &RemoteSpace,
    ) -> Result<(), SyncError>;

    async fn delete_space(&self, space_ref: &ExternalSpaceRef) -> Result<(), SyncError>;

    /// Add a member; returns the remote membership handle.
    async fn add_member(
        &self,
        space_ref: &ExternalSpaceRef,
        member: &MemberIdentity,
    ) -> Result<MembershipRef, SyncError>;

    async fn remove_member(
        &self,
        space_ref: &ExternalSpaceRef,
        membership: &MembershipRef,
    ) -> Result<(), SyncError>;
}
