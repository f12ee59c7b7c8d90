//! MembershipNotifier port - tells people about membership changes.
//!
//! Invoked after a transition has committed. Message formatting and
//! delivery belong to the implementation; errors are logged by the caller
//! and never affect membership state.

use async_trait::async_trait;

use crate::domain::chat_space::MembershipNotification;
use crate::domain::foundation::DomainError;

#[async_trait]
pub trait MembershipNotifier: Send + Sync {
    async fn emit(&self, notification: &MembershipNotification) -> Result<(), DomainError>;
}
