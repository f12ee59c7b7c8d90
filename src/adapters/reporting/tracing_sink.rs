//! Log-backed reporter and notifier.
//!
//! Sync failures go out at `error` with the category as a structured field,
//! so log aggregation can alert on them per operation. Notifications are
//! logged at `info` until a delivery channel is wired in.

use async_trait::async_trait;

use crate::domain::chat_space::MembershipNotification;
use crate::domain::foundation::DomainError;
use crate::ports::{MembershipNotifier, SyncCategory, SyncFailureReporter};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSyncReporter;

impl TracingSyncReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SyncFailureReporter for TracingSyncReporter {
    async fn report(&self, message: &str, category: SyncCategory) {
        tracing::error!(category = %category, "Chat sync failure: {}", message);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MembershipNotifier for TracingNotifier {
    async fn emit(&self, notification: &MembershipNotification) -> Result<(), DomainError> {
        tracing::info!(
            kind = %notification.kind,
            actor = %notification.actor,
            target = %notification.target,
            space_id = %notification.space_id,
            "Membership notification"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat_space::NotificationKind;
    use crate::domain::foundation::{MemberId, SpaceId};

    #[tokio::test]
    async fn notifier_never_fails() {
        let notification = MembershipNotification {
            kind: NotificationKind::Joined,
            actor: MemberId::new(),
            target: MemberId::new(),
            space_id: SpaceId::new(),
        };
        assert!(TracingNotifier::new().emit(&notification).await.is_ok());
    }
}
