//! Recording reporter and notifier for tests.
//!
//! # Security Note
//!
//! Keeps everything it receives in memory. **Use for testing only.**

use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::chat_space::{MembershipNotification, NotificationKind};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{MembershipNotifier, SyncCategory, SyncFailureReporter};

#[derive(Debug, Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<(String, SyncCategory)>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<(String, SyncCategory)> {
        self.reports
            .lock()
            .expect("RecordingReporter: lock poisoned")
            .clone()
    }
}

#[async_trait]
impl SyncFailureReporter for RecordingReporter {
    async fn report(&self, message: &str, category: SyncCategory) {
        self.reports
            .lock()
            .expect("RecordingReporter: lock poisoned")
            .push((message.to_string(), category));
    }
}

/// Records notifications; can be told to fail every emit.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<MembershipNotification>>,
    failing: Mutex<bool>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_all(&self, failing: bool) {
        *self.failing.lock().expect("RecordingNotifier: lock poisoned") = failing;
    }

    pub fn notifications(&self) -> Vec<MembershipNotification> {
        self.sent
            .lock()
            .expect("RecordingNotifier: lock poisoned")
            .clone()
    }

    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.notifications().into_iter().map(|n| n.kind).collect()
    }
}

#[async_trait]
impl MembershipNotifier for RecordingNotifier {
    async fn emit(&self, notification: &MembershipNotification) -> Result<(), DomainError> {
        if *self.failing.lock().expect("RecordingNotifier: lock poisoned") {
            return Err(DomainError::new(
                ErrorCode::InternalError,
                "notification channel unavailable",
            ));
        }
        self.sent
            .lock()
            .expect("RecordingNotifier: lock poisoned")
            .push(notification.clone());
        Ok(())
    }
}
