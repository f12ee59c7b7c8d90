//! MemberDirectory port - resolves platform members.

use async_trait::async_trait;

use crate::domain::chat_space::MemberIdentity;
use crate::domain::foundation::{DomainError, MemberId};

/// Lookup of platform members by id.
///
/// Used to reject admin actions that target unknown members and to obtain
/// the identity the external provider needs.
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    async fn find_member(&self, id: &MemberId) -> Result<Option<MemberIdentity>, DomainError>;
}
