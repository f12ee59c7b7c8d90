//! Fixed member directory, populated up front.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::chat_space::MemberIdentity;
use crate::domain::foundation::{DomainError, MemberId};
use crate::ports::MemberDirectory;

#[derive(Debug, Default)]
pub struct StaticMemberDirectory {
    members: RwLock<HashMap<MemberId, MemberIdentity>>,
}

impl StaticMemberDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_members(members: impl IntoIterator<Item = MemberIdentity>) -> Self {
        let directory = Self::new();
        for member in members {
            directory.insert(member);
        }
        directory
    }

    pub fn insert(&self, member: MemberIdentity) {
        self.members
            .write()
            .expect("StaticMemberDirectory: lock poisoned")
            .insert(member.id, member);
    }

    pub fn len(&self) -> usize {
        self.members
            .read()
            .expect("StaticMemberDirectory: lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MemberDirectory for StaticMemberDirectory {
    async fn find_member(&self, id: &MemberId) -> Result<Option<MemberIdentity>, DomainError> {
        Ok(self
            .members
            .read()
            .expect("StaticMemberDirectory: lock poisoned")
            .get(id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finds_inserted_members_only() {
        let ada = MemberIdentity {
            id: MemberId::new(),
            display_name: "Ada".into(),
            email: "ada@example.com".into(),
        };
        let directory = StaticMemberDirectory::with_members([ada.clone()]);

        assert_eq!(directory.find_member(&ada.id).await.unwrap(), Some(ada));
        assert_eq!(directory.find_member(&MemberId::new()).await.unwrap(), None);
    }
}
