//! PostgreSQL member directory over the platform `members` table.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::chat_space::MemberIdentity;
use crate::domain::foundation::{DomainError, ErrorCode, MemberId};
use crate::ports::MemberDirectory;

pub struct PostgresMemberDirectory {
    pool: PgPool,
}

impl PostgresMemberDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    id: Uuid,
    display_name: String,
    email: String,
}

impl From<MemberRow> for MemberIdentity {
    fn from(row: MemberRow) -> Self {
        MemberIdentity {
            id: MemberId::from_uuid(row.id),
            display_name: row.display_name,
            email: row.email,
        }
    }
}

#[async_trait]
impl MemberDirectory for PostgresMemberDirectory {
    async fn find_member(&self, id: &MemberId) -> Result<Option<MemberIdentity>, DomainError> {
        let row: Option<MemberRow> =
            sqlx::query_as("SELECT id, display_name, email FROM members WHERE id = $1")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to fetch member: {}", e),
                    )
                })?;

        Ok(row.map(MemberIdentity::from))
    }
}
