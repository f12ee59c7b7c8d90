//! PostgreSQL implementation of ChatSpaceStore.
//!
//! Schema lives in `migrations/`. The `(space_id, member_id)` unique
//! constraint backs the membership uniqueness rule; counter updates are
//! single `UPDATE` statements so concurrent transactions never lose an
//! increment.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::chat_space::{
    ChatSpace, ExternalSpaceRef, MemberRole, MembershipRef, MembershipState, RequestStatus,
    SpaceMember, SpaceStatus, SpaceVisibility,
};
use crate::domain::foundation::{
    DomainError, ErrorCode, MemberId, SpaceId, SpaceMemberId, Timestamp,
};
use crate::ports::{ChatSpaceStore, StoreTransaction};

/// Postgres SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Postgres SQLSTATE for check_violation.
const CHECK_VIOLATION: &str = "23514";

pub struct PostgresChatSpaceStore {
    pool: PgPool,
}

impl PostgresChatSpaceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a space.
#[derive(Debug, sqlx::FromRow)]
struct SpaceRow {
    id: Uuid,
    title: String,
    description: String,
    tags: Vec<String>,
    guidelines: Option<String>,
    visibility: String,
    status: String,
    total_members: i64,
    external_id: String,
    external_name: String,
    organizer_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SpaceRow> for ChatSpace {
    type Error = DomainError;

    fn try_from(row: SpaceRow) -> Result<Self, Self::Error> {
        Ok(ChatSpace {
            id: SpaceId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            tags: row.tags,
            guidelines: row.guidelines,
            visibility: parse::<SpaceVisibility>(&row.visibility)?,
            status: parse::<SpaceStatus>(&row.status)?,
            total_members: row.total_members,
            external_ref: ExternalSpaceRef {
                id: row.external_id,
                name: row.external_name,
            },
            organizer_id: MemberId::from_uuid(row.organizer_id),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

/// Database row representation of a membership.
#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    id: Uuid,
    space_id: Uuid,
    member_id: Uuid,
    role: String,
    request_status: String,
    member_comment: Option<String>,
    admin_comment: Option<String>,
    external_ref: Option<String>,
    removed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MemberRow> for SpaceMember {
    type Error = DomainError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        Ok(SpaceMember {
            id: SpaceMemberId::from_uuid(row.id),
            space_id: SpaceId::from_uuid(row.space_id),
            member_id: MemberId::from_uuid(row.member_id),
            role: parse::<MemberRole>(&row.role)?,
            request_status: parse::<RequestStatus>(&row.request_status)?,
            member_comment: row.member_comment,
            admin_comment: row.admin_comment,
            external_ref: row.external_ref.map(MembershipRef),
            removed: row.removed,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn parse<T>(value: &str) -> Result<T, DomainError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse::<T>()
        .map_err(|e| DomainError::new(ErrorCode::DatabaseError, format!("Invalid stored value: {}", e)))
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

const MEMBER_COLUMNS: &str = "id, space_id, member_id, role, request_status, member_comment, \
     admin_comment, external_ref, removed, created_at, updated_at";

#[async_trait]
impl ChatSpaceStore for PostgresChatSpaceStore {
    async fn find_space(&self, id: &SpaceId) -> Result<Option<ChatSpace>, DomainError> {
        let row: Option<SpaceRow> = sqlx::query_as(
            r#"
            SELECT id, title, description, tags, guidelines, visibility, status,
                   total_members, external_id, external_name, organizer_id,
                   created_at, updated_at
            FROM chat_spaces
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch space", e))?;

        row.map(ChatSpace::try_from).transpose()
    }

    async fn find_membership(
        &self,
        space_id: &SpaceId,
        member_id: &MemberId,
    ) -> Result<Option<SpaceMember>, DomainError> {
        let row: Option<MemberRow> = sqlx::query_as(&format!(
            "SELECT {} FROM chat_space_members WHERE space_id = $1 AND member_id = $2",
            MEMBER_COLUMNS
        ))
        .bind(space_id.as_uuid())
        .bind(member_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch membership", e))?;

        row.map(SpaceMember::try_from).transpose()
    }

    async fn find_admins_of(&self, space_id: &SpaceId) -> Result<HashSet<MemberId>, DomainError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT member_id FROM chat_space_members
            WHERE space_id = $1 AND role = 'ADMIN'
              AND request_status = 'APPROVED' AND NOT removed
            "#,
        )
        .bind(space_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch admins", e))?;

        Ok(ids.into_iter().map(MemberId::from_uuid).collect())
    }

    async fn count_pending(
        &self,
        space_ids: &[SpaceId],
    ) -> Result<HashMap<SpaceId, u64>, DomainError> {
        let ids: Vec<Uuid> = space_ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            r#"
            SELECT space_id, COUNT(*) FROM chat_space_members
            WHERE space_id = ANY($1) AND request_status = 'PENDING' AND NOT removed
            GROUP BY space_id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to count pending requests", e))?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (SpaceId::from_uuid(id), count.max(0) as u64))
            .collect())
    }

    async fn find_unsynced_memberships(&self, limit: u32) -> Result<Vec<SpaceMember>, DomainError> {
        let rows: Vec<MemberRow> = sqlx::query_as(&format!(
            "SELECT {} FROM chat_space_members \
             WHERE request_status = 'APPROVED' AND NOT removed AND external_ref IS NULL \
             ORDER BY created_at LIMIT $1",
            MEMBER_COLUMNS
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to fetch unsynced memberships", e))?;

        rows.into_iter().map(SpaceMember::try_from).collect()
    }

    async fn set_membership_external_ref(
        &self,
        id: &SpaceMemberId,
        external_ref: &MembershipRef,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE chat_space_members SET external_ref = $2
            WHERE id = $1 AND request_status = 'APPROVED' AND NOT removed
            "#,
        )
        .bind(id.as_uuid())
        .bind(external_ref.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to store membership handle", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;
        Ok(Box::new(PostgresTransaction { tx }))
    }
}

struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

impl PostgresTransaction {
    /// Moves the counter by `delta`. The `total_members >= 0` check rejects
    /// a decrement that would underflow instead of hiding the drift.
    async fn adjust_counter(&mut self, space_id: &SpaceId, delta: i64) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE chat_spaces
            SET total_members = total_members + $2
            WHERE id = $1
            "#,
        )
        .bind(space_id.as_uuid())
        .bind(delta)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some(CHECK_VIOLATION) {
                    tracing::error!(
                        space_id = %space_id,
                        delta,
                        "Member counter would go negative, counter has drifted from rows"
                    );
                    return DomainError::database(format!(
                        "Member counter of space {} would go negative",
                        space_id
                    ));
                }
            }
            db_error("Failed to update member counter", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(space_not_found(space_id));
        }
        Ok(())
    }

    async fn stored_status(&mut self, space_id: &SpaceId) -> Result<Option<SpaceStatus>, DomainError> {
        let status: Option<String> = sqlx::query_scalar("SELECT status FROM chat_spaces WHERE id = $1")
            .bind(space_id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| db_error("Failed to fetch space status", e))?;
        status.as_deref().map(parse::<SpaceStatus>).transpose()
    }

    /// Explains why a conditional membership write matched no row.
    async fn missed_membership(&mut self, membership: &SpaceMember) -> DomainError {
        let exists: Result<Option<Uuid>, sqlx::Error> =
            sqlx::query_scalar("SELECT id FROM chat_space_members WHERE id = $1")
                .bind(membership.id.as_uuid())
                .fetch_optional(&mut *self.tx)
                .await;
        match exists {
            Ok(Some(_)) => DomainError::stale_write(format!(
                "Membership {} changed since it was read",
                membership.id
            )),
            Ok(None) => DomainError::new(
                ErrorCode::MembershipNotFound,
                format!("Membership {} not found", membership.id),
            ),
            Err(e) => db_error("Failed to fetch membership", e),
        }
    }
}

fn space_not_found(space_id: &SpaceId) -> DomainError {
    DomainError::new(ErrorCode::SpaceNotFound, format!("Space {} not found", space_id))
}

#[async_trait]
impl StoreTransaction for PostgresTransaction {
    async fn insert_space(&mut self, space: &ChatSpace) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO chat_spaces (
                id, title, description, tags, guidelines, visibility, status,
                total_members, external_id, external_name, organizer_id,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(space.id.as_uuid())
        .bind(&space.title)
        .bind(&space.description)
        .bind(&space.tags)
        .bind(&space.guidelines)
        .bind(space.visibility.as_str())
        .bind(space.status.as_str())
        .bind(space.total_members)
        .bind(&space.external_ref.id)
        .bind(&space.external_ref.name)
        .bind(space.organizer_id.as_uuid())
        .bind(space.created_at.as_datetime())
        .bind(space.updated_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to insert space", e))?;
        Ok(())
    }

    async fn update_space(&mut self, space: &ChatSpace) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE chat_spaces SET
                title = $2,
                description = $3,
                tags = $4,
                guidelines = $5,
                visibility = $6,
                updated_at = $7
            WHERE id = $1 AND status <> 'DELETED'
            "#,
        )
        .bind(space.id.as_uuid())
        .bind(&space.title)
        .bind(&space.description)
        .bind(&space.tags)
        .bind(&space.guidelines)
        .bind(space.visibility.as_str())
        .bind(space.updated_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to update space", e))?;

        if result.rows_affected() == 0 {
            return Err(match self.stored_status(&space.id).await? {
                Some(_) => DomainError::new(
                    ErrorCode::SpaceDeleted,
                    format!("Space {} has been deleted", space.id),
                ),
                None => space_not_found(&space.id),
            });
        }
        Ok(())
    }

    async fn set_space_status(
        &mut self,
        space_id: &SpaceId,
        expected: SpaceStatus,
        status: SpaceStatus,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE chat_spaces SET status = $3, updated_at = $4 WHERE id = $1 AND status = $2",
        )
        .bind(space_id.as_uuid())
        .bind(expected.as_str())
        .bind(status.as_str())
        .bind(Timestamp::now().as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to update space status", e))?;

        if result.rows_affected() == 0 {
            return Err(match self.stored_status(space_id).await? {
                Some(stored) => DomainError::stale_write(format!(
                    "Space {} is {}, expected {}",
                    space_id,
                    stored.as_str(),
                    expected.as_str()
                )),
                None => space_not_found(space_id),
            });
        }
        Ok(())
    }

    async fn insert_membership(&mut self, membership: &SpaceMember) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO chat_space_members (
                id, space_id, member_id, role, request_status, member_comment,
                admin_comment, external_ref, removed, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(membership.id.as_uuid())
        .bind(membership.space_id.as_uuid())
        .bind(membership.member_id.as_uuid())
        .bind(membership.role.as_str())
        .bind(membership.request_status.as_str())
        .bind(&membership.member_comment)
        .bind(&membership.admin_comment)
        .bind(membership.external_ref.as_ref().map(|r| r.as_str()))
        .bind(membership.removed)
        .bind(membership.created_at.as_datetime())
        .bind(membership.updated_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                    return DomainError::unique_violation(format!(
                        "Member {} already has a row in space {}",
                        membership.member_id, membership.space_id
                    ));
                }
            }
            db_error("Failed to insert membership", e)
        })?;
        Ok(())
    }

    async fn update_membership(
        &mut self,
        membership: &SpaceMember,
        expected: MembershipState,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE chat_space_members SET
                role = $2,
                request_status = $3,
                member_comment = $4,
                admin_comment = $5,
                removed = $6,
                updated_at = $7
            WHERE id = $1
              AND request_status = $8 AND role = $9 AND removed = $10
            "#,
        )
        .bind(membership.id.as_uuid())
        .bind(membership.role.as_str())
        .bind(membership.request_status.as_str())
        .bind(&membership.member_comment)
        .bind(&membership.admin_comment)
        .bind(membership.removed)
        .bind(membership.updated_at.as_datetime())
        .bind(expected.request_status.as_str())
        .bind(expected.role.as_str())
        .bind(expected.removed)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to update membership", e))?;

        if result.rows_affected() == 0 {
            return Err(self.missed_membership(membership).await);
        }
        Ok(())
    }

    async fn delete_membership(&mut self, membership: &SpaceMember) -> Result<(), DomainError> {
        let expected = membership.state();
        let result = sqlx::query(
            r#"
            DELETE FROM chat_space_members
            WHERE id = $1 AND request_status = $2 AND role = $3 AND removed = $4
            "#,
        )
        .bind(membership.id.as_uuid())
        .bind(expected.request_status.as_str())
        .bind(expected.role.as_str())
        .bind(expected.removed)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| db_error("Failed to delete membership", e))?;

        if result.rows_affected() == 0 {
            return Err(self.missed_membership(membership).await);
        }
        Ok(())
    }

    async fn increment_counter(&mut self, space_id: &SpaceId) -> Result<(), DomainError> {
        self.adjust_counter(space_id, 1).await
    }

    async fn decrement_counter(&mut self, space_id: &SpaceId) -> Result<(), DomainError> {
        self.adjust_counter(space_id, -1).await
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.tx
            .commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))
    }
}
