//! ChatSpace aggregate.
//!
//! A chat space is a named collaboration group mirrored in the external
//! group-messaging provider. The local record is authoritative.
//!
//! # Design Decisions
//!
//! - **Soft delete**: `Deleted` is a terminal status, rows are never removed
//! - **Counter owned by the store**: `total_members` is only changed through
//!   [`CounterDelta`] applied atomically by the store
//! - **Pure transitions**: mutators consume the aggregate and return the next
//!   state instead of editing it in place

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MemberId, SpaceId, StateMachine, Timestamp, ValidationError};

use super::{ChatSpaceError, SpaceStatus, SpaceVisibility};

const MAX_TITLE_LEN: usize = 128;
const MAX_DESCRIPTION_LEN: usize = 4000;
const MAX_TAG_LEN: usize = 64;

/// Opaque handle of a space in the external provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalSpaceRef {
    /// Provider-side identifier.
    pub id: String,
    /// Provider-side resource name.
    pub name: String,
}

/// Change to a space's total-member counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterDelta {
    Increment,
    Decrement,
    Unchanged,
}

impl CounterDelta {
    pub fn as_i64(&self) -> i64 {
        match self {
            CounterDelta::Increment => 1,
            CounterDelta::Decrement => -1,
            CounterDelta::Unchanged => 0,
        }
    }
}

/// Editable descriptive fields of a space, validated on construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceDetails {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub guidelines: Option<String>,
    pub visibility: SpaceVisibility,
}

impl SpaceDetails {
    /// Validates and normalizes user-supplied fields.
    ///
    /// Title and description are trimmed and required. Blank tags are dropped
    /// and duplicates removed, keeping first occurrence order.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        tags: Vec<String>,
        guidelines: Option<String>,
        visibility: SpaceVisibility,
    ) -> Result<Self, ValidationError> {
        let title = required("title", title.into(), MAX_TITLE_LEN)?;
        let description = required("description", description.into(), MAX_DESCRIPTION_LEN)?;

        let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            let tag = tag.trim().to_string();
            if tag.is_empty() {
                continue;
            }
            if tag.chars().count() > MAX_TAG_LEN {
                return Err(ValidationError::too_long("tags", MAX_TAG_LEN, tag.chars().count()));
            }
            if !normalized.contains(&tag) {
                normalized.push(tag);
            }
        }

        let guidelines = guidelines
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty());

        Ok(Self {
            title,
            description,
            tags: normalized,
            guidelines,
            visibility,
        })
    }
}

fn required(field: &str, value: String, max: usize) -> Result<String, ValidationError> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::too_long(field, max, len));
    }
    Ok(value)
}

/// ChatSpace aggregate.
///
/// # Invariants
///
/// - Exactly one `Organizer` membership exists, always approved
/// - `total_members` equals the number of approved memberships
/// - Once `Deleted`, no further mutation succeeds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSpace {
    pub id: SpaceId,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub guidelines: Option<String>,
    pub visibility: SpaceVisibility,
    pub status: SpaceStatus,
    pub total_members: i64,
    pub external_ref: ExternalSpaceRef,
    pub organizer_id: MemberId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ChatSpace {
    /// Creates a new active space.
    ///
    /// The counter starts at zero; the organizer's membership is counted by
    /// the same transaction that persists the space.
    pub fn create(
        id: SpaceId,
        details: SpaceDetails,
        organizer_id: MemberId,
        external_ref: ExternalSpaceRef,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            title: details.title,
            description: details.description,
            tags: details.tags,
            guidelines: details.guidelines,
            visibility: details.visibility,
            status: SpaceStatus::Active,
            total_members: 0,
            external_ref,
            organizer_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_organizer(&self, member_id: &MemberId) -> bool {
        &self.organizer_id == member_id
    }

    pub fn is_deleted(&self) -> bool {
        self.status == SpaceStatus::Deleted
    }

    /// Fails if the space can no longer be mutated.
    pub fn ensure_not_deleted(&self) -> Result<(), ChatSpaceError> {
        if self.is_deleted() {
            return Err(ChatSpaceError::AlreadyDeleted(self.id));
        }
        Ok(())
    }

    /// Fails unless the space accepts new members.
    pub fn ensure_joinable(&self) -> Result<(), ChatSpaceError> {
        match self.status {
            SpaceStatus::Active => Ok(()),
            SpaceStatus::Inactive => Err(ChatSpaceError::SpaceInactive(self.id)),
            SpaceStatus::Deleted => Err(ChatSpaceError::AlreadyDeleted(self.id)),
        }
    }

    /// Returns the space with replaced descriptive fields.
    pub fn with_details(self, details: SpaceDetails) -> Result<Self, ChatSpaceError> {
        self.ensure_not_deleted()?;
        Ok(Self {
            title: details.title,
            description: details.description,
            tags: details.tags,
            guidelines: details.guidelines,
            visibility: details.visibility,
            updated_at: Timestamp::now(),
            ..self
        })
    }

    /// Returns the space in `target` status.
    ///
    /// Setting the current status again is a no-op so enable/disable can be
    /// retried safely.
    pub fn with_status(self, target: SpaceStatus) -> Result<Self, ChatSpaceError> {
        self.ensure_not_deleted()?;
        if self.status == target {
            return Ok(self);
        }
        let status = self.status.transition_to(target)?;
        Ok(Self {
            status,
            updated_at: Timestamp::now(),
            ..self
        })
    }

    /// Returns the space with the counter moved by `delta`.
    ///
    /// Saturates at zero. Stores reject an underflowing delta before applying
    /// it, so saturation only shows up on values built outside a store.
    pub fn with_counter(self, delta: CounterDelta) -> Self {
        Self {
            total_members: (self.total_members + delta.as_i64()).max(0),
            ..self
        }
    }
}
