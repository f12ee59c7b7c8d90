//! Chat-space error types.
//!
//! Every caller-facing failure of a membership use case is one of these
//! variants. Callers match on the variant (or on [`ErrorKind`]) instead of
//! parsing messages.
//!
//! # Kind Mapping
//!
//! | Error | Kind |
//! |-------|------|
//! | SpaceNotFound, MemberNotFound, MembershipNotFound | NotFound |
//! | NotAnAdmin | Authorization |
//! | AlreadyJoined, RequestPending, AlreadyDeleted, SpaceInactive, CannotJoinPrivateSpaceDirectly, OrganizerImmutable, InvalidTransition | State |
//! | Validation | Validation |
//! | UnableToCompleteOperation | ExternalSync |
//! | Infrastructure | Infrastructure |

use thiserror::Error;

use crate::domain::foundation::{
    DomainError, ErrorCode, MemberId, SpaceId, ValidationError,
};

/// Coarse classification of a [`ChatSpaceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Authorization,
    State,
    Validation,
    ExternalSync,
    Infrastructure,
}

/// Chat-space membership errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatSpaceError {
    #[error("Chat space {0} not found")]
    SpaceNotFound(SpaceId),

    #[error("Member {0} not found")]
    MemberNotFound(MemberId),

    #[error("Member {member_id} has no membership in chat space {space_id}")]
    MembershipNotFound { space_id: SpaceId, member_id: MemberId },

    #[error("Member {member_id} is neither the organizer nor an admin of chat space {space_id}")]
    NotAnAdmin { space_id: SpaceId, member_id: MemberId },

    #[error("Member {member_id} has already joined chat space {space_id}")]
    AlreadyJoined { space_id: SpaceId, member_id: MemberId },

    #[error("Member {member_id} already has a pending request for chat space {space_id}")]
    RequestPending { space_id: SpaceId, member_id: MemberId },

    #[error("Chat space {0} has been deleted")]
    AlreadyDeleted(SpaceId),

    #[error("Chat space {0} is inactive")]
    SpaceInactive(SpaceId),

    #[error("Chat space {0} is private; send a request to join instead")]
    CannotJoinPrivateSpaceDirectly(SpaceId),

    #[error("The organizer {member_id} of chat space {space_id} cannot {action}")]
    OrganizerImmutable {
        space_id: SpaceId,
        member_id: MemberId,
        action: &'static str,
    },

    #[error("Cannot {attempted} membership of {member_id} in chat space {space_id} while {current}")]
    InvalidTransition {
        space_id: SpaceId,
        member_id: MemberId,
        current: String,
        attempted: &'static str,
    },

    #[error("Validation failed for '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Unable to complete operation: {0}")]
    UnableToCompleteOperation(String),

    #[error("Error: {0}")]
    Infrastructure(String),
}

impl ChatSpaceError {
    pub fn not_an_admin(space_id: SpaceId, member_id: MemberId) -> Self {
        ChatSpaceError::NotAnAdmin { space_id, member_id }
    }

    pub fn membership_not_found(space_id: SpaceId, member_id: MemberId) -> Self {
        ChatSpaceError::MembershipNotFound { space_id, member_id }
    }

    pub fn already_joined(space_id: SpaceId, member_id: MemberId) -> Self {
        ChatSpaceError::AlreadyJoined { space_id, member_id }
    }

    pub fn request_pending(space_id: SpaceId, member_id: MemberId) -> Self {
        ChatSpaceError::RequestPending { space_id, member_id }
    }

    pub fn organizer_immutable(space_id: SpaceId, member_id: MemberId, action: &'static str) -> Self {
        ChatSpaceError::OrganizerImmutable {
            space_id,
            member_id,
            action,
        }
    }

    pub fn invalid_transition(
        space_id: SpaceId,
        member_id: MemberId,
        current: impl Into<String>,
        attempted: &'static str,
    ) -> Self {
        ChatSpaceError::InvalidTransition {
            space_id,
            member_id,
            current: current.into(),
            attempted,
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ChatSpaceError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn unable_to_complete(message: impl Into<String>) -> Self {
        ChatSpaceError::UnableToCompleteOperation(message.into())
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        ChatSpaceError::Infrastructure(message.into())
    }

    /// Returns the taxonomy bucket of this error.
    pub fn kind(&self) -> ErrorKind {
        use ChatSpaceError::*;
        match self {
            SpaceNotFound(_) | MemberNotFound(_) | MembershipNotFound { .. } => ErrorKind::NotFound,
            NotAnAdmin { .. } => ErrorKind::Authorization,
            AlreadyJoined { .. }
            | RequestPending { .. }
            | AlreadyDeleted(_)
            | SpaceInactive(_)
            | CannotJoinPrivateSpaceDirectly(_)
            | OrganizerImmutable { .. }
            | InvalidTransition { .. } => ErrorKind::State,
            Validation { .. } => ErrorKind::Validation,
            UnableToCompleteOperation(_) => ErrorKind::ExternalSync,
            Infrastructure(_) => ErrorKind::Infrastructure,
        }
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        use ChatSpaceError::*;
        match self {
            SpaceNotFound(_) => ErrorCode::SpaceNotFound,
            MemberNotFound(_) => ErrorCode::MemberNotFound,
            MembershipNotFound { .. } => ErrorCode::MembershipNotFound,
            NotAnAdmin { .. } => ErrorCode::Forbidden,
            AlreadyJoined { .. } => ErrorCode::AlreadyJoined,
            RequestPending { .. } => ErrorCode::RequestPending,
            AlreadyDeleted(_) => ErrorCode::SpaceDeleted,
            SpaceInactive(_) => ErrorCode::SpaceInactive,
            CannotJoinPrivateSpaceDirectly(_) => ErrorCode::PrivateSpace,
            OrganizerImmutable { .. } => ErrorCode::OrganizerImmutable,
            InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            Validation { .. } => ErrorCode::ValidationFailed,
            UnableToCompleteOperation(_) => ErrorCode::SyncFailed,
            Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<ValidationError> for ChatSpaceError {
    fn from(err: ValidationError) -> Self {
        ChatSpaceError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for ChatSpaceError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::InvalidFormat => {
                ChatSpaceError::Validation {
                    field: err
                        .details
                        .get("field")
                        .cloned()
                        .unwrap_or_else(|| "unknown".to_string()),
                    message: err.message,
                }
            }
            ErrorCode::SyncFailed => ChatSpaceError::UnableToCompleteOperation(err.message),
            _ => ChatSpaceError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ChatSpaceError> for DomainError {
    fn from(err: ChatSpaceError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
