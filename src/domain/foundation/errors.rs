//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be at most {max} characters, got {actual}")]
    TooLong {
        field: String,
        max: usize,
        actual: usize,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates a too-long validation error.
    pub fn too_long(field: impl Into<String>, max: usize, actual: usize) -> Self {
        ValidationError::TooLong {
            field: field.into(),
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    EmptyField,
    InvalidFormat,

    // Not found errors
    SpaceNotFound,
    MemberNotFound,
    MembershipNotFound,

    // State errors
    InvalidStateTransition,
    AlreadyJoined,
    RequestPending,
    SpaceDeleted,
    SpaceInactive,
    PrivateSpace,
    OrganizerImmutable,

    // Authorization errors
    Unauthorized,
    Forbidden,

    // External sync errors
    SyncFailed,

    // Infrastructure errors
    UniqueViolation,
    /// A conditional write found the row changed since it was read.
    StaleWrite,
    DatabaseError,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::EmptyField => "EMPTY_FIELD",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::SpaceNotFound => "SPACE_NOT_FOUND",
            ErrorCode::MemberNotFound => "MEMBER_NOT_FOUND",
            ErrorCode::MembershipNotFound => "MEMBERSHIP_NOT_FOUND",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::AlreadyJoined => "ALREADY_JOINED",
            ErrorCode::RequestPending => "REQUEST_PENDING",
            ErrorCode::SpaceDeleted => "SPACE_DELETED",
            ErrorCode::SpaceInactive => "SPACE_INACTIVE",
            ErrorCode::PrivateSpace => "PRIVATE_SPACE",
            ErrorCode::OrganizerImmutable => "ORGANIZER_IMMUTABLE",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::SyncFailed => "SYNC_FAILED",
            ErrorCode::UniqueViolation => "UNIQUE_VIOLATION",
            ErrorCode::StaleWrite => "STALE_WRITE",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Creates a unique constraint violation error.
    pub fn unique_violation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UniqueViolation, message)
    }

    /// Creates an error for a conditional write whose precondition no longer holds.
    pub fn stale_write(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StaleWrite, message)
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Returns true if the store rejected a write on a uniqueness constraint.
    pub fn is_unique_violation(&self) -> bool {
        self.code == ErrorCode::UniqueViolation
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("title");
        assert_eq!(format!("{}", err), "Field 'title' cannot be empty");
        assert_eq!(err.field(), "title");
    }

    #[test]
    fn validation_error_too_long_displays_correctly() {
        let err = ValidationError::too_long("title", 10, 12);
        assert_eq!(
            format!("{}", err),
            "Field 'title' must be at most 10 characters, got 12"
        );
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::SpaceNotFound, "Space not found");
        assert_eq!(format!("{}", err), "[SPACE_NOT_FOUND] Space not found");
    }

    #[test]
    fn domain_error_with_detail_adds_detail() {
        let err = DomainError::database("insert failed").with_detail("table", "chat_space_members");
        assert_eq!(
            err.details.get("table"),
            Some(&"chat_space_members".to_string())
        );
    }

    #[test]
    fn unique_violation_is_detected() {
        assert!(DomainError::unique_violation("dup").is_unique_violation());
        assert!(!DomainError::database("down").is_unique_violation());
    }
}
