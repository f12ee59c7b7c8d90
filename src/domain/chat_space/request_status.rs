//! Request-to-join status and member roles.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Approval state of a membership row.
///
/// Removal is not a stored state: leaving or being removed deletes the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Approved,
    Disapproved,
}

impl RequestStatus {
    /// Only approved rows count towards a space's total members.
    pub fn is_counted(&self) -> bool {
        matches!(self, RequestStatus::Approved)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Approved => "APPROVED",
            RequestStatus::Disapproved => "DISAPPROVED",
        }
    }
}

impl StateMachine for RequestStatus {
    fn valid_transitions(&self) -> &'static [Self] {
        use RequestStatus::*;
        match self {
            Pending => &[Approved, Disapproved],
            Disapproved => &[Approved, Pending],
            // Approved rows only leave this state by being deleted.
            Approved => &[],
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(RequestStatus::Pending),
            "APPROVED" => Ok(RequestStatus::Approved),
            "DISAPPROVED" => Ok(RequestStatus::Disapproved),
            other => Err(format!("Invalid request status: {}", other)),
        }
    }
}

/// Role of a member within a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    Member,
    Admin,
    /// The creator of the space. Exactly one per space; never changes.
    Organizer,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Member => "MEMBER",
            MemberRole::Admin => "ADMIN",
            MemberRole::Organizer => "ORGANIZER",
        }
    }
}

impl StateMachine for MemberRole {
    fn valid_transitions(&self) -> &'static [Self] {
        use MemberRole::*;
        match self {
            Member => &[Admin],
            Admin => &[Member],
            Organizer => &[],
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MEMBER" => Ok(MemberRole::Member),
            "ADMIN" => Ok(MemberRole::Admin),
            "ORGANIZER" => Ok(MemberRole::Organizer),
            other => Err(format!("Invalid member role: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_be_approved_or_disapproved() {
        assert_eq!(
            RequestStatus::Pending.valid_transitions(),
            &[RequestStatus::Approved, RequestStatus::Disapproved]
        );
    }

    #[test]
    fn disapproved_can_be_re_requested() {
        assert!(RequestStatus::Disapproved.can_transition_to(&RequestStatus::Pending));
    }

    #[test]
    fn approved_has_no_outgoing_status_transition() {
        assert!(RequestStatus::Approved.is_terminal());
        assert!(RequestStatus::Approved
            .transition_to(RequestStatus::Pending)
            .is_err());
    }

    #[test]
    fn only_approved_is_counted() {
        assert!(RequestStatus::Approved.is_counted());
        assert!(!RequestStatus::Pending.is_counted());
        assert!(!RequestStatus::Disapproved.is_counted());
    }

    #[test]
    fn organizer_role_is_fixed() {
        assert!(MemberRole::Organizer.is_terminal());
        assert!(!MemberRole::Member.can_transition_to(&MemberRole::Organizer));
        assert!(MemberRole::Member.can_transition_to(&MemberRole::Admin));
        assert!(MemberRole::Admin.can_transition_to(&MemberRole::Member));
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [MemberRole::Member, MemberRole::Admin, MemberRole::Organizer] {
            assert_eq!(role.as_str().parse::<MemberRole>(), Ok(role));
        }
    }
}
