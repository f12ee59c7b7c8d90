//! Space lifecycle status and visibility.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a chat space.
///
/// `Deleted` is a soft delete and is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpaceStatus {
    Active,
    Inactive,
    Deleted,
}

impl SpaceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpaceStatus::Active => "ACTIVE",
            SpaceStatus::Inactive => "INACTIVE",
            SpaceStatus::Deleted => "DELETED",
        }
    }
}

impl StateMachine for SpaceStatus {
    fn valid_transitions(&self) -> &'static [Self] {
        use SpaceStatus::*;
        match self {
            Active => &[Inactive, Deleted],
            Inactive => &[Active, Deleted],
            Deleted => &[],
        }
    }
}

impl fmt::Display for SpaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpaceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(SpaceStatus::Active),
            "INACTIVE" => Ok(SpaceStatus::Inactive),
            "DELETED" => Ok(SpaceStatus::Deleted),
            other => Err(format!("Invalid space status: {}", other)),
        }
    }
}

/// Who may join a space without approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpaceVisibility {
    /// Anyone may join; joins are approved immediately.
    Public,
    /// Joining goes through a request reviewed by the organizer or an admin.
    Private,
}

impl SpaceVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpaceVisibility::Public => "PUBLIC",
            SpaceVisibility::Private => "PRIVATE",
        }
    }
}

impl fmt::Display for SpaceVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpaceVisibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PUBLIC" => Ok(SpaceVisibility::Public),
            "PRIVATE" => Ok(SpaceVisibility::Private),
            other => Err(format!("Invalid space visibility: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_and_inactive_toggle() {
        assert!(SpaceStatus::Active.can_transition_to(&SpaceStatus::Inactive));
        assert!(SpaceStatus::Inactive.can_transition_to(&SpaceStatus::Active));
    }

    #[test]
    fn deleted_is_terminal() {
        assert!(SpaceStatus::Deleted.is_terminal());
        assert!(SpaceStatus::Deleted
            .transition_to(SpaceStatus::Active)
            .is_err());
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [SpaceStatus::Active, SpaceStatus::Inactive, SpaceStatus::Deleted] {
            assert_eq!(status.as_str().parse::<SpaceStatus>(), Ok(status));
        }
    }

    #[test]
    fn visibility_parses_case_insensitively() {
        assert_eq!("private".parse::<SpaceVisibility>(), Ok(SpaceVisibility::Private));
        assert!("secret".parse::<SpaceVisibility>().is_err());
    }

    #[test]
    fn every_live_status_can_be_deleted() {
        for status in [SpaceStatus::Active, SpaceStatus::Inactive] {
            assert_eq!(status.transition_to(SpaceStatus::Deleted), Ok(SpaceStatus::Deleted));
        }
    }
}
