//! Transition tables for status enums.
//!
//! Space status, request status and member role each declare the targets
//! reachable from every state; checks and terminal detection derive from
//! that table.

use super::ValidationError;

/// A status enum with a fixed table of legal transitions.
///
/// ```ignore
/// impl StateMachine for SpaceStatus {
///     fn valid_transitions(&self) -> &'static [Self] {
///         match self {
///             Active => &[Inactive, Deleted],
///             Inactive => &[Active, Deleted],
///             Deleted => &[],
///         }
///     }
/// }
///
/// let next = space.status.transition_to(SpaceStatus::Deleted)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug + 'static {
    /// States reachable from `self` in one step.
    fn valid_transitions(&self) -> &'static [Self];

    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Returns `target` if it is reachable, otherwise an `InvalidFormat`
    /// error on the `state_transition` field.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("{:?} cannot move to {:?}", self, target),
            ))
        }
    }

    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
