//! State machine trait for step enums.
//!
//! Both the conversation graph and the refinement pipeline are fixed graphs
//! whose nodes are plain enums. This trait gives them one way to declare and
//! check edges.

use super::ValidationError;

/// Trait for enums that represent the nodes of a fixed step graph.
///
/// Implementors define valid transitions and get validated
/// transition methods for free.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for RefinementStep {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         matches!((self, target), (ApplyEdit, SaveVersion) | (SaveVersion, Done))
///     }
///
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             ApplyEdit => vec![SaveVersion],
///             SaveVersion => vec![Done],
///             Done => vec![],
///         }
///     }
/// }
///
/// let next = RefinementStep::ApplyEdit.transition_to(RefinementStep::SaveVersion)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_transition(self, target))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Light {
        Red,
        Green,
        Yellow,
        Off,
    }

    impl StateMachine for Light {
        fn can_transition_to(&self, target: &Self) -> bool {
            use Light::*;
            matches!(
                (self, target),
                (Red, Green) | (Green, Yellow) | (Yellow, Red) | (Red, Off)
            )
        }

        fn valid_transitions(&self) -> Vec<Self> {
            use Light::*;
            match self {
                Red => vec![Green, Off],
                Green => vec![Yellow],
                Yellow => vec![Red],
                Off => vec![],
            }
        }
    }

    #[test]
    fn transition_to_succeeds_for_valid_transition() {
        assert_eq!(Light::Red.transition_to(Light::Green), Ok(Light::Green));
    }

    #[test]
    fn transition_to_fails_for_invalid_transition() {
        assert!(Light::Green.transition_to(Light::Red).is_err());
    }

    #[test]
    fn is_terminal_only_for_states_without_edges() {
        assert!(Light::Off.is_terminal());
        assert!(!Light::Yellow.is_terminal());
    }

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        for state in [Light::Red, Light::Green, Light::Yellow, Light::Off] {
            for target in state.valid_transitions() {
                assert!(
                    state.can_transition_to(&target),
                    "can_transition_to should return true for {:?} -> {:?}",
                    state,
                    target
                );
            }
        }
    }
}
