//! Nodes of the refinement pipeline.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// `ApplyEdit -> SaveVersion -> Done`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefinementStep {
    #[default]
    ApplyEdit,
    SaveVersion,
    Done,
}

impl StateMachine for RefinementStep {
    fn can_transition_to(&self, target: &Self) -> bool {
        use RefinementStep::*;
        matches!((self, target), (ApplyEdit, SaveVersion) | (SaveVersion, Done))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use RefinementStep::*;
        match self {
            ApplyEdit => vec![SaveVersion],
            SaveVersion => vec![Done],
            Done => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_is_strictly_linear() {
        let step = RefinementStep::default();
        let step = step.transition_to(RefinementStep::SaveVersion).unwrap();
        let step = step.transition_to(RefinementStep::Done).unwrap();
        assert!(step.is_terminal());
    }

    #[test]
    fn cannot_skip_persistence() {
        assert!(RefinementStep::ApplyEdit
            .transition_to(RefinementStep::Done)
            .is_err());
    }
}
