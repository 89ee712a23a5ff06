//! Nodes of the conversation graph.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Step the conversation is at.
///
/// ```text
/// CollectRequirements -> AwaitUser -> CollectRequirements
///                     -> AlignStandards -> Enrich -> GenerateOptions
/// GenerateOptions -> AwaitSelection -> GenerateOptions
///                 -> Done
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStep {
    #[default]
    CollectRequirements,
    AwaitUser,
    AlignStandards,
    Enrich,
    GenerateOptions,
    AwaitSelection,
    Done,
}

impl ConversationStep {
    /// True for the steps where a run halts waiting for the teacher.
    pub fn is_suspend_point(&self) -> bool {
        matches!(
            self,
            ConversationStep::AwaitUser | ConversationStep::AwaitSelection
        )
    }

    /// Step re-entered when a suspended conversation receives input.
    pub fn resume_target(&self) -> Option<ConversationStep> {
        match self {
            ConversationStep::AwaitUser => Some(ConversationStep::CollectRequirements),
            ConversationStep::AwaitSelection => Some(ConversationStep::GenerateOptions),
            _ => None,
        }
    }
}

impl fmt::Display for ConversationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConversationStep::CollectRequirements => "collect_requirements",
            ConversationStep::AwaitUser => "await_user",
            ConversationStep::AlignStandards => "align_standards",
            ConversationStep::Enrich => "enrich",
            ConversationStep::GenerateOptions => "generate_options",
            ConversationStep::AwaitSelection => "await_selection",
            ConversationStep::Done => "done",
        };
        write!(f, "{}", s)
    }
}

impl StateMachine for ConversationStep {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConversationStep::*;
        matches!(
            (self, target),
            (CollectRequirements, AwaitUser)
                | (CollectRequirements, AlignStandards)
                | (AwaitUser, CollectRequirements)
                | (AlignStandards, Enrich)
                | (Enrich, GenerateOptions)
                | (GenerateOptions, AwaitSelection)
                | (GenerateOptions, Done)
                | (AwaitSelection, GenerateOptions)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConversationStep::*;
        match self {
            CollectRequirements => vec![AwaitUser, AlignStandards],
            AwaitUser => vec![CollectRequirements],
            AlignStandards => vec![Enrich],
            Enrich => vec![GenerateOptions],
            GenerateOptions => vec![AwaitSelection, Done],
            AwaitSelection => vec![GenerateOptions],
            Done => vec![],
        }
    }
}
