//! Result of driving the graph to its next stopping point.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DocumentId, ThreadId};
use crate::domain::planning::{OptionSet, RequiredSlot};

/// What the suspended conversation is waiting for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AwaitingInput {
    /// More requirement slots are needed.
    Requirements { missing_slots: Vec<RequiredSlot> },
    /// A choice among the generated options is needed.
    Selection { option_count: usize },
}

/// Outcome of one run, as surfaced across the session boundary.
///
/// Serializes as `{"status": "suspended", ...}` or `{"status": "done", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Suspended {
        thread_id: ThreadId,
        prompt_text: String,
        awaiting: AwaitingInput,
    },
    Done {
        thread_id: ThreadId,
        result: OptionSet,
        document_id: Option<DocumentId>,
    },
}

impl RunOutcome {
    pub fn thread_id(&self) -> ThreadId {
        match self {
            RunOutcome::Suspended { thread_id, .. } | RunOutcome::Done { thread_id, .. } => {
                *thread_id
            }
        }
    }

    pub fn is_suspended(&self) -> bool {
        matches!(self, RunOutcome::Suspended { .. })
    }

    pub fn is_done(&self) -> bool {
        matches!(self, RunOutcome::Done { .. })
    }

    /// Missing slot labels when suspended for requirements.
    pub fn missing_slot_labels(&self) -> Vec<&'static str> {
        match self {
            RunOutcome::Suspended {
                awaiting: AwaitingInput::Requirements { missing_slots },
                ..
            } => missing_slots.iter().map(RequiredSlot::label).collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suspended_serializes_with_status_tag() {
        let outcome = RunOutcome::Suspended {
            thread_id: ThreadId::new(),
            prompt_text: "Which option?".to_string(),
            awaiting: AwaitingInput::Selection { option_count: 3 },
        };

        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["status"], "suspended");
        assert_eq!(json["prompt_text"], "Which option?");
        assert_eq!(json["awaiting"]["kind"], "selection");
    }

    #[test]
    fn missing_slot_labels_follow_slot_order() {
        let outcome = RunOutcome::Suspended {
            thread_id: ThreadId::new(),
            prompt_text: String::new(),
            awaiting: AwaitingInput::Requirements {
                missing_slots: RequiredSlot::ALL.to_vec(),
            },
        };

        assert_eq!(
            outcome.missing_slot_labels(),
            vec!["topic", "grade level", "duration"]
        );
    }
}
