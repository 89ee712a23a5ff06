//! Conversation domain module.
//!
//! The fixed step graph that guides a teacher from a first message to a
//! selected project option, with explicit suspension at the two points
//! where the teacher must answer.

mod errors;
mod outcome;
mod state;
mod step;
mod turn;

pub use errors::ConversationError;
pub use outcome::{AwaitingInput, RunOutcome};
pub use state::{ConversationState, StateUpdate};
pub use step::ConversationStep;
pub use turn::{ConversationTurn, TurnRole};
