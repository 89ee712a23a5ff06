//! Application layer - Conversation graph, step functions and handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Commands (`SessionRunner`, `RefineProjectHandler`) write; the version
//! history query reads.

pub mod emitter;
pub mod graph;
pub mod handlers;
pub mod steps;
pub mod streaming;

pub use emitter::{EmissionReceiver, Emitter};
pub use graph::ConversationGraph;
pub use handlers::{
    GetVersionHistoryError, GetVersionHistoryHandler, GetVersionHistoryQuery,
    HandleMessageCommand, HandleMessageError, RefineProjectCommand, RefineProjectError,
    RefineProjectHandler, RefineProjectResult, SessionRunner,
};
pub use steps::{PipelineSettings, StepContext, StepFailure};
