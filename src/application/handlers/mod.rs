//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod planning;
pub mod refinement;

pub use planning::{HandleMessageCommand, HandleMessageError, SessionRunner};
pub use refinement::{
    GetVersionHistoryError, GetVersionHistoryHandler, GetVersionHistoryQuery,
    RefineProjectCommand, RefineProjectError, RefineProjectHandler, RefineProjectResult,
};
