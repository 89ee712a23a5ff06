//! Refinement command and query handlers.

mod get_version_history;
mod refine_project;

pub use get_version_history::{
    GetVersionHistoryError, GetVersionHistoryHandler, GetVersionHistoryQuery,
};
pub use refine_project::{
    RefineProjectCommand, RefineProjectError, RefineProjectHandler, RefineProjectResult,
};
