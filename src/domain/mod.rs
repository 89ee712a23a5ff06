//! Domain layer containing the planner's types and rules.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, language, timestamps, errors)
//! - `planning` - Payloads produced along the pipeline
//! - `conversation` - Step graph, conversation state, suspension
//! - `catalog` - Project templates and design axes
//! - `refinement` - Edits to a persisted selection
//! - `document` - Immutable versioned snapshots
//! - `localization` - Keys of fixed user-facing strings

pub mod catalog;
pub mod conversation;
pub mod document;
pub mod foundation;
pub mod localization;
pub mod planning;
pub mod refinement;
