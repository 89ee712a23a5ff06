//! Refinement domain module.
//!
//! Edits to a persisted selection: the edit result, the diff it is checked
//! against, the fallback strategy slot and the two-node pipeline.

mod fallback;
mod result;
mod step;

pub use fallback::{FallbackPatch, FallbackTransformer, KeywordFallback};
pub use result::{diff_fields, warnings, RefinementResult, WATCHED_FIELDS};
pub use step::RefinementStep;
