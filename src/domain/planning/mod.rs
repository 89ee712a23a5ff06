//! Planning module - payloads produced along the pipeline.
//!
//! Every payload that comes back from the generation service is normalized
//! here through [`StructuredPayload::from_value`] and, when that fails,
//! replaced by its documented fallback.

mod knowledge;
mod options;
mod payload;
mod requirements;
mod selection;
mod standards;

pub use knowledge::{
    CurriculumResource, KnowledgeGraph, ProjectTopic, RealWorldApplication, SubjectConnection,
    NO_DATA,
};
pub use options::{OptionSet, ProjectOption, ProjectOptions, SelectionError};
pub use payload::{PayloadError, SchemaRef, StructuredPayload};
pub use requirements::{
    grade_for_age, AgeRange, CollectedRequirements, ProfileIndicators, ProjectDetails,
    RequiredSlot,
};
pub use selection::{parse_selection, UserInput, NEUTRAL_PLACEHOLDER};
pub use standards::{
    BloomLevel, ContextualStandard, DokLevel, StandardType, StandardsAlignment,
    FALLBACK_STANDARD_CODE,
};
