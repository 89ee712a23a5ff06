//! Structured payload contract shared by every generation step.
//!
//! The generation service returns loosely typed JSON. Each payload type
//! normalizes that JSON exactly once, here at the boundary; the rest of the
//! crate only sees the typed result.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifies the structured-output contract requested from the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaRef {
    ProjectDetails,
    StandardsAlignment,
    KnowledgeGraph,
    ProjectOptions,
    Refinement,
}

impl SchemaRef {
    /// Field of the payload carrying human-readable text that may be
    /// streamed to the user while the result is still partial.
    pub fn preview_field(&self) -> Option<&'static str> {
        match self {
            SchemaRef::ProjectDetails | SchemaRef::ProjectOptions => Some("response"),
            SchemaRef::Refinement => Some("change_summary"),
            SchemaRef::StandardsAlignment | SchemaRef::KnowledgeGraph => None,
        }
    }
}

impl fmt::Display for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SchemaRef::ProjectDetails => "project_details",
            SchemaRef::StandardsAlignment => "standards_alignment",
            SchemaRef::KnowledgeGraph => "knowledge_graph",
            SchemaRef::ProjectOptions => "project_options",
            SchemaRef::Refinement => "refinement",
        };
        write!(f, "{}", s)
    }
}

/// Failure to turn a raw generator payload into a typed one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PayloadError {
    #[error("Payload for {schema} does not match its shape: {reason}")]
    Shape { schema: SchemaRef, reason: String },

    #[error("Payload for {schema} violates its invariants: {}", issues.join("; "))]
    Invariant {
        schema: SchemaRef,
        issues: Vec<String>,
    },
}

impl PayloadError {
    /// Issues describing the failure, suitable for a `validation_issues` list.
    pub fn issues(&self) -> Vec<String> {
        match self {
            PayloadError::Invariant { issues, .. } => issues.clone(),
            other => vec![other.to_string()],
        }
    }
}

/// A typed result of one generation contract.
pub trait StructuredPayload: Serialize + DeserializeOwned + Sized {
    /// The schema this payload answers.
    fn schema() -> SchemaRef;

    /// Checks the payload's invariants, returning one entry per violation.
    fn check_invariants(&self) -> Vec<String>;

    /// Canonical adapter from a raw generator value.
    ///
    /// Succeeds only when the value has the expected shape and satisfies
    /// [`StructuredPayload::check_invariants`].
    fn from_value(value: serde_json::Value) -> Result<Self, PayloadError> {
        let payload: Self =
            serde_json::from_value(value).map_err(|e| PayloadError::Shape {
                schema: Self::schema(),
                reason: e.to_string(),
            })?;

        let issues = payload.check_invariants();
        if issues.is_empty() {
            Ok(payload)
        } else {
            Err(PayloadError::Invariant {
                schema: Self::schema(),
                issues,
            })
        }
    }
}

/// Lenient string list: accepts a list, a single string, or null.
pub(crate) fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<String>),
        One(String),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) if !item.trim().is_empty() => vec![item],
        _ => Vec::new(),
    })
}
