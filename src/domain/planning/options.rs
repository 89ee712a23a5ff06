//! Candidate project options and the selection made among them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::payload::{string_list, SchemaRef, StructuredPayload};
use crate::domain::foundation::DocumentId;

/// One candidate project design.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectOption {
    pub title: String,
    pub focus_approach: String,
    pub driving_question: String,
    pub end_product: String,
    #[serde(deserialize_with = "string_list")]
    pub key_skills: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub learning_objectives: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub key_activities: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub assessment_highlights: Vec<String>,
    pub assessment_summary: String,
    pub differentiation_notes: String,
    pub template_id: String,
    pub template_name: String,
    pub template_rationale: String,
}

impl ProjectOption {
    /// Placeholder option used when generation fails.
    pub fn placeholder(index: usize) -> Self {
        Self {
            title: format!("Project Option {}", index + 1),
            template_id: format!("fallback_{}", index),
            template_name: format!("Project Option {}", index + 1),
            template_rationale: "Generated options were unavailable".to_string(),
            ..Default::default()
        }
    }

    /// Display name, preferring the template name as the original
    /// renderer does.
    pub fn display_name(&self) -> &str {
        if !self.template_name.trim().is_empty() {
            &self.template_name
        } else {
            &self.title
        }
    }
}

/// Raw option-generation result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectOptions {
    pub response: String,
    #[serde(alias = "options")]
    pub project_options: Vec<ProjectOption>,
}

impl StructuredPayload for ProjectOptions {
    fn schema() -> SchemaRef {
        SchemaRef::ProjectOptions
    }

    fn check_invariants(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.project_options.is_empty() {
            issues.push("project_options is empty".to_string());
        }
        for (i, option) in self.project_options.iter().enumerate() {
            if option.display_name().trim().is_empty() {
                issues.push(format!("option {} has no name", i + 1));
            }
        }
        issues
    }
}

/// Why a selection could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Choice {choice} is outside 1..={max}")]
    OutOfRange { choice: i64, max: usize },

    #[error("No recognizable choice in the input")]
    Unrecognized,
}

/// Generated options plus the teacher's selection.
///
/// `selection_complete` is true exactly when `selected_index` points into
/// `options`; both are only changed through [`OptionSet::select`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSet {
    options: Vec<ProjectOption>,
    selected_index: Option<usize>,
    selection_complete: bool,
    saved_document_id: Option<DocumentId>,
    validation_issues: Vec<String>,
}

impl OptionSet {
    /// Wraps validated options, keeping at most `limit` of them.
    pub fn new(mut options: Vec<ProjectOption>, limit: usize) -> Self {
        options.truncate(limit.max(1));
        Self {
            options,
            selected_index: None,
            selection_complete: false,
            saved_document_id: None,
            validation_issues: Vec::new(),
        }
    }

    /// Placeholder set of `count` options flagged with the given issues.
    pub fn fallback(count: usize, issues: Vec<String>) -> Self {
        let mut set = Self::new((0..count.max(1)).map(ProjectOption::placeholder).collect(), count);
        set.validation_issues = if issues.is_empty() {
            vec!["project options could not be generated".to_string()]
        } else {
            issues
        };
        set
    }

    pub fn options(&self) -> &[ProjectOption] {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    pub fn selection_complete(&self) -> bool {
        self.selection_complete
    }

    pub fn validation_issues(&self) -> &[String] {
        &self.validation_issues
    }

    pub fn saved_document_id(&self) -> Option<DocumentId> {
        self.saved_document_id
    }

    /// The selected option, once a selection has been made.
    pub fn selected(&self) -> Option<&ProjectOption> {
        self.selected_index.and_then(|i| self.options.get(i))
    }

    /// Marks the zero-based `index` as selected.
    pub fn select(&mut self, index: usize) -> Result<&ProjectOption, SelectionError> {
        if index >= self.options.len() {
            return Err(SelectionError::OutOfRange {
                choice: index as i64 + 1,
                max: self.options.len(),
            });
        }
        self.selected_index = Some(index);
        self.selection_complete = true;
        Ok(&self.options[index])
    }

    /// Records the id of the document persisted for this selection.
    pub fn record_saved_document(&mut self, id: Option<DocumentId>) {
        self.saved_document_id = id;
    }
}
