//! Refinement result payload and the field diff it is checked against.

use serde::{Deserialize, Serialize};

use crate::domain::planning::{ProjectOption, SchemaRef, StructuredPayload};

/// Warning codes surfaced with a refinement.
pub mod warnings {
    pub const MISSING_CHANGE_REQUEST: &str = "missing_change_request";
    pub const INVALID_SELECTED_OPTION: &str = "invalid_selected_option";
    pub const REFINING_AGENT_ERROR: &str = "refining_agent_error";
    pub const FALLBACK_PATCH_APPLIED: &str = "llm_fallback_patch_applied";
    pub const NO_CHANGE_DETECTED: &str = "no_change_detected";
    pub const AFFECTED_FIELDS_CORRECTED: &str = "affected_fields_corrected";
}

/// Fields compared when computing what a refinement changed.
pub const WATCHED_FIELDS: [&str; 12] = [
    "title",
    "focus_approach",
    "driving_question",
    "end_product",
    "key_skills",
    "learning_objectives",
    "key_activities",
    "assessment_highlights",
    "assessment_summary",
    "template_name",
    "template_rationale",
    "differentiation_notes",
];

/// Outcome of applying a change request to a selected option.
///
/// `updated_selection` is always a full replacement, never a patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementResult {
    #[serde(alias = "updated_project")]
    pub updated_selection: ProjectOption,
    #[serde(default)]
    pub change_summary: String,
    #[serde(default)]
    pub affected_fields: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl RefinementResult {
    /// Result that leaves the selection untouched.
    pub fn unchanged(
        selection: ProjectOption,
        summary: impl Into<String>,
        warning: &str,
    ) -> Self {
        Self {
            updated_selection: selection,
            change_summary: summary.into(),
            affected_fields: Vec::new(),
            warnings: vec![warning.to_string()],
        }
    }

    /// Adds a warning once.
    pub fn warn(&mut self, warning: &str) {
        if !self.warnings.iter().any(|w| w == warning) {
            self.warnings.push(warning.to_string());
        }
    }

    pub fn has_warning(&self, warning: &str) -> bool {
        self.warnings.iter().any(|w| w == warning)
    }

    /// Replaces `affected_fields` with the diff against `before`.
    ///
    /// A non-empty declared list that disagrees with the diff earns an
    /// `affected_fields_corrected` warning; an empty diff earns
    /// `no_change_detected`.
    pub fn reconcile(&mut self, before: &ProjectOption) {
        let computed = diff_fields(before, &self.updated_selection);

        let mut declared = self.affected_fields.clone();
        declared.sort();
        declared.dedup();
        let mut sorted = computed.clone();
        sorted.sort();
        if !declared.is_empty() && declared != sorted {
            self.warn(warnings::AFFECTED_FIELDS_CORRECTED);
        }

        if computed.is_empty() {
            self.warn(warnings::NO_CHANGE_DETECTED);
        }
        self.affected_fields = computed;
    }
}

impl StructuredPayload for RefinementResult {
    fn schema() -> SchemaRef {
        SchemaRef::Refinement
    }

    fn check_invariants(&self) -> Vec<String> {
        if self.updated_selection.display_name().trim().is_empty() {
            vec!["updated selection has no name".to_string()]
        } else {
            Vec::new()
        }
    }
}

/// Watched fields that differ between two options, in watch-list order.
pub fn diff_fields(before: &ProjectOption, after: &ProjectOption) -> Vec<String> {
    WATCHED_FIELDS
        .iter()
        .filter(|field| !field_eq(before, after, field))
        .map(|field| field.to_string())
        .collect()
}

fn field_eq(a: &ProjectOption, b: &ProjectOption, field: &str) -> bool {
    match field {
        "title" => a.title == b.title,
        "focus_approach" => a.focus_approach == b.focus_approach,
        "driving_question" => a.driving_question == b.driving_question,
        "end_product" => a.end_product == b.end_product,
        "key_skills" => a.key_skills == b.key_skills,
        "learning_objectives" => a.learning_objectives == b.learning_objectives,
        "key_activities" => a.key_activities == b.key_activities,
        "assessment_highlights" => a.assessment_highlights == b.assessment_highlights,
        "assessment_summary" => a.assessment_summary == b.assessment_summary,
        "template_name" => a.template_name == b.template_name,
        "template_rationale" => a.template_rationale == b.template_rationale,
        "differentiation_notes" => a.differentiation_notes == b.differentiation_notes,
        _ => true,
    }
}
