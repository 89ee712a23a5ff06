//! Localization domain module.
//!
//! Fixed user-facing strings are addressed through [`Preset`] keys. The
//! text itself lives behind the `Localizer` port so the core never embeds
//! translations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of a fixed user-facing string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    // Requirements collection
    NeedMoreInfo,
    ProvideMissingSlots,
    AllInfoReceived,

    // Standards alignment
    GetStandardsHeader,
    RecommendedStandards,
    PrerequisitesPrefix,
    CrossCurricularPrefix,
    StandardsFallback,

    // Enrichment
    GetKgHeader,
    KgInsightsHeader,
    KgStandardPrefix,
    KgFallback,
    ProjectTopicsHeader,
    CrossSubjectsHeader,
    RealWorldHeader,
    ResourcesHeader,
    ImplementationHeader,
    ConfidencePrefix,

    // Options and selection
    CreatingOptionsHeader,
    ProjectOptionsHeader,
    FallbackOptions,
    OptionLabel,
    RationaleLabel,
    DrivingQuestionLabel,
    EndProductLabel,
    KeySkillsLabel,
    LearningObjectivesLabel,
    AssessmentSummaryLabel,
    ChoicePrompt,
    InvalidChoice,
    FullDetailsHeader,
    ProjectReady,
    SelectionSaved,
    SaveFailed,

    // Refinement
    RefineApplying,
    RefineNoChange,
    RefineSaved,
    RefineNotSaved,
}

impl Preset {
    /// Every preset, in declaration order.
    pub const ALL: [Preset; 38] = [
        Preset::NeedMoreInfo,
        Preset::ProvideMissingSlots,
        Preset::AllInfoReceived,
        Preset::GetStandardsHeader,
        Preset::RecommendedStandards,
        Preset::PrerequisitesPrefix,
        Preset::CrossCurricularPrefix,
        Preset::StandardsFallback,
        Preset::GetKgHeader,
        Preset::KgInsightsHeader,
        Preset::KgStandardPrefix,
        Preset::KgFallback,
        Preset::ProjectTopicsHeader,
        Preset::CrossSubjectsHeader,
        Preset::RealWorldHeader,
        Preset::ResourcesHeader,
        Preset::ImplementationHeader,
        Preset::ConfidencePrefix,
        Preset::CreatingOptionsHeader,
        Preset::ProjectOptionsHeader,
        Preset::FallbackOptions,
        Preset::OptionLabel,
        Preset::RationaleLabel,
        Preset::DrivingQuestionLabel,
        Preset::EndProductLabel,
        Preset::KeySkillsLabel,
        Preset::LearningObjectivesLabel,
        Preset::AssessmentSummaryLabel,
        Preset::ChoicePrompt,
        Preset::InvalidChoice,
        Preset::FullDetailsHeader,
        Preset::ProjectReady,
        Preset::SelectionSaved,
        Preset::SaveFailed,
        Preset::RefineApplying,
        Preset::RefineNoChange,
        Preset::RefineSaved,
        Preset::RefineNotSaved,
    ];

    /// Stable snake_case key.
    pub fn key(&self) -> &'static str {
        match self {
            Preset::NeedMoreInfo => "need_more_info",
            Preset::ProvideMissingSlots => "provide_missing_slots",
            Preset::AllInfoReceived => "all_info_received",
            Preset::GetStandardsHeader => "get_standards_header",
            Preset::RecommendedStandards => "recommended_standards",
            Preset::PrerequisitesPrefix => "prerequisites_prefix",
            Preset::CrossCurricularPrefix => "cross_curricular_prefix",
            Preset::StandardsFallback => "standards_fallback",
            Preset::GetKgHeader => "get_kg_header",
            Preset::KgInsightsHeader => "kg_insights_header",
            Preset::KgStandardPrefix => "kg_standard_prefix",
            Preset::KgFallback => "kg_fallback",
            Preset::ProjectTopicsHeader => "project_topics_header",
            Preset::CrossSubjectsHeader => "cross_subjects_header",
            Preset::RealWorldHeader => "real_world_header",
            Preset::ResourcesHeader => "resources_header",
            Preset::ImplementationHeader => "implementation_header",
            Preset::ConfidencePrefix => "confidence_prefix",
            Preset::CreatingOptionsHeader => "creating_options_header",
            Preset::ProjectOptionsHeader => "project_options_header",
            Preset::FallbackOptions => "fallback_options",
            Preset::OptionLabel => "option_label",
            Preset::RationaleLabel => "rationale_label",
            Preset::DrivingQuestionLabel => "driving_question_label",
            Preset::EndProductLabel => "end_product_label",
            Preset::KeySkillsLabel => "key_skills_label",
            Preset::LearningObjectivesLabel => "learning_objectives_label",
            Preset::AssessmentSummaryLabel => "assessment_summary_label",
            Preset::ChoicePrompt => "choice_prompt",
            Preset::InvalidChoice => "invalid_choice",
            Preset::FullDetailsHeader => "full_details_header",
            Preset::ProjectReady => "project_ready",
            Preset::SelectionSaved => "selection_saved",
            Preset::SaveFailed => "save_failed",
            Preset::RefineApplying => "refine_applying",
            Preset::RefineNoChange => "refine_no_change",
            Preset::RefineSaved => "refine_saved",
            Preset::RefineNotSaved => "refine_not_saved",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Replaces `{name}` placeholders in a resolved preset.
///
/// Unknown placeholders are left as they are.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{}}}", name), value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique() {
        let keys: HashSet<_> = Preset::ALL.iter().map(Preset::key).collect();
        assert_eq!(keys.len(), Preset::ALL.len());
    }

    #[test]
    fn serde_name_matches_key() {
        for preset in Preset::ALL {
            let json = serde_json::to_string(&preset).unwrap();
            assert_eq!(json, format!("\"{}\"", preset.key()));
        }
    }

    #[test]
    fn fill_substitutes_known_placeholders() {
        let text = fill("Between 1 and {max} for {who}", &[("max", "3")]);
        assert_eq!(text, "Between 1 and 3 for {who}");
    }
}
