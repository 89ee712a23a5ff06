//! Markdown renderings emitted after each step's final result.

use serde::Serialize;

use super::StepContext;
use crate::domain::foundation::Language;
use crate::domain::localization::Preset;
use crate::domain::planning::{KnowledgeGraph, ProjectOption, StandardsAlignment};

/// `snake_case` serde name of an enum value as readable words.
fn words<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(|s| s.replace('_', " ")))
        .unwrap_or_default()
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "—".to_string()
    } else {
        items.join(", ")
    }
}

/// Label preset without its bullet prefix.
fn label(ctx: &StepContext, preset: Preset, language: Language) -> String {
    ctx.preset(preset, language)
        .trim()
        .trim_start_matches('•')
        .trim()
        .to_string()
}

pub(super) fn standards(
    ctx: &StepContext,
    alignment: &StandardsAlignment,
    language: Language,
) -> Vec<String> {
    let mut out = vec![ctx.preset(Preset::RecommendedStandards, language)];
    for std in &alignment.standards {
        let block = format!(
            "- **{}** ({}, Grade {}):\n    {}\n    • Bloom’s: {}, DOK: {}\n",
            std.code,
            std.standard_type,
            std.grade_level,
            std.description,
            capitalize(&words(&std.primary_bloom_level)),
            capitalize(&words(&std.dok_level)),
        );
        out.push(ctx.localize(&block, language));
    }
    if !alignment.prerequisites.is_empty() {
        let body = format!("{}\n", alignment.prerequisites.join(", "));
        out.push(
            ctx.preset(Preset::PrerequisitesPrefix, language) + &ctx.localize(&body, language),
        );
    }
    if !alignment.cross_curricular_connections.is_empty() {
        let body = format!("{}\n", alignment.cross_curricular_connections.join(", "));
        out.push(
            ctx.preset(Preset::CrossCurricularPrefix, language) + &ctx.localize(&body, language),
        );
    }
    out
}

pub(super) fn enrichment(
    ctx: &StepContext,
    kg: &KnowledgeGraph,
    language: Language,
) -> Vec<String> {
    let line = |text: String| ctx.localize(&format!("  • {}", text), language) + "\n";

    let mut out = vec![
        ctx.preset(Preset::KgInsightsHeader, language),
        ctx.preset(Preset::ProjectTopicsHeader, language),
    ];
    out.extend(
        kg.project_topics
            .iter()
            .map(|t| line(format!("{}: {}", t.name, t.description))),
    );
    out.push(ctx.preset(Preset::CrossSubjectsHeader, language));
    out.extend(
        kg.cross_subject_connections
            .iter()
            .map(|c| line(format!("{} → {}", c.subject, c.connection))),
    );
    out.push(ctx.preset(Preset::RealWorldHeader, language));
    out.extend(
        kg.real_world_applications
            .iter()
            .map(|a| line(format!("{}: {}", a.application, a.details))),
    );
    out.push(ctx.preset(Preset::ResourcesHeader, language));
    out.extend(
        kg.curriculum_resources
            .iter()
            .map(|r| format!("  • {}: {}\n", ctx.localize(&r.title, language), r.url)),
    );
    out.push(ctx.preset(Preset::ImplementationHeader, language));
    out.extend(kg.pbl_integration_ideas.iter().map(|idea| line(idea.clone())));
    out.push(format!(
        "{}{:.0}%\n",
        ctx.preset(Preset::ConfidencePrefix, language),
        kg.relevance_confidence * 100.0
    ));
    out
}

/// Summary block of one option, numbered from 1.
pub(super) fn option_summary(
    ctx: &StepContext,
    number: usize,
    option: &ProjectOption,
    language: Language,
) -> String {
    let loc = |text: &str| ctx.localize(text, language);
    format!(
        "> **{} {}:** {}\n- **{}:** {}\n- **{}:** {}\n- **{}:** {}\n- **{}:** {}\n- **{}:** {}\n- **{}:** {}\n",
        label(ctx, Preset::OptionLabel, language),
        number,
        loc(option.display_name()),
        label(ctx, Preset::RationaleLabel, language),
        loc(&option.template_rationale),
        label(ctx, Preset::DrivingQuestionLabel, language),
        loc(&option.driving_question),
        label(ctx, Preset::EndProductLabel, language),
        loc(&option.end_product),
        label(ctx, Preset::KeySkillsLabel, language),
        loc(&or_dash(&option.key_skills)),
        label(ctx, Preset::LearningObjectivesLabel, language),
        loc(&or_dash(&option.learning_objectives)),
        label(ctx, Preset::AssessmentSummaryLabel, language),
        loc(&option.assessment_summary),
    )
}

pub(super) fn options(
    ctx: &StepContext,
    options: &[ProjectOption],
    language: Language,
) -> Vec<String> {
    let mut out = vec![ctx.preset(Preset::ProjectOptionsHeader, language)];
    for (i, option) in options.iter().enumerate() {
        if i > 0 {
            out.push("\n---\n".to_string());
        }
        out.push(option_summary(ctx, i + 1, option, language));
    }
    out.push("\n".to_string());
    out
}

/// Full details of the chosen option.
pub(super) fn selection(
    ctx: &StepContext,
    number: usize,
    option: &ProjectOption,
    language: Language,
) -> Vec<String> {
    let mut details = option_summary(ctx, number, option, language);
    if !option.differentiation_notes.trim().is_empty() {
        details.push_str(&format!(
            "- **Differentiation notes:** {}\n",
            ctx.localize(&option.differentiation_notes, language)
        ));
    }
    if !option.template_id.is_empty() {
        details.push_str(&format!("- **Template id:** {}\n", option.template_id));
    }

    vec![
        ctx.preset(Preset::FullDetailsHeader, language) + "\n",
        details,
        "\n---\n\n".to_string(),
        ctx.preset(Preset::ProjectReady, language) + "\n",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::planning::BloomLevel;

    #[test]
    fn enum_values_render_as_words() {
        assert_eq!(words(&BloomLevel::Analyze), "analyze");
        assert_eq!(
            capitalize(&words(&crate::domain::planning::DokLevel::StrategicThinking)),
            "Strategic thinking"
        );
    }

    #[test]
    fn empty_lists_render_as_dash() {
        assert_eq!(or_dash(&[]), "—");
        assert_eq!(or_dash(&["a".into(), "b".into()]), "a, b");
    }
}
