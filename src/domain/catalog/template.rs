//! Project templates and how well they fit a teacher's request.

use serde::{Deserialize, Serialize};

use super::configuration::DimensionalConfiguration;
use super::dimensions::{
    AuthenticityLevel, CognitiveComplexity, DeliveryMode, DurationClass, ProductComplexity,
    ScaffoldingIntensity, SocialStructure,
};
use crate::domain::planning::ProjectDetails;

/// Pedagogical intent a template serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemplateIntent {
    ScientificInquiry,
    EngineeringDesign,
    MathematicalModeling,
    ResearchInvestigation,
    HistoricalInquiry,
    CommunityAction,
    CreativeExpression,
    TechnologyFocused,
    ServiceLearning,
    Interdisciplinary,
    SkillApplication,
    DesignThinking,
    DebateArgumentation,
    Entrepreneurship,
}

/// Rough implementation effort of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityTier {
    Low,
    Medium,
    High,
}

/// Allowed values per axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityMatrix {
    pub duration: Vec<DurationClass>,
    pub social_structure: Vec<SocialStructure>,
    pub cognitive_complexity: Vec<CognitiveComplexity>,
    pub authenticity: Vec<AuthenticityLevel>,
    pub scaffolding: Vec<ScaffoldingIntensity>,
    pub product_complexity: Vec<ProductComplexity>,
    pub delivery_mode: Vec<DeliveryMode>,
}

impl CompatibilityMatrix {
    /// True iff every axis value of `config` is allowed.
    pub fn allows(&self, config: &DimensionalConfiguration) -> bool {
        self.duration.contains(&config.duration)
            && self.social_structure.contains(&config.social_structure)
            && self.cognitive_complexity.contains(&config.cognitive_complexity)
            && self.authenticity.contains(&config.authenticity_level)
            && self.scaffolding.contains(&config.scaffolding_intensity)
            && self.product_complexity.contains(&config.product_complexity)
            && self.delivery_mode.contains(&config.delivery_mode)
    }

    /// Axes on which `config` is rejected, by name.
    pub fn conflicts(&self, config: &DimensionalConfiguration) -> Vec<&'static str> {
        let mut conflicts = Vec::new();
        if !self.duration.contains(&config.duration) {
            conflicts.push("duration");
        }
        if !self.social_structure.contains(&config.social_structure) {
            conflicts.push("social_structure");
        }
        if !self.cognitive_complexity.contains(&config.cognitive_complexity) {
            conflicts.push("cognitive_complexity");
        }
        if !self.authenticity.contains(&config.authenticity_level) {
            conflicts.push("authenticity_level");
        }
        if !self.scaffolding.contains(&config.scaffolding_intensity) {
            conflicts.push("scaffolding_intensity");
        }
        if !self.product_complexity.contains(&config.product_complexity) {
            conflicts.push("product_complexity");
        }
        if !self.delivery_mode.contains(&config.delivery_mode) {
            conflicts.push("delivery_mode");
        }
        conflicts
    }
}

/// A reusable project design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub template_id: String,
    pub intent: TemplateIntent,
    pub display_name: String,
    pub description: String,
    pub driving_question_template: String,
    pub strengths: Vec<String>,
    pub subject_areas: Vec<String>,
    pub complexity: ComplexityTier,
    pub compatibility: CompatibilityMatrix,
}

impl Template {
    pub fn is_compatible_with(&self, config: &DimensionalConfiguration) -> bool {
        self.compatibility.allows(config)
    }

    fn has_strength(&self, strength: &str) -> bool {
        self.strengths.iter().any(|s| s == strength)
    }
}

/// How well one template matches the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFit {
    pub template_id: String,
    pub template_name: String,
    pub score: i32,
    pub reasons: Vec<String>,
    pub compatible: bool,
}

/// Scores a template against the teacher's signals.
pub fn evaluate_fit(
    template: &Template,
    details: &ProjectDetails,
    config: &DimensionalConfiguration,
) -> TemplateFit {
    let signals = &details.indicators;
    let mut score = 0;
    let mut reasons = Vec::new();

    #[rustfmt::skip]
    let matches: [(bool, &str, i32, &str); 8] = [
        (signals.community_connection_desired, "community_connection", 3, "Strong community engagement match"),
        (signals.hands_on_emphasis, "hands_on", 2, "Hands-on activity alignment"),
        (signals.research_intensive, "research", 2, "Research focus alignment"),
        (signals.includes_design_challenge, "design_thinking", 3, "Design challenge match"),
        (signals.requires_experimentation, "experimentation", 3, "Experimentation requirement match"),
        (signals.collaborative_emphasis, "teamwork", 1, "Collaboration support"),
        (signals.iterative_emphasis, "iteration", 1, "Iteration support"),
        (signals.interdisciplinary_emphasis, "cross_curricular", 1, "Interdisciplinary support"),
    ];
    for (wanted, strength, points, reason) in matches {
        if wanted && template.has_strength(strength) {
            score += points;
            reasons.push(reason.to_string());
        }
    }

    if let Some(area) = details.content_area_focus.as_deref() {
        let area = area.trim().to_lowercase().replace(' ', "_");
        if !area.is_empty()
            && template
                .subject_areas
                .iter()
                .any(|s| *s == area || s == "multiple")
        {
            score += 2;
            reasons.push(format!("Subject area alignment ({})", area));
        }
    }

    if template.complexity == ComplexityTier::High {
        if signals.resource_limitations_mentioned {
            score -= 1;
            reasons.push("May be challenging with resource limitations".to_string());
        }
        if signals.time_constraints_noted {
            score -= 1;
            reasons.push("May be challenging with time constraints".to_string());
        }
    }

    TemplateFit {
        template_id: template.template_id.clone(),
        template_name: template.display_name.clone(),
        score,
        reasons,
        compatible: template.is_compatible_with(config),
    }
}

/// Ranks templates best first: compatible before incompatible, then by
/// score, then by id for a stable order.
pub fn rank_templates(
    templates: &[Template],
    details: &ProjectDetails,
    config: &DimensionalConfiguration,
) -> Vec<TemplateFit> {
    let mut fits: Vec<TemplateFit> = templates
        .iter()
        .map(|t| evaluate_fit(t, details, config))
        .collect();
    fits.sort_by(|a, b| {
        b.compatible
            .cmp(&a.compatible)
            .then(b.score.cmp(&a.score))
            .then(a.template_id.cmp(&b.template_id))
    });
    fits
}
