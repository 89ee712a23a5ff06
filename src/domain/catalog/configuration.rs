//! A concrete choice on every design axis.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::dimensions::{
    AuthenticityLevel, CognitiveComplexity, DeliveryMode, DurationClass, ProductComplexity,
    ScaffoldingIntensity, SocialStructure,
};
use crate::domain::planning::ProjectDetails;

static WEEKS: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(?:-\s*\d+\s*)?(?:weeks?|semanas?|semaines?)").ok());

/// One value per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DimensionalConfiguration {
    pub duration: DurationClass,
    pub social_structure: SocialStructure,
    pub cognitive_complexity: CognitiveComplexity,
    pub authenticity_level: AuthenticityLevel,
    pub scaffolding_intensity: ScaffoldingIntensity,
    pub product_complexity: ProductComplexity,
    pub delivery_mode: DeliveryMode,
}

impl DimensionalConfiguration {
    /// Derives a configuration from what the teacher has told us.
    ///
    /// Scaffolding and delivery are not asked about and default to
    /// facilitated, face-to-face.
    pub fn from_requirements(details: &ProjectDetails) -> Self {
        let signals = &details.indicators;

        let cognitive_complexity =
            if signals.includes_design_challenge || signals.requires_experimentation {
                CognitiveComplexity::Synthesis
            } else {
                CognitiveComplexity::Analysis
            };

        Self {
            duration: classify_duration(details.duration_preference.as_deref().unwrap_or("")),
            social_structure: if signals.collaborative_emphasis {
                SocialStructure::Collaborative
            } else {
                SocialStructure::Individual
            },
            cognitive_complexity,
            authenticity_level: if signals.community_connection_desired {
                AuthenticityLevel::Applied
            } else {
                AuthenticityLevel::Anchored
            },
            scaffolding_intensity: ScaffoldingIntensity::Facilitated,
            product_complexity: if signals.includes_design_challenge {
                ProductComplexity::System
            } else {
                ProductComplexity::Portfolio
            },
            delivery_mode: DeliveryMode::FaceToFace,
        }
    }

    /// One-line summary passed to the generator.
    pub fn describe(&self) -> String {
        format!(
            "Duration: {}, Social: {}, Cognitive: {}, Authenticity: {}, Scaffolding: {}, Product: {}, Delivery: {}",
            self.duration,
            self.social_structure,
            self.cognitive_complexity,
            self.authenticity_level,
            self.scaffolding_intensity,
            self.product_complexity,
            self.delivery_mode
        )
    }
}

/// Maps free-form duration text to a duration class. Unknown text is a unit.
pub fn classify_duration(text: &str) -> DurationClass {
    let text = text.to_lowercase();

    if ["semester", "year", "semestre", "año", "année", "annee"]
        .iter()
        .any(|w| text.contains(w))
    {
        return DurationClass::Campaign;
    }
    if ["month", "mes", "mois"].iter().any(|w| text.contains(w)) {
        return DurationClass::Journey;
    }
    if let Some(caps) = WEEKS.as_ref().and_then(|re| re.captures(&text)) {
        let weeks: u32 = caps[1].parse().unwrap_or(1);
        return if weeks <= 4 {
            DurationClass::Unit
        } else {
            DurationClass::Journey
        };
    }
    if ["day", "día", "dia", "jour"].iter().any(|w| text.contains(w)) {
        return DurationClass::Sprint;
    }
    DurationClass::Unit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_text_is_classified() {
        assert_eq!(classify_duration("1-2 days"), DurationClass::Sprint);
        assert_eq!(classify_duration("2 weeks"), DurationClass::Unit);
        assert_eq!(classify_duration("2-3 weeks"), DurationClass::Unit);
        assert_eq!(classify_duration("8 weeks"), DurationClass::Journey);
        assert_eq!(classify_duration("about a month"), DurationClass::Journey);
        assert_eq!(classify_duration("the whole semester"), DurationClass::Campaign);
        assert_eq!(classify_duration("3 semanas"), DurationClass::Unit);
        assert_eq!(classify_duration(""), DurationClass::Unit);
    }

    #[test]
    fn indicators_shape_configuration() {
        let mut details = ProjectDetails {
            duration_preference: Some("2 weeks".into()),
            ..Default::default()
        };
        details.indicators.collaborative_emphasis = true;
        details.indicators.includes_design_challenge = true;
        details.indicators.community_connection_desired = true;

        let config = DimensionalConfiguration::from_requirements(&details);

        assert_eq!(config.duration, DurationClass::Unit);
        assert_eq!(config.social_structure, SocialStructure::Collaborative);
        assert_eq!(config.cognitive_complexity, CognitiveComplexity::Synthesis);
        assert_eq!(config.authenticity_level, AuthenticityLevel::Applied);
        assert_eq!(config.product_complexity, ProductComplexity::System);
    }

    #[test]
    fn defaults_without_signals() {
        let config = DimensionalConfiguration::from_requirements(&ProjectDetails::default());

        assert_eq!(config.social_structure, SocialStructure::Individual);
        assert_eq!(config.cognitive_complexity, CognitiveComplexity::Analysis);
        assert_eq!(config.authenticity_level, AuthenticityLevel::Anchored);
        assert_eq!(config.scaffolding_intensity, ScaffoldingIntensity::Facilitated);
        assert_eq!(config.delivery_mode, DeliveryMode::FaceToFace);
    }
}
