//! Curriculum standards alignment payload.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::payload::{string_list, SchemaRef, StructuredPayload};

/// Code of the placeholder standard substituted when alignment fails.
pub const FALLBACK_STANDARD_CODE: &str = "DEFAULT-001";

/// Standards framework a code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardType {
    Ngss,
    CcssMath,
    CcssEla,
    Ncss,
    #[default]
    #[serde(other)]
    Other,
}

impl fmt::Display for StandardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StandardType::Ngss => "NGSS",
            StandardType::CcssMath => "CCSS_MATH",
            StandardType::CcssEla => "CCSS_ELA",
            StandardType::Ncss => "NCSS",
            StandardType::Other => "OTHER",
        };
        write!(f, "{}", s)
    }
}

/// Bloom's taxonomy level targeted by a standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BloomLevel {
    Remember,
    #[default]
    Understand,
    Apply,
    Analyze,
    Evaluate,
    Create,
}

/// Webb's depth-of-knowledge level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DokLevel {
    #[default]
    Recall,
    SkillConcept,
    StrategicThinking,
    ExtendedThinking,
}

/// One recommended standard in the context of the project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextualStandard {
    pub code: String,
    #[serde(rename = "type")]
    pub standard_type: StandardType,
    pub description: String,
    pub grade_level: String,
    pub is_valid: bool,
    pub primary_bloom_level: BloomLevel,
    pub dok_level: DokLevel,
    #[serde(deserialize_with = "string_list")]
    pub vocabulary: Vec<String>,
}

/// Result of the standards-alignment step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardsAlignment {
    pub standards: Vec<ContextualStandard>,
    #[serde(deserialize_with = "string_list")]
    pub prerequisites: Vec<String>,
    #[serde(deserialize_with = "string_list")]
    pub cross_curricular_connections: Vec<String>,
    pub alignment_confidence: f32,
    #[serde(deserialize_with = "string_list")]
    pub validation_issues: Vec<String>,
}

impl StandardsAlignment {
    /// Placeholder substituted when the generator fails or returns an
    /// unusable result. Non-empty and flagged invalid.
    pub fn fallback(grade_level: &str, issues: Vec<String>) -> Self {
        let mut validation_issues: Vec<String> =
            issues.into_iter().map(|i| format!("Error: {}", i)).collect();
        if validation_issues.is_empty() {
            validation_issues.push("Error: standards could not be determined".to_string());
        }

        Self {
            standards: vec![ContextualStandard {
                code: FALLBACK_STANDARD_CODE.to_string(),
                standard_type: StandardType::Ngss,
                description: "Standards could not be determined automatically".to_string(),
                grade_level: grade_level.to_string(),
                is_valid: false,
                primary_bloom_level: BloomLevel::Understand,
                dok_level: DokLevel::Recall,
                vocabulary: Vec::new(),
            }],
            prerequisites: Vec::new(),
            cross_curricular_connections: Vec::new(),
            alignment_confidence: 0.0,
            validation_issues,
        }
    }

    /// The standard later steps work from.
    pub fn primary(&self) -> Option<&ContextualStandard> {
        self.standards.first()
    }

    /// True when this is the placeholder rather than a generated result.
    pub fn is_fallback(&self) -> bool {
        self.primary()
            .map(|s| s.code == FALLBACK_STANDARD_CODE && !s.is_valid)
            .unwrap_or(true)
    }
}

impl StructuredPayload for StandardsAlignment {
    fn schema() -> SchemaRef {
        SchemaRef::StandardsAlignment
    }

    fn check_invariants(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.standards.is_empty() {
            issues.push("standards list is empty".to_string());
        }
        if self.standards.iter().any(|s| s.code.trim().is_empty()) {
            issues.push("standard without a code".to_string());
        }
        if !(0.0..=1.0).contains(&self.alignment_confidence) {
            issues.push(format!(
                "alignment_confidence {} outside 0..1",
                self.alignment_confidence
            ));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_generator_payload() {
        let alignment = StandardsAlignment::from_value(json!({
            "standards": [{
                "code": "5-ESS1-1",
                "type": "ngss",
                "description": "Support an argument about star brightness",
                "grade_level": "5",
                "is_valid": true,
                "primary_bloom_level": "analyze",
                "dok_level": "strategic_thinking"
            }],
            "prerequisites": ["Basic light concepts"],
            "alignment_confidence": 0.9
        }))
        .unwrap();

        let primary = alignment.primary().unwrap();
        assert_eq!(primary.code, "5-ESS1-1");
        assert_eq!(primary.dok_level, DokLevel::StrategicThinking);
        assert!(!alignment.is_fallback());
    }

    #[test]
    fn unknown_standard_type_maps_to_other() {
        let standard: ContextualStandard =
            serde_json::from_value(json!({"code": "X.1", "type": "iste"})).unwrap();
        assert_eq!(standard.standard_type, StandardType::Other);
    }

    #[test]
    fn empty_standards_violate_invariant() {
        let err = StandardsAlignment::from_value(json!({"standards": []})).unwrap_err();
        assert!(err.issues().iter().any(|i| i.contains("empty")));
    }

    #[test]
    fn fallback_is_non_empty_and_flagged() {
        let fallback = StandardsAlignment::fallback("5", vec!["service unavailable".into()]);

        assert_eq!(fallback.standards.len(), 1);
        assert!(fallback.is_fallback());
        assert_eq!(fallback.alignment_confidence, 0.0);
        assert_eq!(fallback.validation_issues, vec!["Error: service unavailable"]);
        assert!(fallback.check_invariants().is_empty());
    }
}
