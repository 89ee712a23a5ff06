//! Topic enrichment payload built around the primary standard.

use serde::{Deserialize, Serialize};

use super::payload::{string_list, SchemaRef, StructuredPayload};

/// Placeholder text used by the fallback payload.
pub const NO_DATA: &str = "<no data>";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectTopic {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectConnection {
    pub subject: String,
    pub connection: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealWorldApplication {
    pub application: String,
    pub details: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurriculumResource {
    pub title: String,
    pub url: String,
}

/// Result of the enrichment step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeGraph {
    pub standard_code: String,
    pub standard_description: String,
    pub project_topics: Vec<ProjectTopic>,
    pub cross_subject_connections: Vec<SubjectConnection>,
    pub real_world_applications: Vec<RealWorldApplication>,
    pub curriculum_resources: Vec<CurriculumResource>,
    #[serde(deserialize_with = "string_list")]
    pub pbl_integration_ideas: Vec<String>,
    pub relevance_confidence: f32,
    #[serde(deserialize_with = "string_list")]
    pub validation_issues: Vec<String>,
}

impl KnowledgeGraph {
    /// Placeholder substituted when enrichment fails. Every list holds one
    /// `<no data>` entry so renderers never see an empty section.
    pub fn fallback(
        standard_code: &str,
        standard_description: &str,
        issues: Vec<String>,
    ) -> Self {
        let mut validation_issues = issues;
        if validation_issues.is_empty() {
            validation_issues.push("enrichment could not be generated".to_string());
        }

        Self {
            standard_code: standard_code.to_string(),
            standard_description: standard_description.to_string(),
            project_topics: vec![ProjectTopic {
                name: NO_DATA.to_string(),
                description: NO_DATA.to_string(),
            }],
            cross_subject_connections: vec![SubjectConnection {
                subject: NO_DATA.to_string(),
                connection: NO_DATA.to_string(),
            }],
            real_world_applications: vec![RealWorldApplication {
                application: NO_DATA.to_string(),
                details: NO_DATA.to_string(),
            }],
            curriculum_resources: vec![CurriculumResource {
                title: NO_DATA.to_string(),
                url: String::new(),
            }],
            pbl_integration_ideas: vec!["(no implementation ideas)".to_string()],
            relevance_confidence: 0.0,
            validation_issues,
        }
    }

    /// True when this is the placeholder rather than a generated result.
    pub fn is_fallback(&self) -> bool {
        self.relevance_confidence == 0.0 && !self.validation_issues.is_empty()
    }
}

impl StructuredPayload for KnowledgeGraph {
    fn schema() -> SchemaRef {
        SchemaRef::KnowledgeGraph
    }

    fn check_invariants(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.project_topics.is_empty() {
            issues.push("project_topics is empty".to_string());
        }
        if !(0.0..=1.0).contains(&self.relevance_confidence) {
            issues.push(format!(
                "relevance_confidence {} outside 0..1",
                self.relevance_confidence
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
        let graph = KnowledgeGraph::from_value(json!({
            "standard_code": "5-ESS1-1",
            "project_topics": [{"name": "Star brightness", "description": "Why stars differ"}],
            "curriculum_resources": [{"title": "NASA Space Place", "url": "https://spaceplace.nasa.gov"}],
            "pbl_integration_ideas": ["Build a scale model"],
            "relevance_confidence": 0.8
        }))
        .unwrap();

        assert_eq!(graph.project_topics[0].name, "Star brightness");
        assert!(!graph.is_fallback());
    }

    #[test]
    fn missing_topics_violate_invariant() {
        let result = KnowledgeGraph::from_value(json!({"relevance_confidence": 0.5}));
        assert!(result.is_err());
    }

    #[test]
    fn fallback_has_placeholder_entries() {
        let graph = KnowledgeGraph::fallback("UNKNOWN", "", vec!["timeout".into()]);

        assert_eq!(graph.project_topics[0].name, NO_DATA);
        assert_eq!(graph.pbl_integration_ideas, vec!["(no implementation ideas)"]);
        assert!(graph.is_fallback());
        assert!(graph.check_invariants().is_empty());
    }
}
