//! Canned payloads for running the planner without a provider.

use serde_json::{json, Value};

use super::mock::{MockGenerationClient, MockResponse};
use crate::domain::planning::SchemaRef;

/// A plausible payload for every schema.
pub fn demo_payload(schema: SchemaRef) -> Value {
    match schema {
        SchemaRef::ProjectDetails => json!({
            "response": "Great! A two week project about the solar system for grade 5 sounds wonderful.",
            "topic": "solar system",
            "grade_level": "5",
            "duration_preference": "2 weeks",
            "hands_on_emphasis": true,
            "collaborative_emphasis": true
        }),
        SchemaRef::StandardsAlignment => json!({
            "standards": [{
                "code": "5-ESS1-1",
                "type": "ngss",
                "description": "Support an argument that differences in the apparent brightness of the sun compared to other stars is due to their relative distances from Earth.",
                "grade_level": "5",
                "is_valid": true,
                "primary_bloom_level": "analyze",
                "dok_level": "strategic_thinking",
                "vocabulary": ["star", "brightness", "distance"]
            }],
            "prerequisites": ["Light travels in straight lines"],
            "cross_curricular_connections": ["Math: scale and ratio"],
            "alignment_confidence": 0.85
        }),
        SchemaRef::KnowledgeGraph => json!({
            "standard_code": "5-ESS1-1",
            "standard_description": "Apparent brightness of stars",
            "project_topics": [
                {"name": "Scale of the solar system", "description": "Model planetary distances"}
            ],
            "cross_subject_connections": [
                {"subject": "Math", "connection": "Ratios and scale models"}
            ],
            "real_world_applications": [
                {"application": "Astronomy outreach", "details": "Planetarium shows"}
            ],
            "curriculum_resources": [
                {"title": "NASA Space Place", "url": "https://spaceplace.nasa.gov"}
            ],
            "pbl_integration_ideas": ["Build a walkable scale model"],
            "relevance_confidence": 0.8
        }),
        SchemaRef::ProjectOptions => json!({
            "response": "Here are three project designs for your class.",
            "project_options": [
                {
                    "title": "Star Light, Star Bright",
                    "template_id": "scientific_inquiry",
                    "template_name": "Scientific Inquiry",
                    "focus_approach": "Students test how distance changes apparent brightness",
                    "driving_question": "Why do some stars look brighter than others?",
                    "end_product": "Lab report and class presentation",
                    "key_skills": ["experimentation", "data analysis"],
                    "template_rationale": "Hands-on experimentation fits the standard"
                },
                {
                    "title": "Solar System Scale Walk",
                    "template_id": "mathematical_modeling",
                    "template_name": "Mathematical Modeling",
                    "focus_approach": "Students build a walkable scale model",
                    "driving_question": "How big is our solar system really?",
                    "end_product": "Scale model tour for another class",
                    "key_skills": ["ratios", "measurement"],
                    "template_rationale": "Scale and ratio connect math to science"
                },
                {
                    "title": "Planetarium Pitch",
                    "template_id": "creative_expression",
                    "template_name": "Creative Expression",
                    "focus_approach": "Teams design a planetarium show segment",
                    "driving_question": "How can we help our families see the stars differently?",
                    "end_product": "Recorded show segment",
                    "key_skills": ["communication", "collaboration"],
                    "template_rationale": "Collaboration and an authentic audience"
                }
            ]
        }),
        SchemaRef::Refinement => json!({
            "updated_selection": {
                "title": "Star Light, Star Bright",
                "template_name": "Scientific Inquiry",
                "driving_question": "How does distance change what we see in the night sky?"
            },
            "change_summary": "Rewrote the driving question",
            "affected_fields": ["driving_question"]
        }),
    }
}

impl MockGenerationClient {
    /// Client answering every schema with [`demo_payload`].
    pub fn demo() -> Self {
        [
            SchemaRef::ProjectDetails,
            SchemaRef::StandardsAlignment,
            SchemaRef::KnowledgeGraph,
            SchemaRef::ProjectOptions,
            SchemaRef::Refinement,
        ]
        .into_iter()
        .fold(Self::new(), |client, schema| {
            client.with_default(schema, MockResponse::Payload(demo_payload(schema)))
        })
    }
}
