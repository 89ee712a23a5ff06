//! Deterministic last-resort edits when the generator changes nothing.

use crate::domain::planning::ProjectOption;

/// Edit produced by a fallback transformer.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackPatch {
    pub updated: ProjectOption,
    pub affected_fields: Vec<String>,
    pub change_summary: String,
}

/// Strategy slot for the minimal edit applied after generation failed to
/// change the selection twice.
pub trait FallbackTransformer: Send + Sync {
    fn transform(&self, change_request: &str, current: &ProjectOption) -> FallbackPatch;
}

/// Default strategy: rewrites the driving question when the request names it.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordFallback;

const DRIVING_QUESTION_KEYWORDS: [&str; 3] = ["driving question", "driving_question", "dq"];

impl KeywordFallback {
    fn mentions_driving_question(request: &str) -> bool {
        let lower = request.to_lowercase();
        DRIVING_QUESTION_KEYWORDS.iter().any(|k| {
            if *k == "dq" {
                lower
                    .split(|c: char| !c.is_alphanumeric())
                    .any(|token| token == "dq")
            } else {
                lower.contains(k)
            }
        })
    }
}

impl FallbackTransformer for KeywordFallback {
    fn transform(&self, change_request: &str, current: &ProjectOption) -> FallbackPatch {
        let request = change_request.trim();
        let mut updated = current.clone();
        let mut affected_fields = Vec::new();

        if Self::mentions_driving_question(request) {
            let question = format!("How can we refine our project to address: {}?", request);
            if updated.driving_question != question {
                updated.driving_question = question;
                affected_fields.push("driving_question".to_string());
            }
        }

        FallbackPatch {
            updated,
            affected_fields,
            change_summary: format!(
                "Applied deterministic fallback patch based on request: {}",
                request
            ),
        }
    }
}
