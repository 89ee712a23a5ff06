//! Content Store Port - Read-only catalog of project templates.

use crate::domain::catalog::{Template, TemplateIntent};

/// Port for template lookups.
///
/// The catalog is static; there is no write path.
pub trait ContentStore: Send + Sync {
    /// All templates, in a stable order.
    fn list_templates(&self) -> Vec<Template>;

    /// The template with `template_id`, if it exists.
    fn get_template(&self, template_id: &str) -> Option<Template>;

    /// Templates serving `intent`.
    fn find_by_intent(&self, intent: TemplateIntent) -> Vec<Template> {
        self.list_templates()
            .into_iter()
            .filter(|t| t.intent == intent)
            .collect()
    }
}
