//! Localizer Port - Fixed strings and text translation.

use crate::domain::foundation::Language;
use crate::domain::localization::Preset;

/// Port for user-facing text in the session language.
///
/// Both operations are pure lookups and never fail; unknown text passes
/// through unchanged.
pub trait Localizer: Send + Sync {
    /// The preset in `language`, falling back to English.
    fn resolve(&self, preset: Preset, language: Language) -> String;

    /// `text` translated from `source` to `target`.
    fn translate(&self, text: &str, source: Language, target: Language) -> String;
}
