//! Localization adapters.

mod preset_localizer;

pub use preset_localizer::PresetLocalizer;
