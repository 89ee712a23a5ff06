//! Language a conversation is presented in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Supported presentation languages.
///
/// Serialized as the ISO 639-1 code; parsing also accepts the display name
/// used by front-ends ("Spanish", "Français", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en", alias = "English")]
    English,
    #[serde(rename = "es", alias = "Spanish")]
    Spanish,
    #[serde(rename = "fr", alias = "French")]
    French,
}

impl Language {
    /// All supported languages.
    pub const ALL: [Language; 3] = [Language::English, Language::Spanish, Language::French];

    /// ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::French => "fr",
        }
    }

    /// English display name.
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Language {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" | "inglés" | "anglais" => Ok(Language::English),
            "es" | "spanish" | "español" | "espanol" | "espagnol" => Ok(Language::Spanish),
            "fr" | "french" | "français" | "francais" | "francés" => Ok(Language::French),
            other => Err(ValidationError::UnsupportedLanguage(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_and_display_names() {
        assert_eq!("es".parse::<Language>().unwrap(), Language::Spanish);
        assert_eq!("French".parse::<Language>().unwrap(), Language::French);
        assert_eq!(" English ".parse::<Language>().unwrap(), Language::English);
    }

    #[test]
    fn rejects_unknown_language() {
        assert!("klingon".parse::<Language>().is_err());
    }

    #[test]
    fn serializes_as_code_and_accepts_name_alias() {
        assert_eq!(serde_json::to_string(&Language::French).unwrap(), "\"fr\"");
        let lang: Language = serde_json::from_str("\"Spanish\"").unwrap();
        assert_eq!(lang, Language::Spanish);
    }

    #[test]
    fn defaults_to_english() {
        assert_eq!(Language::default(), Language::English);
    }
}
