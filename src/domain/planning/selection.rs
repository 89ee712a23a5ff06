//! Inbound user input and selection parsing.

use serde::{Deserialize, Serialize};

use super::options::SelectionError;
use crate::domain::foundation::Language;

/// Text forwarded to the generator when the teacher sent nothing usable.
pub const NEUTRAL_PLACEHOLDER: &str = "continue";

/// A message from the teacher.
///
/// Front-ends send either plain text or a structured payload; a structured
/// `{"selected_id": n}` is an unambiguous one-based option choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserInput {
    Text(String),
    Selection { selected_id: i64 },
    Structured(serde_json::Value),
}

impl Default for UserInput {
    fn default() -> Self {
        UserInput::Text(String::new())
    }
}

impl From<&str> for UserInput {
    fn from(text: &str) -> Self {
        UserInput::Text(text.to_string())
    }
}

impl From<String> for UserInput {
    fn from(text: String) -> Self {
        UserInput::Text(text)
    }
}

impl UserInput {
    /// Structured selection input for the one-based option `selected_id`.
    pub fn selection(selected_id: i64) -> Self {
        UserInput::Selection { selected_id }
    }

    /// Best textual reading of the input, trimmed.
    ///
    /// Structured payloads contribute their `text` field when present and
    /// their compact JSON otherwise.
    pub fn text(&self) -> String {
        match self {
            UserInput::Text(text) => text.trim().to_string(),
            UserInput::Selection { selected_id } => selected_id.to_string(),
            UserInput::Structured(serde_json::Value::Null) => String::new(),
            UserInput::Structured(serde_json::Value::String(s)) => s.trim().to_string(),
            UserInput::Structured(value) => match value.get("text").and_then(|t| t.as_str()) {
                Some(text) => text.trim().to_string(),
                None => value.to_string(),
            },
        }
    }

    /// Text safe to forward to the generator: never empty.
    pub fn prompt_text(&self) -> String {
        let text = self.text();
        if text.is_empty() {
            NEUTRAL_PLACEHOLDER.to_string()
        } else {
            text
        }
    }

    /// One-based choice carried by a structured payload, if any.
    pub fn structured_choice(&self) -> Option<i64> {
        match self {
            UserInput::Selection { selected_id } => Some(*selected_id),
            UserInput::Structured(value) => match value.get("selected_id")? {
                serde_json::Value::Number(n) => n.as_i64(),
                serde_json::Value::String(s) => s.trim().parse().ok(),
                _ => None,
            },
            UserInput::Text(_) => None,
        }
    }
}

/// Ordinal words recognized per language.
fn ordinal_words(language: Language) -> &'static [(&'static str, i64)] {
    match language {
        Language::English => &[
            ("first", 1),
            ("1st", 1),
            ("second", 2),
            ("2nd", 2),
            ("third", 3),
            ("3rd", 3),
            ("fourth", 4),
            ("4th", 4),
            ("fifth", 5),
            ("5th", 5),
            ("last", -1),
        ],
        Language::Spanish => &[
            ("primera", 1),
            ("primero", 1),
            ("primer", 1),
            ("segunda", 2),
            ("segundo", 2),
            ("tercera", 3),
            ("tercero", 3),
            ("tercer", 3),
            ("cuarta", 4),
            ("cuarto", 4),
            ("quinta", 5),
            ("quinto", 5),
            ("última", -1),
            ("último", -1),
        ],
        Language::French => &[
            ("premier", 1),
            ("première", 1),
            ("premiere", 1),
            ("deuxième", 2),
            ("deuxieme", 2),
            ("second", 2),
            ("seconde", 2),
            ("troisième", 3),
            ("troisieme", 3),
            ("quatrième", 4),
            ("quatrieme", 4),
            ("cinquième", 5),
            ("cinquieme", 5),
            ("dernier", -1),
            ("dernière", -1),
        ],
    }
}

fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn ordinal_choice(tokens: &[String], language: Language, option_count: usize) -> Option<i64> {
    let table = ordinal_words(language);
    tokens.iter().find_map(|token| {
        table
            .iter()
            .find(|(word, _)| word == token)
            .map(|(_, n)| if *n < 0 { option_count as i64 } else { *n })
    })
}

/// Resolves the teacher's choice to a zero-based option index.
///
/// A structured choice always wins. Free text is matched first against
/// standalone numbers, then against ordinal words of `language`, then
/// against English ordinals.
pub fn parse_selection(
    input: &UserInput,
    option_count: usize,
    language: Language,
) -> Result<usize, SelectionError> {
    let in_range = |n: i64| n >= 1 && n <= option_count as i64;

    if let Some(choice) = input.structured_choice() {
        return if in_range(choice) {
            Ok((choice - 1) as usize)
        } else {
            Err(SelectionError::OutOfRange {
                choice,
                max: option_count,
            })
        };
    }

    let tokens = tokens(&input.text());
    let mut rejected: Option<i64> = None;

    for token in &tokens {
        if let Ok(n) = token.parse::<i64>() {
            if in_range(n) {
                return Ok((n - 1) as usize);
            }
            rejected.get_or_insert(n);
        }
    }

    let mut languages = vec![language];
    if language != Language::English {
        languages.push(Language::English);
    }
    for lang in languages {
        if let Some(n) = ordinal_choice(&tokens, lang, option_count) {
            if in_range(n) {
                return Ok((n - 1) as usize);
            }
            rejected.get_or_insert(n);
        }
    }

    match rejected {
        Some(choice) => Err(SelectionError::OutOfRange {
            choice,
            max: option_count,
        }),
        None => Err(SelectionError::Unrecognized),
    }
}
