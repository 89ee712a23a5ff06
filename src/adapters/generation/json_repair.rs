//! Recovering JSON objects from free-form generator text.
//!
//! Models wrap JSON in code fences, add prose around it, and streams cut it
//! off mid-value. These helpers turn all of that back into a `Value`.

use serde_json::Value;

/// Extracts the JSON object contained in a complete response.
///
/// Tries, in order: the text as-is, the body of a code fence, the span
/// between the first `{` and the last `}`, and that span with common
/// repairs applied.
pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    let body = strip_code_fence(trimmed).unwrap_or(trimmed);
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return Some(value);
    }

    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end <= start {
        return None;
    }
    let span = &body[start..=end];
    serde_json::from_str::<Value>(span)
        .or_else(|_| serde_json::from_str::<Value>(&apply_common_repairs(span)))
        .ok()
}

/// Best-effort parse of a JSON object that may be truncated.
///
/// Open strings are closed and open containers are terminated. When the
/// text ends inside a key or a bare literal, everything after the last
/// complete member is dropped.
pub fn repair_partial(text: &str) -> Option<Value> {
    let body = strip_open_fence(text);
    let start = body.find('{')?;
    let body = body[start..].trim_end();

    let mut closers: Vec<char> = Vec::new();
    let mut cut_points: Vec<(usize, Vec<char>)> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in body.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => {
                closers.push('}');
                cut_points.push((idx + 1, closers.clone()));
            }
            '[' => {
                closers.push(']');
                cut_points.push((idx + 1, closers.clone()));
            }
            '}' | ']' => {
                closers.pop();
                if closers.is_empty() {
                    return serde_json::from_str(&body[..=idx]).ok();
                }
            }
            ',' => cut_points.push((idx, closers.clone())),
            _ => {}
        }
    }

    let mut candidate = body.to_string();
    if in_string {
        if escaped {
            candidate.pop();
        }
        candidate.push('"');
    }
    candidate.extend(closers.iter().rev());
    if let Ok(value) = serde_json::from_str::<Value>(&candidate) {
        return Some(value);
    }

    for (cut, open) in cut_points.into_iter().rev() {
        let mut candidate = body[..cut].to_string();
        candidate.extend(open.iter().rev());
        if let Ok(value) = serde_json::from_str::<Value>(&apply_common_repairs(&candidate)) {
            return Some(value);
        }
    }
    None
}

fn strip_code_fence(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after = &text[open + 3..];
    let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after[body_start..];
    let close = body.find("```")?;
    Some(body[..close].trim())
}

fn strip_open_fence(text: &str) -> &str {
    match text.find("```") {
        Some(open) => {
            let after = &text[open + 3..];
            let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
            let body = &after[body_start..];
            body.find("```").map_or(body, |close| &body[..close])
        }
        None => text,
    }
}

fn apply_common_repairs(text: &str) -> String {
    text.trim()
        .replace(",}", "}")
        .replace(",]", "]")
        .replace(", }", "}")
        .replace(", ]", "]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_plain_object() {
        assert_eq!(extract_json(r#"{"a": 1}"#), Some(json!({"a": 1})));
    }

    #[test]
    fn extracts_from_code_fence() {
        let text = "Here you go:\n```json\n{\"topic\": \"bees\"}\n```\nEnjoy!";
        assert_eq!(extract_json(text), Some(json!({"topic": "bees"})));
    }

    #[test]
    fn extracts_object_surrounded_by_prose() {
        let text = "Sure. {\"a\": [1, 2,]} Hope that helps.";
        assert_eq!(extract_json(text), Some(json!({"a": [1, 2]})));
    }

    #[test]
    fn rejects_text_without_object() {
        assert_eq!(extract_json("no json here"), None);
    }

    #[test]
    fn repairs_truncated_string_value() {
        let value = repair_partial(r#"{"response": "Great, a project about the sol"#).unwrap();
        assert_eq!(value, json!({"response": "Great, a project about the sol"}));
    }

    #[test]
    fn drops_incomplete_key() {
        let value = repair_partial(r#"{"response": "Hi", "top"#).unwrap();
        assert_eq!(value, json!({"response": "Hi"}));
    }

    #[test]
    fn drops_dangling_colon_and_literal() {
        assert_eq!(
            repair_partial(r#"{"a": "x", "b":"#).unwrap(),
            json!({"a": "x"})
        );
        assert_eq!(
            repair_partial(r#"{"a": "x", "b": tru"#).unwrap(),
            json!({"a": "x"})
        );
    }

    #[test]
    fn closes_nested_containers() {
        let value = repair_partial(r#"{"options": [{"title": "Bees""#).unwrap();
        assert_eq!(value, json!({"options": [{"title": "Bees"}]}));
    }

    #[test]
    fn bare_opening_brace_is_empty_object() {
        assert_eq!(repair_partial("{"), Some(json!({})));
        assert_eq!(repair_partial("```json\n{\"a"), Some(json!({})));
    }

    #[test]
    fn complete_object_ignores_trailing_text() {
        assert_eq!(
            repair_partial(r#"{"a": 1} trailing"#),
            Some(json!({"a": 1}))
        );
    }
}
