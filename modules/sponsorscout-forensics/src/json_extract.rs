//! Recover JSON from model output that may be wrapped in prose or code fences.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse `text` as JSON, trying progressively looser strategies:
///
/// 1. the whole (trimmed) text
/// 2. the body of the first fenced code block
/// 3. the span from the first `{` or `[` (whichever comes first) to the last
///    matching closer
///
/// Returns `None` when nothing parses. Never panics.
pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    if let Some(body) = fenced_block(trimmed) {
        if let Ok(value) = serde_json::from_str(body) {
            return Some(value);
        }
    }

    let span = bracket_span(trimmed)?;
    serde_json::from_str(span).ok()
}

/// `extract_json` followed by a typed conversion. Shape mismatches read as `None`.
pub fn extract_json_as<T: DeserializeOwned>(text: &str) -> Option<T> {
    let value = extract_json(text)?;
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::debug!(error = %e, "Extracted JSON did not match expected shape");
            None
        }
    }
}

/// Body of the first ``` fenced block, with any language tag dropped.
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_marker = &text[open + 3..];
    // Language tag runs to the end of the opening line.
    let body_start = after_marker.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_marker[body_start..];
    let close = body.find("```").unwrap_or(body.len());
    Some(body[..close].trim())
}

fn bracket_span(text: &str) -> Option<&str> {
    let start = text.find(|c: char| c == '{' || c == '[')?;
    let closer = if text[start..].starts_with('{') { '}' } else { ']' };
    let end = text.rfind(closer)?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_plain_json() {
        assert_eq!(extract_json(r#"{"a":1}"#), Some(json!({"a": 1})));
    }

    #[test]
    fn parses_fenced_json_with_language_tag() {
        assert_eq!(
            extract_json("```json\n[{\"a\":1}]\n```"),
            Some(json!([{"a": 1}]))
        );
    }

    #[test]
    fn parses_fenced_block_surrounded_by_prose() {
        let text = "Here are the leads:\n```\n{\"leads\": []}\n```\nLet me know!";
        assert_eq!(extract_json(text), Some(json!({"leads": []})));
    }

    #[test]
    fn falls_back_to_bracket_span() {
        let text = "Sure! The result is {\"name\": \"Acme\"} hope that helps.";
        assert_eq!(extract_json(text), Some(json!({"name": "Acme"})));
    }

    #[test]
    fn array_wins_when_it_opens_first() {
        let text = "Results: [{\"a\":1},{\"b\":2}] end";
        assert_eq!(extract_json(text), Some(json!([{"a": 1}, {"b": 2}])));
    }

    #[test]
    fn unterminated_fence_still_recovers() {
        let text = "```json\n{\"a\": 2}";
        assert_eq!(extract_json(text), Some(json!({"a": 2})));
    }

    #[test]
    fn garbage_returns_none() {
        assert_eq!(extract_json("not json at all"), None);
        assert_eq!(extract_json(""), None);
        assert_eq!(extract_json("} backwards {"), None);
        assert_eq!(extract_json("{ broken: "), None);
    }

    #[test]
    fn typed_extraction_rejects_wrong_shape() {
        #[derive(serde::Deserialize)]
        struct Named {
            #[allow(dead_code)]
            name: String,
        }
        assert!(extract_json_as::<Named>(r#"{"name":"x"}"#).is_some());
        assert!(extract_json_as::<Named>(r#"[1,2]"#).is_none());
    }
}
