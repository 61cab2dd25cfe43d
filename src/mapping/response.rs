//! Validation of mapping responses.

use crate::error::{Error, Result};
use crate::model::{BodyItem, Section};
use serde_json::Value;

/// Parse a raw mapping response into sections.
///
/// Accepts `{"sections": [...]}` or a bare array, optionally wrapped in a
/// markdown code fence. A section body may be a list of items or a single
/// string. Anything else is a [`Error::ResponseValidation`].
pub fn parse_response(raw: &str) -> Result<Vec<Section>> {
    let text = strip_code_fence(raw);
    let value: Value = serde_json::from_str(text)
        .map_err(|e| Error::ResponseValidation(format!("response is not JSON: {}", e)))?;

    let list = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("sections") {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(Error::ResponseValidation(
                    "expected a 'sections' array".to_string(),
                ))
            }
        },
        _ => {
            return Err(Error::ResponseValidation(
                "expected an object or an array".to_string(),
            ))
        }
    };

    if list.is_empty() {
        return Err(Error::ResponseValidation("response has no sections".to_string()));
    }

    list.into_iter()
        .enumerate()
        .map(|(i, value)| section_from_value(i, value))
        .collect()
}

fn section_from_value(index: usize, value: Value) -> Result<Section> {
    let Value::Object(mut map) = value else {
        return Err(Error::ResponseValidation(format!(
            "section {} is not an object",
            index
        )));
    };

    let title = match map.remove("title") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => {
            return Err(Error::ResponseValidation(format!(
                "section {} has no title",
                index
            )))
        }
    };

    let body = match map.remove("body") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(s)) if s.trim().is_empty() => Vec::new(),
        Some(Value::String(s)) => vec![BodyItem::text(s)],
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(j, item)| item_from_value(index, j, item))
            .collect::<Result<Vec<_>>>()?,
        Some(_) => {
            return Err(Error::ResponseValidation(format!(
                "section {} ('{}'): body must be a list",
                index, title
            )))
        }
    };

    Ok(Section::new(title, body))
}

fn item_from_value(section: usize, index: usize, value: Value) -> Result<BodyItem> {
    match value {
        Value::String(s) => Ok(BodyItem::text(s)),
        Value::Object(map) => serde_json::from_value(Value::Object(map)).map_err(|e| {
            Error::ResponseValidation(format!("section {}, item {}: {}", section, index, e))
        }),
        _ => Err(Error::ResponseValidation(format!(
            "section {}, item {}: expected an object",
            section, index
        ))),
    }
}

/// Strip a surrounding ```` ``` ```` fence and its language tag.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    let inner = inner.trim_end();
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BodyItemKind;

    #[test]
    fn test_wrapped_and_fenced() {
        let raw = "```json\n{\"sections\":[{\"title\":\" Summary \",\"body\":[{\"type\":\"bullet\",\"content\":\"x\"}]}]}\n```";
        let sections = parse_response(raw).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Summary");
        assert_eq!(sections[0].body[0].kind, BodyItemKind::Bullet);
    }

    #[test]
    fn test_bare_array_with_string_body() {
        let sections = parse_response(r#"[{"title":"Intro","body":"Hello"},{"title":"Next"}]"#).unwrap();
        assert_eq!(sections[0].body, vec![BodyItem::text("Hello")]);
        assert!(sections[1].body.is_empty());
    }

    #[test]
    fn test_invalid_responses_are_retryable() {
        for raw in [
            "not json",
            "{}",
            "[]",
            r#"[{"body":[]}]"#,
            r#"[{"title":"A","body":[{"type":"image","content":"x"}]}]"#,
            r#"[{"title":"A","body":42}]"#,
        ] {
            let err = parse_response(raw).unwrap_err();
            assert!(matches!(err, Error::ResponseValidation(_)), "{}", raw);
            assert!(err.is_retryable());
        }
    }
}
