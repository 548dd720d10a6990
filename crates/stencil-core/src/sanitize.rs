//! Sanitization of untrusted text
//!
//! Values supplied by users end up inside generated configuration files,
//! scripts and source code. Before they are interpolated we strip every
//! character that could break out of its textual context or inject a
//! terminal control sequence:
//!
//! - the null byte and the C0 control range, except `\t`, `\n` and `\r`
//! - the delete character (U+007F)
//! - the C1 control range (U+0080..=U+009F)
//!
//! Surrounding whitespace is trimmed afterwards. Everything else, including
//! non-ASCII Unicode, is preserved as is. HTML escaping is deliberately not
//! done here; that belongs to the renderer.

use serde_json::{Map, Value};

use crate::error::{Error, Result, TextRejection};

/// Maximum length, in characters, accepted by [`sanitize_text`]
pub const MAX_TEXT_LENGTH: usize = 1000;

/// Returns true for characters that are stripped from sanitized text
fn is_stripped(c: char) -> bool {
    match c {
        '\t' | '\n' | '\r' => false,
        '\u{0}'..='\u{1f}' | '\u{7f}'..='\u{9f}' => true,
        _ => false,
    }
}

/// Sanitize a single piece of text.
///
/// Fails when the input is longer than [`MAX_TEXT_LENGTH`] characters or
/// when nothing is left after stripping and trimming. Sanitizing already
/// clean text returns it unchanged.
///
/// # Example
///
/// ```rust
/// use stencil_core::sanitize_text;
///
/// assert_eq!(sanitize_text("  my-app\u{7f} ").unwrap(), "my-app");
/// assert!(sanitize_text("\u{0}").is_err());
/// ```
pub fn sanitize_text(input: &str) -> Result<String> {
    let len = input.chars().count();
    if len > MAX_TEXT_LENGTH {
        return Err(Error::invalid_text(TextRejection::TooLong {
            len,
            max: MAX_TEXT_LENGTH,
        }));
    }

    let stripped: String = input.chars().filter(|c| !is_stripped(*c)).collect();
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_text(TextRejection::Empty));
    }

    Ok(trimmed.to_string())
}

/// Recursively sanitize every string inside a JSON value.
///
/// Arrays and objects are rebuilt, so the input is never modified. Numbers,
/// booleans and `null` pass through unchanged. A string that sanitizes to
/// nothing becomes the empty string; any other rejection fails the whole
/// value with the JSON pointer of the offending entry.
pub fn sanitize_value(value: &Value) -> Result<Value> {
    sanitize_at(value, &mut String::new())
}

/// Sanitize the top level of a render context.
///
/// `null` is treated as an empty context. Anything other than an object or
/// `null` is rejected. The returned context is a new value.
pub fn sanitize_template_context(context: &Value) -> Result<Value> {
    let entries = match context {
        Value::Object(entries) => entries,
        Value::Null => return Ok(Value::Object(Map::new())),
        other => {
            return Err(Error::ContextNotAnObject {
                kind: json_kind(other),
            });
        }
    };

    let mut sanitized = Map::with_capacity(entries.len());
    for (key, value) in entries {
        let mut pointer = format!("/{}", escape_pointer_token(key));
        let clean = sanitize_at(value, &mut pointer).map_err(|source| {
            Error::ContextSanitizationFailed {
                key: key.clone(),
                source: Box::new(source),
            }
        })?;
        sanitized.insert(key.clone(), clean);
    }

    tracing::trace!(keys = sanitized.len(), "sanitized template context");
    Ok(Value::Object(sanitized))
}

fn sanitize_at(value: &Value, pointer: &mut String) -> Result<Value> {
    match value {
        Value::String(text) if text.is_empty() => Ok(Value::String(String::new())),
        Value::String(text) => match sanitize_text(text) {
            Ok(clean) => Ok(Value::String(clean)),
            Err(Error::InvalidText {
                reason: TextRejection::Empty,
            }) => Ok(Value::String(String::new())),
            Err(source) => Err(Error::ObjectSanitizationFailed {
                pointer: if pointer.is_empty() {
                    "/".to_string()
                } else {
                    pointer.clone()
                },
                source: Box::new(source),
            }),
        },
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let mark = pointer.len();
                pointer.push('/');
                pointer.push_str(&index.to_string());
                let clean = sanitize_at(item, pointer);
                pointer.truncate(mark);
                out.push(clean?);
            }
            Ok(Value::Array(out))
        }
        Value::Object(entries) => {
            let mut out = Map::with_capacity(entries.len());
            for (key, item) in entries {
                let mark = pointer.len();
                pointer.push('/');
                pointer.push_str(&escape_pointer_token(key));
                let clean = sanitize_at(item, pointer);
                pointer.truncate(mark);
                out.insert(key.clone(), clean?);
            }
            Ok(Value::Object(out))
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => Ok(value.clone()),
    }
}

fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_strips_null_and_c0() {
        assert_eq!(sanitize_text("hello\u{0000}\u{0001}world").unwrap(), "helloworld");
    }

    #[rstest]
    #[case("plain", "plain")]
    #[case("  padded  ", "padded")]
    #[case("tab\there", "tab\there")]
    #[case("line\nbreak", "line\nbreak")]
    #[case("crlf\r\nline", "crlf\r\nline")]
    #[case("del\u{7f}ete", "delete")]
    #[case("c1\u{85}\u{9b}range", "c1range")]
    #[case("escape\u{1b}[31mred", "escape[31mred")]
    #[case("héllo wörld ✓ 日本", "héllo wörld ✓ 日本")]
    #[case("<script>", "<script>")]
    fn test_sanitize_text_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_text(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\u{0}\u{1}\u{7f}")]
    fn test_sanitize_text_rejects_empty(#[case] input: &str) {
        let err = sanitize_text(input).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidText {
                reason: TextRejection::Empty
            }
        ));
    }

    #[test]
    fn test_length_limit_is_in_characters() {
        let at_limit = "é".repeat(MAX_TEXT_LENGTH);
        assert_eq!(sanitize_text(&at_limit).unwrap(), at_limit);

        let over = "a".repeat(MAX_TEXT_LENGTH + 1);
        let err = sanitize_text(&over).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidText {
                reason: TextRejection::TooLong { len: 1001, max: 1000 }
            }
        ));
    }

    #[test]
    fn test_sanitize_text_is_idempotent() {
        let inputs = [
            "  a\u{0}b\u{1f}c  ",
            "\u{85}  spaced \u{9f}",
            "multi\nline\ttext\r\n",
            "ünïcödé",
        ];
        for input in inputs {
            let once = sanitize_text(input).unwrap();
            let twice = sanitize_text(&once).unwrap();
            assert_eq!(once, twice, "input: {:?}", input);
        }
    }

    #[test]
    fn test_output_has_no_control_characters() {
        let input: String = (0u32..=0xa0)
            .filter_map(char::from_u32)
            .chain("visible".chars())
            .collect();
        let output = sanitize_text(&input).unwrap();
        assert!(output.chars().all(|c| !is_stripped(c)));
        assert!(output.contains("visible"));
    }

    #[test]
    fn test_sanitize_value_recurses() {
        let value = json!({
            "name": "app\u{0}",
            "count": 3,
            "enabled": true,
            "missing": null,
            "tags": ["a\u{1}", {"deep": " b "}],
            "blank": ""
        });
        let clean = sanitize_value(&value).unwrap();
        assert_eq!(
            clean,
            json!({
                "name": "app",
                "count": 3,
                "enabled": true,
                "missing": null,
                "tags": ["a", {"deep": "b"}],
                "blank": ""
            })
        );
        // input untouched
        assert_eq!(value["name"], "app\u{0}");
    }

    #[test]
    fn test_sanitize_value_control_only_becomes_empty() {
        assert_eq!(sanitize_value(&json!("\u{0}\u{2}")).unwrap(), json!(""));
    }

    #[test]
    fn test_sanitize_value_reports_pointer() {
        let value = json!({"outer": [{"a/b": "x".repeat(MAX_TEXT_LENGTH + 1)}]});
        let err = sanitize_value(&value).unwrap_err();
        match err {
            Error::ObjectSanitizationFailed { pointer, .. } => {
                assert_eq!(pointer, "/outer/0/a~1b");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_sanitize_context_names_key() {
        let context = json!({"ok": "fine", "bad": "y".repeat(MAX_TEXT_LENGTH + 5)});
        let err = sanitize_template_context(&context).unwrap_err();
        match err {
            Error::ContextSanitizationFailed { key, source } => {
                assert_eq!(key, "bad");
                assert!(matches!(*source, Error::ObjectSanitizationFailed { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_sanitize_context_null_and_non_object() {
        assert_eq!(sanitize_template_context(&Value::Null).unwrap(), json!({}));
        assert!(matches!(
            sanitize_template_context(&json!([1, 2])).unwrap_err(),
            Error::ContextNotAnObject { kind: "array" }
        ));
    }
}
