//! Canonical form of a message body
//!
//! Two bodies that mean the same JSON must canonicalize to the same bytes:
//! object keys are sorted by raw code point at every depth and the output
//! carries no insignificant whitespace. Value types are never coerced, so
//! `2` and `"2"` stay distinct, and numbers keep their source text exactly
//! (serde_json `arbitrary_precision`).
//!
//! Bodies made only of hex digits and hyphens (GUIDs, hex ids, the empty
//! string) are not parsed; they are wrapped as `{"id":"<body>"}`.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::errors::{KeyError, KeyResult};
use crate::observability::{log_event, Event};

static IDENTIFIER_PATTERN: OnceLock<Regex> = OnceLock::new();

fn identifier_pattern() -> &'static Regex {
    IDENTIFIER_PATTERN.get_or_init(|| {
        Regex::new(r"^[0-9a-fA-F-]*$").expect("identifier pattern is a valid regex")
    })
}

/// Returns true if `body` is made only of hex digits and hyphens.
pub fn is_identifier(body: &str) -> bool {
    identifier_pattern().is_match(body)
}

/// Produces the canonical string form of a raw message body.
///
/// # Errors
///
/// `CELLFETCH_MALFORMED_INPUT` if the body is not UTF-8, or is neither an
/// identifier nor a JSON value.
pub fn canonicalize(raw: &[u8]) -> KeyResult<String> {
    let body = std::str::from_utf8(raw).map_err(|e| {
        log_event(Event::MalformedInput, &[("reason", "invalid utf-8")]);
        KeyError::invalid_utf8(e.valid_up_to())
    })?;

    if is_identifier(body) {
        let wrapped = wrap_identifier(body);
        log_event(
            Event::IdentifierRewritten,
            &[("original_id", body), ("transformed_id", &wrapped)],
        );
        return Ok(wrapped);
    }

    let parsed: Value = serde_json::from_str(body).map_err(|e| {
        log_event(
            Event::MalformedInput,
            &[("message_body", body), ("reason", &e.to_string())],
        );
        KeyError::invalid_json(body, e)
    })?;

    Ok(to_canonical_string(&sort_keys(parsed)))
}

/// Wraps an identifier as a single-field object.
fn wrap_identifier(id: &str) -> String {
    let mut object = Map::new();
    object.insert("id".to_string(), Value::String(id.to_string()));
    to_canonical_string(&Value::Object(object))
}

/// Recursively rebuilds every object with its keys in ascending byte order.
///
/// Arrays keep their element order; scalars pass through untouched.
pub fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(object) => {
            let mut entries: Vec<(String, Value)> = object.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));

            let mut sorted = Map::new();
            for (key, child) in entries {
                sorted.insert(key, sort_keys(child));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        scalar => scalar,
    }
}

fn to_canonical_string(value: &Value) -> String {
    // Serializing a `Value` cannot fail: every key is already a string.
    serde_json::to_string(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canon(body: &str) -> String {
        canonicalize(body.as_bytes()).unwrap()
    }

    #[test]
    fn test_guid_is_wrapped() {
        assert_eq!(
            canon("ff468955-9cf2-4047-a105-e5e7ae6f5b99"),
            "{\"id\":\"ff468955-9cf2-4047-a105-e5e7ae6f5b99\"}"
        );
    }

    #[test]
    fn test_empty_body_is_empty_identifier() {
        assert_eq!(canon(""), "{\"id\":\"\"}");
    }

    #[test]
    fn test_digits_only_body_is_identifier_not_number() {
        assert_eq!(canon("12345"), "{\"id\":\"12345\"}");
    }

    #[test]
    fn test_body_with_quote_is_malformed() {
        let err = canonicalize(b"HasQuotes\"").unwrap_err();
        assert_eq!(err.code().code(), "CELLFETCH_MALFORMED_INPUT");
        assert_eq!(err.message(), "Cannot parse invalid JSON");
    }

    #[test]
    fn test_truncated_object_is_malformed() {
        assert!(canonicalize(b"{\"testOne\":").is_err());
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let err = canonicalize(&[b'{', 0xFF, b'}']).unwrap_err();
        assert_eq!(err.details(), Some("byte_offset: 1"));
    }

    #[test]
    fn test_sorts_top_level_keys() {
        assert_eq!(
            canon("{\"testA\":\"test1\", \"testC\":2, \"testB\":true}"),
            "{\"testA\":\"test1\",\"testB\":true,\"testC\":2}"
        );
    }

    #[test]
    fn test_sorts_case_sensitively() {
        assert_eq!(
            canon("{\"testb\":true, \"testA\":\"test1\", \"testC\":2}"),
            "{\"testA\":\"test1\",\"testC\":2,\"testb\":true}"
        );
    }

    #[test]
    fn test_sorts_nested_objects_inside_arrays() {
        assert_eq!(
            canon("{\"z\":[{\"y\":1,\"x\":2},3], \"a\":{\"d\":{\"c\":null,\"b\":false}}}"),
            "{\"a\":{\"d\":{\"b\":false,\"c\":null}},\"z\":[{\"x\":2,\"y\":1},3]}"
        );
    }

    #[test]
    fn test_sort_uses_code_points_not_locale() {
        // 'Z' (0x5A) < '_' (0x5F) < 'a' (0x61) < 'é' (0xC3 0xA9)
        assert_eq!(
            canon("{\"é\":1,\"a\":2,\"_\":3,\"Z\":4}"),
            "{\"Z\":4,\"_\":3,\"a\":2,\"é\":1}"
        );
    }

    #[test]
    fn test_types_are_preserved() {
        assert_eq!(canon("{\"n\":2.0}"), "{\"n\":2.0}");
        assert_eq!(canon("{\"n\":\"2.0\"}"), "{\"n\":\"2.0\"}");
        assert_eq!(canon("{\"b\":false}"), "{\"b\":false}");
        assert_eq!(canon("{\"b\":\"false\"}"), "{\"b\":\"false\"}");
    }

    #[test]
    fn test_number_text_is_kept_verbatim() {
        assert_eq!(
            canon("{\"n\":12345678901234567890123}"),
            "{\"n\":12345678901234567890123}"
        );
        assert_eq!(canon("{\"n\":1e2}"), "{\"n\":1e2}");
        assert_eq!(canon("{\"n\":-0}"), "{\"n\":-0}");
        assert_eq!(canon("{\"n\":0.1000}"), "{\"n\":0.1000}");
    }

    #[test]
    fn test_non_object_json_is_accepted() {
        assert_eq!(canon("[ {\"b\":1, \"a\":2} ]"), "[{\"a\":2,\"b\":1}]");
        assert_eq!(canon("\"plain string\""), "\"plain string\"");
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier(""));
        assert!(is_identifier("---"));
        assert!(is_identifier("DEADbeef"));
        assert!(!is_identifier("xyz"));
        assert!(!is_identifier("ff46 8955"));
    }
}
