//! Canonical JSON bytes: the single serialization-for-hashing implementation.
//!
//! **Exactly one place** produces canonical JSON bytes in this crate. All
//! hashing and storage flows that involve a structured record must route
//! through this module.
//!
//! # Canonicalization rules
//!
//! 1. Object keys are sorted lexicographically (byte order).
//! 2. No extraneous whitespace (compact form: `{"a":1,"b":2}`).
//! 3. Strings are JSON-escaped per RFC 8259 §7.
//! 4. Numbers are either integers (`i64`/`u64`) or finite floats; `NaN` and
//!    the infinities are rejected.
//! 5. `null`, `true`, `false` are written literally.
//! 6. Output is always valid UTF-8, with non-ASCII preserved literally.
//! 7. Sequences preserve their original order; mappings do not.

use std::io::Write;

use serde_json::Value;

/// Error type for canonical JSON serialization.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CanonError {
    /// A JSON number was not representable as an integer or a finite float.
    #[error("non-finite or unrepresentable number in canonical JSON: {raw}")]
    UnsupportedNumber { raw: String },
    /// A mapping key was not a string (cannot occur via `serde_json::Value`,
    /// kept so callers constructing values through other means still fail
    /// closed rather than silently admitting an unsupported shape).
    #[error("unsupported value shape: {detail}")]
    UnsupportedShape { detail: String },
}

/// Produce canonical JSON bytes from a [`serde_json::Value`].
///
/// This is the single canonical JSON implementation in the kernel. All
/// hashing/digest flows that involve structured data must use this
/// function.
///
/// # Errors
///
/// Returns [`CanonError`] if any JSON number is not representable as an
/// integer or finite float (floats, NaN, and infinities constructed outside
/// normal `serde_json::Value` paths).
pub fn canonical_json_bytes(value: &Value) -> Result<Vec<u8>, CanonError> {
    let mut buf = Vec::new();
    write_value(&mut buf, value)?;
    Ok(buf)
}

fn write_value(buf: &mut Vec<u8>, value: &Value) -> Result<(), CanonError> {
    match value {
        Value::Null => buf.extend_from_slice(b"null"),
        Value::Bool(b) => buf.extend_from_slice(if *b { b"true" } else { b"false" }),
        Value::Number(n) => write_number(buf, n)?,
        Value::String(s) => write_string(buf, s),
        Value::Array(arr) => {
            buf.push(b'[');
            for (i, item) in arr.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_value(buf, item)?;
            }
            buf.push(b']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            buf.push(b'{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    buf.push(b',');
                }
                write_string(buf, key);
                buf.push(b':');
                write_value(buf, &map[*key])?;
            }
            buf.push(b'}');
        }
    }
    Ok(())
}

fn write_number(buf: &mut Vec<u8>, n: &serde_json::Number) -> Result<(), CanonError> {
    if let Some(i) = n.as_i64() {
        let _ = write!(buf, "{i}");
        return Ok(());
    }
    if let Some(u) = n.as_u64() {
        let _ = write!(buf, "{u}");
        return Ok(());
    }
    match n.as_f64() {
        Some(f) if f.is_finite() => {
            // serde_json's own Display for Number already produces the
            // shortest round-trippable decimal form (ryu-backed); reuse it
            // rather than reimplementing float formatting.
            let _ = write!(buf, "{n}");
            Ok(())
        }
        _ => Err(CanonError::UnsupportedNumber {
            raw: n.to_string(),
        }),
    }
}

fn write_string(buf: &mut Vec<u8>, s: &str) {
    buf.push(b'"');
    for ch in s.chars() {
        match ch {
            '"' => buf.extend_from_slice(b"\\\""),
            '\\' => buf.extend_from_slice(b"\\\\"),
            '\n' => buf.extend_from_slice(b"\\n"),
            '\r' => buf.extend_from_slice(b"\\r"),
            '\t' => buf.extend_from_slice(b"\\t"),
            c if c < '\u{0020}' => {
                let _ = write!(buf, "\\u{:04x}", c as u32);
            }
            c => {
                let mut utf8_buf = [0u8; 4];
                let encoded = c.encode_utf8(&mut utf8_buf);
                buf.extend_from_slice(encoded.as_bytes());
            }
        }
    }
    buf.push(b'"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sorted_keys() {
        let v = json!({"z": 1, "a": 2, "m": 3});
        let bytes = canonical_json_bytes(&v).unwrap();
        assert_eq!(bytes, b"{\"a\":2,\"m\":3,\"z\":1}");
    }

    #[test]
    fn nested_sorted_keys() {
        let v = json!({"b": {"d": 1, "c": 2}, "a": 3});
        let bytes = canonical_json_bytes(&v).unwrap();
        assert_eq!(bytes, b"{\"a\":3,\"b\":{\"c\":2,\"d\":1}}");
    }

    #[test]
    fn compact_no_whitespace() {
        let v: Value = serde_json::from_str("{ \"a\" : 1 , \"b\" : [ 2 , 3 ] }").unwrap();
        let bytes = canonical_json_bytes(&v).unwrap();
        assert_eq!(bytes, b"{\"a\":1,\"b\":[2,3]}");
    }

    #[test]
    fn ordering_invariance() {
        let v1: Value = serde_json::from_str(r#"{"x":1,"a":2,"m":3}"#).unwrap();
        let v2: Value = serde_json::from_str(r#"{"a":2,"m":3,"x":1}"#).unwrap();
        let v3: Value = serde_json::from_str(r#"{"m":3,"x":1,"a":2}"#).unwrap();
        let b1 = canonical_json_bytes(&v1).unwrap();
        let b2 = canonical_json_bytes(&v2).unwrap();
        let b3 = canonical_json_bytes(&v3).unwrap();
        assert_eq!(b1, b2);
        assert_eq!(b2, b3);
    }

    #[test]
    fn whitespace_invariance() {
        let compact: Value = serde_json::from_str(r#"{"a":1}"#).unwrap();
        let spaced: Value = serde_json::from_str("{ \"a\" : 1 }").unwrap();
        let newlined: Value = serde_json::from_str("{\n  \"a\": 1\n}").unwrap();
        let b1 = canonical_json_bytes(&compact).unwrap();
        let b2 = canonical_json_bytes(&spaced).unwrap();
        let b3 = canonical_json_bytes(&newlined).unwrap();
        assert_eq!(b1, b2);
        assert_eq!(b2, b3);
    }

    #[test]
    fn accepts_integer_zero() {
        let v = json!({"a": 0});
        assert_eq!(canonical_json_bytes(&v).unwrap(), b"{\"a\":0}");
    }

    #[test]
    fn accepts_negative_integer() {
        let v = json!({"a": -42});
        assert_eq!(canonical_json_bytes(&v).unwrap(), b"{\"a\":-42}");
    }

    #[test]
    fn accepts_large_u64() {
        let v = json!({"a": u64::MAX});
        let expected = format!("{{\"a\":{}}}", u64::MAX);
        assert_eq!(canonical_json_bytes(&v).unwrap(), expected.as_bytes());
    }

    #[test]
    fn accepts_finite_float() {
        let v = json!({"a": 1.5});
        assert_eq!(canonical_json_bytes(&v).unwrap(), b"{\"a\":1.5}");
    }

    #[test]
    fn null_true_false() {
        let v = json!({"a": null, "b": true, "c": false});
        assert_eq!(
            canonical_json_bytes(&v).unwrap(),
            b"{\"a\":null,\"b\":true,\"c\":false}"
        );
    }

    #[test]
    fn string_escaping() {
        let v = json!({"a": "line1\nline2\ttab\\slash\"quote"});
        assert_eq!(
            canonical_json_bytes(&v).unwrap(),
            b"{\"a\":\"line1\\nline2\\ttab\\\\slash\\\"quote\"}"
        );
    }

    #[test]
    fn control_char_escaping() {
        let v = json!({"a": "\u{0001}"});
        assert_eq!(canonical_json_bytes(&v).unwrap(), b"{\"a\":\"\\u0001\"}");
    }

    #[test]
    fn empty_object_and_array() {
        assert_eq!(canonical_json_bytes(&json!({})).unwrap(), b"{}");
        assert_eq!(canonical_json_bytes(&json!([])).unwrap(), b"[]");
    }

    #[test]
    fn array_ordering_preserved() {
        let v = json!([3, 1, 2]);
        assert_eq!(canonical_json_bytes(&v).unwrap(), b"[3,1,2]");
    }

    #[test]
    fn deterministic_repeated_calls() {
        let v = json!({"z": [1, 2], "a": {"c": 3, "b": 4}});
        let first = canonical_json_bytes(&v).unwrap();
        for _ in 0..10 {
            assert_eq!(canonical_json_bytes(&v).unwrap(), first);
        }
    }

    #[test]
    fn unicode_passthrough() {
        let v = json!({"emoji": "hello 🌍"});
        let bytes = canonical_json_bytes(&v).unwrap();
        assert_eq!(
            std::str::from_utf8(&bytes).unwrap(),
            r#"{"emoji":"hello 🌍"}"#
        );
    }

    // S1 — canonical encoding ordering (spec.md §8 scenario S1).
    #[test]
    fn s1_canonical_encoding_ordering() {
        let v1 = json!({"b": 2, "a": 1, "c": 3});
        let v2 = json!({"a": 1, "c": 3, "b": 2});
        let b1 = canonical_json_bytes(&v1).unwrap();
        let b2 = canonical_json_bytes(&v2).unwrap();
        assert_eq!(b1, b2);
        assert_eq!(b1, b"{\"a\":1,\"b\":2,\"c\":3}");
    }
}
